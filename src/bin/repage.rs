//! CLI binary for repage.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and writes results to disk.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use repage::{
    bundle, images_to_pdf, inspect, pdf_to_images, ConversionConfig, ConversionMode,
    ConversionOutput, ConversionProgressCallback, InputFile, PageSize, ProgressCallback,
    Selection, SelectionNotice,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif]. Pages arrive strictly in order, so one slot of
/// timing state is enough.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Wall-clock start of the page currently in flight.
    page_start: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_conversion_start` (called before any pages are processed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_start: Mutex::new(None),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        // Switch from spinner-only style to full progress bar now that we
        // know the actual page count.
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting conversion of {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        *self.page_start.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, output_len: usize) {
        let elapsed_ms = self
            .page_start
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&HumanBytes(output_len as u64).to_string()),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, _page_num: usize, _total: usize, _error: &str) {
        // The run aborts after the first page error; the bar gets out of the
        // way so the error report lands on a clean line.
        self.bar.finish_and_clear();
    }

    fn on_conversion_complete(&self, total_pages: usize, output_bytes: u64) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages converted ({})",
            green("✔"),
            bold(&total_pages.to_string()),
            HumanBytes(output_bytes)
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract every page of a PDF (several pages arrive as images.zip)
  repage scan.pdf

  # Extract as individual JPEG files into a directory
  repage scan.pdf --loose -o pages/

  # Assemble photos into one PDF, in the order given
  repage cover.jpg body.jpg appendix.jpg -o out/

  # Force the direction when the extension is ambiguous
  repage --mode jpeg-to-pdf exported.bin

  # US Letter pages instead of A4
  repage --page-size letter *.jpg

  # Inspect page count and sizes (no conversion)
  repage --inspect scan.pdf

  # Machine-readable summary
  repage --json scan.pdf > summary.json

PAGE SIZES:
  Name     Width      Height
  ──────   ────────   ────────
  a4       210.0 mm   297.0 mm   (default)
  letter   215.9 mm   279.4 mm

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Path to a pdfium library file or directory
  REPAGE_OUTPUT       Default output directory
  REPAGE_SCALE        Render scale for PDF extraction (0.25–8.0)
  REPAGE_QUALITY      JPEG quality (1–100)
  REPAGE_NO_PROGRESS  Disable the progress bar
  REPAGE_VERBOSE      Enable DEBUG-level logs
  REPAGE_QUIET        Suppress all output except errors

SETUP:
  PDF extraction renders through pdfium. Download a release for your
  platform from github.com/bblanchon/pdfium-binaries, then either place
  the library next to the repage binary, install it system-wide, or point
  PDFIUM_LIB_PATH at it:
      PDFIUM_LIB_PATH=/opt/pdfium/lib repage scan.pdf

  Assembling JPEGs into a PDF needs no pdfium at all.
"#;

/// Convert PDFs to page images and images to PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "repage",
    version,
    about = "Convert PDFs to per-page JPEG images, and JPEG images to a single PDF",
    long_about = "Convert in both directions between paged documents and images: extract every \
page of a PDF as a JPEG, or assemble an ordered set of JPEGs into one PDF with each image \
aspect-fit and centred on its own page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// One PDF file, or one or more JPEG files (page order = argument order).
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Conversion direction. Inferred from the first input's extension
    /// when omitted (.pdf ⇒ pdf-to-jpeg, anything else ⇒ jpeg-to-pdf).
    #[arg(long, value_enum, env = "REPAGE_MODE")]
    mode: Option<ModeArg>,

    /// Directory to write outputs into.
    #[arg(short, long, env = "REPAGE_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Write extracted pages as individual files instead of one zip archive.
    #[arg(long, env = "REPAGE_LOOSE")]
    loose: bool,

    /// Render scale for PDF extraction (0.25–8.0; 1.0 ≈ 72 DPI).
    #[arg(long, env = "REPAGE_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// JPEG quality for extracted pages (1–100).
    #[arg(long, env = "REPAGE_QUALITY", default_value_t = 80,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Page size for assembled PDFs.
    #[arg(long, env = "REPAGE_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Most images accepted per assembly; extras are dropped with a notice.
    #[arg(long, env = "REPAGE_MAX_IMAGES", default_value_t = 30)]
    max_images: usize,

    /// Print a structured JSON summary to stdout after converting.
    #[arg(long, env = "REPAGE_JSON")]
    json: bool,

    /// Print PDF page count and sizes only, no conversion.
    #[arg(long)]
    inspect: bool,

    /// Disable progress bar.
    #[arg(long, env = "REPAGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "REPAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "REPAGE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    PdfToJpeg,
    JpegToPdf,
}

impl From<ModeArg> for ConversionMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::PdfToJpeg => ConversionMode::PdfToJpeg,
            ModeArg::JpegToPdf => ConversionMode::JpegToPdf,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::LETTER,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mode = cli
        .mode
        .map(ConversionMode::from)
        .unwrap_or_else(|| infer_mode(&cli.inputs));

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect {
        if mode != ConversionMode::PdfToJpeg {
            anyhow::bail!("--inspect only applies to PDF input");
        }
        let document = load_input(&cli.inputs[0]).await?;
        let config = ConversionConfig::default();
        let info = inspect(&document, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise page info")?
            );
        } else {
            println!("File:        {}", document.name());
            println!("Pages:       {}", info.page_count);
            if let Some(first) = info.pages.first() {
                let uniform = info
                    .pages
                    .iter()
                    .all(|p| p.width_pt == first.width_pt && p.height_pt == first.height_pt);
                if uniform {
                    println!("Page size:   {:.1} × {:.1} pt", first.width_pt, first.height_pt);
                } else {
                    println!(
                        "Page size:   varies ({:.1} × {:.1} pt on page 1)",
                        first.width_pt, first.height_pt
                    );
                }
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    // The progress bar is initialised with a spinner (no page count yet);
    // `on_conversion_start` resizes it to the correct total once the input
    // has been inspected. `show_progress` was already computed above.

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .render_scale(cli.scale)
        .jpeg_quality(cli.quality)
        .page_size(cli.page_size.into())
        .max_images(cli.max_images);
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let mut files = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        files.push(load_input(path).await?);
    }

    let output = match mode {
        ConversionMode::PdfToJpeg => {
            let document = files.remove(0);
            if !files.is_empty() && !cli.quiet {
                eprintln!(
                    "{} ignoring {} extra input(s) in pdf-to-jpeg mode",
                    cyan("⚠"),
                    files.len()
                );
            }
            pdf_to_images(&document, &config)
                .await
                .context("Conversion failed")?
        }
        ConversionMode::JpegToPdf => {
            let mut selection = Selection::new();
            let notice = selection
                .select(files, &config)
                .context("Invalid selection")?;
            if let Some(SelectionNotice::Truncated { offered, kept }) = notice {
                if !cli.quiet {
                    eprintln!(
                        "{} {} images offered, keeping the first {}",
                        cyan("⚠"),
                        offered,
                        kept
                    );
                }
            }
            images_to_pdf(&selection.files(), &config)
                .await
                .context("Conversion failed")?
        }
    };

    // ── Write outputs ────────────────────────────────────────────────────
    // Several extracted pages bundle into one zip unless --loose asked for
    // individual files; a single output is always written directly.
    let written = if output.files.len() > 1 && !cli.loose {
        let archive = bundle(&output.files, &config)
            .await
            .context("Failed to bundle outputs")?;
        vec![repage::write_file(&archive, &cli.output).await?]
    } else {
        let mut paths = Vec::with_capacity(output.files.len());
        for file in &output.files {
            paths.push(repage::write_file(file, &cli.output).await?);
        }
        paths
    };

    // Summary line (the callback already printed the per-page log).
    if !cli.quiet {
        let stats = &output.stats;
        let destination = match written.as_slice() {
            [single] => single.display().to_string(),
            many => format!("{} files in {}", many.len(), cli.output.display()),
        };
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            stats.pages,
            stats.total_ms,
            bold(&destination),
        );
        eprintln!(
            "   {} engine  /  {} codec  /  {} written",
            dim(&format!("{}ms", stats.engine_ms)),
            dim(&format!("{}ms", stats.codec_ms)),
            dim(&HumanBytes(stats.output_bytes).to_string()),
        );
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&summary_json(&output, &written))
            .context("Failed to serialise summary")?;
        println!("{json}");
    }

    Ok(())
}

/// Pick the direction from the first input's extension.
fn infer_mode(paths: &[PathBuf]) -> ConversionMode {
    match paths.first().and_then(|p| p.extension()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => ConversionMode::PdfToJpeg,
        _ => ConversionMode::JpegToPdf,
    }
}

async fn load_input(path: &PathBuf) -> Result<InputFile> {
    InputFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn summary_json(output: &ConversionOutput, written: &[PathBuf]) -> serde_json::Value {
    serde_json::json!({
        "files": output.file_summaries(),
        "stats": output.stats,
        "written": written
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
    })
}
