//! Conversion entry points: one per direction, plus bundling and inspection.
//!
//! Both directions are all-or-nothing: the first page or image failure
//! aborts the run and nothing is emitted. Partial output would be worse
//! than no output here — a 12-of-30-page extraction looks complete at a
//! glance and silently loses data downstream.

use crate::config::ConversionConfig;
use crate::engine::{
    ArchiveEntry, Archiver, DocumentComposer, PageRasterizer, PdfiumRasterizer, PlacedBitmap,
    PrintpdfComposer, ZipArchiver,
};
use crate::error::RepageError;
use crate::output::{ConversionOutput, ConversionStats, ConvertedFile, DocumentInfo};
use crate::pipeline::{decode, encode, input::InputFile, layout};
use crate::preview::{PreviewHandle, MIME_JPEG, MIME_PDF, MIME_ZIP};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Name given to the document produced by image assembly.
pub const ASSEMBLED_PDF_NAME: &str = "converted_document.pdf";

/// Name given to the archive produced when several files are downloaded at once.
pub const ARCHIVE_NAME: &str = "images.zip";

/// Render every page of a PDF to a JPEG image.
///
/// This is the primary entry point for the PDF-to-JPEG direction. Outputs
/// are named `<stem>_page_<n>.jpg`, 1-indexed, in page order, where
/// `<stem>` is the input name minus its final extension.
///
/// # Arguments
/// * `document` — the selected PDF
/// * `config`   — conversion configuration
///
/// # Errors
/// Returns `Err(RepageError)` when the input is not a PDF, pdfium cannot
/// open it, or any single page fails to render or encode. No files are
/// returned in that case.
///
/// # Example
/// ```rust,no_run
/// use repage::{pdf_to_images, ConversionConfig, InputFile};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let document = InputFile::from_path("scan.pdf").await?;
/// let config = ConversionConfig::default();
/// let output = pdf_to_images(&document, &config).await?;
/// for file in &output.files {
///     tokio::fs::write(&file.name, file.payload.bytes()).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn pdf_to_images(
    document: &InputFile,
    config: &ConversionConfig,
) -> Result<ConversionOutput, RepageError> {
    let total_start = Instant::now();
    info!("Starting extraction: {}", document.name());

    // ── Step 1: Validate input ───────────────────────────────────────────
    document.validate_pdf()?;

    // ── Step 2: Resolve engine ───────────────────────────────────────────
    let rasterizer = resolve_rasterizer(config);

    // ── Step 3: Count pages ──────────────────────────────────────────────
    let doc_info = rasterizer.inspect(document).await?;
    let total_pages = doc_info.page_count;
    info!("PDF has {} pages", total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages);
    }

    // ── Step 4: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = rasterizer.rasterize(document, config.render_scale).await?;
    let engine_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {} pages in {}ms",
        rendered.len(),
        engine_ms
    );

    // ── Step 5: Encode pages to JPEG ─────────────────────────────────────
    let encode_start = Instant::now();
    let stem = document.stem();
    let mut files = Vec::with_capacity(rendered.len());
    let mut output_bytes = 0u64;

    for (idx, image) in rendered.iter().enumerate() {
        let page_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let jpeg = match encode::encode_page(page_num, image, config.jpeg_quality) {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total_pages, &e.to_string());
                }
                return Err(e);
            }
        };

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total_pages, jpeg.len());
        }

        output_bytes += jpeg.len() as u64;
        files.push(ConvertedFile {
            name: format!("{}_page_{}.jpg", stem, page_num),
            payload: PreviewHandle::new(Arc::new(jpeg), MIME_JPEG, &config.handle_registry),
        });
    }
    let codec_ms = encode_start.elapsed().as_millis() as u64;

    // ── Step 6: Compute stats ────────────────────────────────────────────
    let stats = ConversionStats {
        input_files: 1,
        pages: total_pages,
        output_files: files.len(),
        output_bytes,
        engine_ms,
        codec_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} pages, {}ms total",
        files.len(),
        stats.total_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, output_bytes);
    }

    Ok(ConversionOutput { files, stats })
}

/// Assemble an ordered sequence of JPEG images into one PDF document.
///
/// Each image fills one output page, first image on page 1, in exactly the
/// order given (reordering happens upstream in the selection). Every image
/// is aspect-fit onto the configured page size: scaled until it touches a
/// page edge (up or down, never cropped) and centred on the other axis.
///
/// # Errors
/// Returns `Err(RepageError::EmptySelection)` for an empty slice, and an
/// indexed `AssemblyFailed` when any image cannot be decoded. No document
/// is produced in either case.
pub async fn images_to_pdf(
    images: &[InputFile],
    config: &ConversionConfig,
) -> Result<ConversionOutput, RepageError> {
    let total_start = Instant::now();
    if images.is_empty() {
        return Err(RepageError::EmptySelection);
    }
    info!("Starting assembly: {} images", images.len());

    // ── Step 1: Resolve engine ───────────────────────────────────────────
    let composer = resolve_composer(config);

    let total_pages = images.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages);
    }

    // ── Step 2: Decode and place images ──────────────────────────────────
    let page_w = config.page_size.width_pt();
    let page_h = config.page_size.height_pt();
    let decode_start = Instant::now();
    let mut placed = Vec::with_capacity(images.len());

    for (idx, file) in images.iter().enumerate() {
        let page_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let rgb = match decode::decode_image(page_num, file.name(), file.bytes()) {
            Ok(rgb) => rgb,
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total_pages, &e.to_string());
                }
                return Err(e);
            }
        };

        let placement =
            layout::fit_to_page(rgb.width() as f32, rgb.height() as f32, page_w, page_h);
        debug!(page_num, scale = placement.scale, "Image placed");

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total_pages, rgb.as_raw().len());
        }
        placed.push(PlacedBitmap {
            image: rgb,
            placement,
        });
    }
    let codec_ms = decode_start.elapsed().as_millis() as u64;

    // ── Step 3: Compose the document ─────────────────────────────────────
    let compose_start = Instant::now();
    let pdf = composer.compose(config.page_size, placed).await?;
    let engine_ms = compose_start.elapsed().as_millis() as u64;
    info!(
        "Composed {} pages into {} bytes in {}ms",
        total_pages,
        pdf.len(),
        engine_ms
    );

    // ── Step 4: Package output ───────────────────────────────────────────
    let output_bytes = pdf.len() as u64;
    let file = ConvertedFile {
        name: ASSEMBLED_PDF_NAME.to_string(),
        payload: PreviewHandle::new(Arc::new(pdf), MIME_PDF, &config.handle_registry),
    };

    let stats = ConversionStats {
        input_files: images.len(),
        pages: total_pages,
        output_files: 1,
        output_bytes,
        engine_ms,
        codec_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, output_bytes);
    }

    Ok(ConversionOutput {
        files: vec![file],
        stats,
    })
}

/// Bundle converted files into one download archive.
///
/// Every file is stored under its own name; names are already unique
/// because extraction suffixes the page number.
pub async fn bundle(
    files: &[ConvertedFile],
    config: &ConversionConfig,
) -> Result<ConvertedFile, RepageError> {
    let archiver = resolve_archiver(config);

    let entries: Vec<ArchiveEntry> = files
        .iter()
        .map(|f| ArchiveEntry {
            name: f.name.clone(),
            bytes: f.payload.shared_bytes(),
        })
        .collect();

    let count = entries.len();
    let bytes = archiver.bundle(entries).await?;
    info!(
        "Bundled {} files into {} ({} bytes)",
        count,
        ARCHIVE_NAME,
        bytes.len()
    );

    Ok(ConvertedFile {
        name: ARCHIVE_NAME.to_string(),
        payload: PreviewHandle::new(Arc::new(bytes), MIME_ZIP, &config.handle_registry),
    })
}

/// Report a document's page count and natural page sizes without converting.
pub async fn inspect(
    document: &InputFile,
    config: &ConversionConfig,
) -> Result<DocumentInfo, RepageError> {
    document.validate_pdf()?;
    let rasterizer = resolve_rasterizer(config);
    rasterizer.inspect(document).await
}

/// Write one converted file into `dir`, creating the directory if needed.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_file(
    file: &ConvertedFile,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, RepageError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| RepageError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let path = dir.join(&file.name);
    let tmp_path = dir.join(format!("{}.tmp", file.name));

    tokio::fs::write(&tmp_path, file.payload.bytes())
        .await
        .map_err(|e| RepageError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| RepageError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    Ok(path)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the page rasterizer: the pre-built engine from the config when
/// present (useful in tests or for custom engines), pdfium otherwise.
///
/// Resolution is infallible; a missing pdfium library only surfaces when
/// the engine is actually used.
fn resolve_rasterizer(config: &ConversionConfig) -> Arc<dyn PageRasterizer> {
    match config.rasterizer {
        Some(ref rasterizer) => Arc::clone(rasterizer),
        None => Arc::new(PdfiumRasterizer::new()),
    }
}

/// Resolve the document composer: config slot first, printpdf otherwise.
fn resolve_composer(config: &ConversionConfig) -> Arc<dyn DocumentComposer> {
    match config.composer {
        Some(ref composer) => Arc::clone(composer),
        None => Arc::new(PrintpdfComposer::new()),
    }
}

/// Resolve the archiver: config slot first, zip otherwise.
fn resolve_archiver(config: &ConversionConfig) -> Arc<dyn Archiver> {
    match config.archiver {
        Some(ref archiver) => Arc::clone(archiver),
        None => Arc::new(ZipArchiver::new()),
    }
}
