//! Interactive conversion session: one mode, one selection, one result set.
//!
//! [`ConverterSession`] is the stateful surface a frontend drives. It walks
//! a four-state machine:
//!
//! ```text
//!          select_files()            convert()
//!   Idle ◀──────────────── Idle ──────────────▶ Processing
//!    ▲                                           │       │
//!    │ reset() / set_mode() / select_files()     ▼       ▼
//!    └──────────────────────────────────── Success     Error
//! ```
//!
//! Conversion errors never escape [`ConverterSession::convert`]; they land
//! in `last_error` as a displayable message and the machine moves to
//! `Error`. Results exist only in `Success`, and results from an earlier
//! run never survive a new selection or a new conversion attempt.

use crate::config::ConversionConfig;
use crate::convert;
use crate::error::RepageError;
use crate::output::{ConversionStats, ConvertedFile, DownloadArtifact, DownloadKind};
use crate::pipeline::input::InputFile;
use crate::selection::{Selection, SelectionNotice};
use tracing::{debug, error, info};

/// Which direction the session converts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// Extract every page of one PDF as a JPEG image.
    PdfToJpeg,
    /// Assemble an ordered set of JPEGs into one PDF.
    JpegToPdf,
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    /// No conversion attempted since the last selection or reset.
    Idle,
    /// A conversion is running. New conversion requests are ignored.
    Processing,
    /// The last conversion finished and its results are available.
    Success,
    /// The last conversion failed; see `last_error`.
    Error,
}

/// Stateful two-direction converter.
///
/// # Example
/// ```rust
/// use repage::{ConversionConfig, ConversionMode, ConverterSession, InputFile};
///
/// let mut session = ConverterSession::new(ConversionConfig::default());
/// session.set_mode(ConversionMode::JpegToPdf);
///
/// let jpeg = |name: &str| InputFile::new(name, vec![0xFF, 0xD8, 0xFF, 0xE0]);
/// session
///     .select_files(vec![jpeg("cover.jpg"), jpeg("body.jpg")])
///     .unwrap();
/// assert!(session.move_image(0, 1));
///
/// session.reset();
/// assert_eq!(session.config().handle_registry.live(), 0);
/// ```
#[derive(Debug)]
pub struct ConverterSession {
    config: ConversionConfig,
    mode: ConversionMode,
    status: ConversionStatus,
    document: Option<InputFile>,
    images: Selection,
    results: Vec<ConvertedFile>,
    last_stats: Option<ConversionStats>,
    last_error: Option<String>,
}

impl ConverterSession {
    /// Create a session in PDF-to-JPEG mode with nothing selected.
    pub fn new(config: ConversionConfig) -> Self {
        ConverterSession {
            config,
            mode: ConversionMode::PdfToJpeg,
            status: ConversionStatus::Idle,
            document: None,
            images: Selection::new(),
            results: Vec::new(),
            last_stats: None,
            last_error: None,
        }
    }

    /// Switch direction. Everything mode-specific is discarded: the
    /// selection, any results, any error. The machine returns to `Idle`.
    /// Setting the mode the session is already in is a no-op.
    pub fn set_mode(&mut self, mode: ConversionMode) {
        if self.mode == mode {
            return;
        }
        debug!("Switching mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.reset();
    }

    /// Replace the selection with `files`, validated for the current mode.
    ///
    /// In PDF mode only the first file is kept (the direction takes a
    /// single document); in JPEG mode the whole batch is kept up to the
    /// configured cap, all-or-nothing. Either way a successful selection
    /// discards previous results and returns the machine to `Idle`; a
    /// failed one leaves the session exactly as it was.
    ///
    /// An empty `files` is a no-op.
    pub fn select_files(
        &mut self,
        files: Vec<InputFile>,
    ) -> Result<Option<SelectionNotice>, RepageError> {
        if files.is_empty() {
            return Ok(None);
        }

        let notice = match self.mode {
            ConversionMode::PdfToJpeg => {
                if files.len() > 1 {
                    debug!("Ignoring {} extra files in PDF mode", files.len() - 1);
                }
                let mut files = files;
                let document = files.swap_remove(0);
                document.validate_pdf()?;
                info!("Selected document: {}", document.name());
                self.document = Some(document);
                None
            }
            ConversionMode::JpegToPdf => self.images.select(files, &self.config)?,
        };

        self.results.clear();
        self.last_stats = None;
        self.last_error = None;
        self.status = ConversionStatus::Idle;
        Ok(notice)
    }

    /// Run the conversion for the current mode and selection.
    ///
    /// Never returns an error: failures are absorbed into the state machine
    /// (`Error` status plus `last_error`) so a frontend has a single place
    /// to look. Calling with a conversion already in flight, or with
    /// nothing selected, changes nothing and reports the current status.
    pub async fn convert(&mut self) -> ConversionStatus {
        if self.status == ConversionStatus::Processing {
            debug!("Conversion already in flight; ignoring request");
            return self.status;
        }

        let outcome = match self.mode {
            ConversionMode::PdfToJpeg => {
                let document = match self.document.clone() {
                    Some(document) => document,
                    None => return self.status,
                };
                self.begin();
                convert::pdf_to_images(&document, &self.config).await
            }
            ConversionMode::JpegToPdf => {
                if self.images.is_empty() {
                    return self.status;
                }
                let files = self.images.files();
                self.begin();
                convert::images_to_pdf(&files, &self.config).await
            }
        };

        match outcome {
            Ok(output) => {
                self.results = output.files;
                self.last_stats = Some(output.stats);
                self.status = ConversionStatus::Success;
            }
            Err(e) => {
                error!("Conversion failed: {}", e);
                self.last_error = Some(e.to_string());
                self.status = ConversionStatus::Error;
            }
        }
        self.status
    }

    /// Hand out everything the last conversion produced as one download.
    ///
    /// A single result is returned directly; several results are bundled
    /// into a zip archive first. Returns `None` when there is nothing to
    /// download, or when bundling fails (in which case the session moves
    /// to `Error` and the stale results are dropped).
    pub async fn download_all(&mut self) -> Option<DownloadArtifact> {
        if self.status != ConversionStatus::Success || self.results.is_empty() {
            return None;
        }

        if self.results.len() == 1 {
            return Some(DownloadArtifact {
                file: self.results[0].clone(),
                kind: DownloadKind::SingleFile,
            });
        }

        match convert::bundle(&self.results, &self.config).await {
            Ok(file) => Some(DownloadArtifact {
                file,
                kind: DownloadKind::ZipArchive,
            }),
            Err(e) => {
                error!("Bundling failed: {}", e);
                self.last_error = Some(e.to_string());
                self.results.clear();
                self.status = ConversionStatus::Error;
                None
            }
        }
    }

    /// Reorder the image selection; see [`Selection::move_entry`].
    pub fn move_image(&mut self, from: usize, to: usize) -> bool {
        self.images.move_entry(from, to)
    }

    /// Clear selection, results and errors, returning to `Idle`. Valid
    /// from any state. The mode is kept.
    pub fn reset(&mut self) {
        self.document = None;
        self.images.clear();
        self.results.clear();
        self.last_stats = None;
        self.last_error = None;
        self.status = ConversionStatus::Idle;
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub fn status(&self) -> ConversionStatus {
        self.status
    }

    /// The selected document, when in PDF mode and one is selected.
    pub fn document(&self) -> Option<&InputFile> {
        self.document.as_ref()
    }

    /// The image selection (read access; previews, order, names).
    pub fn images(&self) -> &Selection {
        &self.images
    }

    /// The image selection, mutably, for drag gestures.
    pub fn images_mut(&mut self) -> &mut Selection {
        &mut self.images
    }

    /// Results of the last successful conversion, in output order.
    pub fn results(&self) -> &[ConvertedFile] {
        &self.results
    }

    /// Timing and size figures for the last successful conversion.
    pub fn last_stats(&self) -> Option<&ConversionStats> {
        self.last_stats.as_ref()
    }

    /// Displayable message for the last failure, if the session is in
    /// `Error`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    /// Enter `Processing`, dropping anything left over from a previous run.
    fn begin(&mut self) {
        self.status = ConversionStatus::Processing;
        self.results.clear();
        self.last_stats = None;
        self.last_error = None;
    }
}
