//! Error types for the repage library.
//!
//! One error type covers the whole crate: [`RepageError`]. Conversions are
//! all-or-nothing — a single bad page or image fails the run and no partial
//! results are kept — so there is no non-fatal per-page error to track.
//!
//! Oversized image selections are deliberately NOT errors: the selection
//! layer truncates and reports a [`crate::selection::SelectionNotice`]
//! instead, because the retained inputs are still perfectly convertible.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the repage library.
#[derive(Debug, Error)]
pub enum RepageError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but does not start with the PDF magic bytes.
    #[error("File is not a valid PDF: '{name}'\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    /// The file was read but does not start with the JPEG SOI marker.
    #[error("File is not a valid JPEG: '{name}'\nFirst bytes: {magic:?}\nOnly JPEG images can be assembled into a PDF.")]
    NotAJpeg { name: String, magic: [u8; 4] },

    /// A conversion was requested with nothing selected.
    #[error("Nothing to convert: the selection is empty")]
    EmptySelection,

    // ── Extraction errors (PDF → JPEG) ────────────────────────────────────
    /// The document header parsed but pdfium could not open the body.
    #[error("PDF '{name}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptDocument { name: String, detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// A rendered page bitmap could not be JPEG-encoded.
    #[error("JPEG encoding failed for page {page}: {detail}")]
    EncodingFailed { page: usize, detail: String },

    // ── Assembly errors (JPEG → PDF) ──────────────────────────────────────
    /// An image in the ordered sequence could not be decoded.
    #[error("Image {index} ('{name}') could not be decoded: {detail}")]
    AssemblyFailed {
        index: usize,
        name: String,
        detail: String,
    },

    /// The PDF writer failed to serialise the assembled document.
    #[error("Failed to compose the output PDF: {detail}")]
    ComposeFailed { detail: String },

    // ── Archive errors ────────────────────────────────────────────────────
    /// The zip writer failed while bundling converted files.
    #[error("Failed to build the download archive: {detail}")]
    ArchiveFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
repage needs a pdfium shared library for the PDF-to-JPEG direction.\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/dir containing libpdfium.\n\
  • Place libpdfium next to the executable.\n\
  • Install pdfium system-wide so the dynamic linker finds it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
