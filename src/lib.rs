//! # repage
//!
//! Convert PDF documents to per-page JPEG images, and ordered JPEG images
//! back into a single PDF.
//!
//! ## Why this crate?
//!
//! The two chores around paged documents are mirror images: splitting a PDF
//! into images you can crop, share, or embed, and stitching a folder of
//! scans or photos back into one document. Doing both well needs the same
//! small core — magic-byte gating, a page geometry model, and engines that
//! stay off the async runtime — so this crate ships both directions behind
//! one configuration and one session type, with previews and downloads
//! handled for you.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF → JPEG
//!  │
//!  ├─ 1. Gate     %PDF magic check
//!  ├─ 2. Count    page count and sizes via pdfium
//!  ├─ 3. Render   rasterise at 2× (CPU-bound, spawn_blocking)
//!  ├─ 4. Encode   JPEG at quality 80, one file per page
//!  └─ 5. Deliver  <stem>_page_<n>.jpg, zipped when several
//!
//! JPEG → PDF
//!  │
//!  ├─ 1. Gate     JPEG magic check, all-or-nothing, capped at 30
//!  ├─ 2. Order    move / drag-reorder the selection
//!  ├─ 3. Decode   JPEG → RGB bitmap
//!  ├─ 4. Layout   aspect-fit, centred on an A4 page
//!  └─ 5. Compose  one page per image via printpdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repage::{ConversionConfig, ConverterSession, InputFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = ConverterSession::new(ConversionConfig::default());
//!     session.select_files(vec![InputFile::from_path("scan.pdf").await?])?;
//!     session.convert().await;
//!
//!     for file in session.results() {
//!         tokio::fs::write(&file.name, file.payload.bytes()).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `repage` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! repage = { version = "0.3", default-features = false }
//! ```
//!
//! ## Conversion Profile
//!
//! | Knob | Default | Range |
//! |------|---------|-------|
//! | Render scale  | 2.0 (≈144 DPI) | 0.25 – 8.0 |
//! | JPEG quality  | 80             | 1 – 100 |
//! | Page size     | A4 portrait    | any `PageSize` |
//! | Selection cap | 30 images      | ≥ 1 |
//!
//! The defaults match what the conversion was tuned for: screen-readable
//! page images and print-ready A4 assembly. Everything is overridable
//! through [`ConversionConfig::builder`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod progress;
pub mod selection;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSize};
pub use convert::{
    bundle, images_to_pdf, inspect, pdf_to_images, write_file, ARCHIVE_NAME, ASSEMBLED_PDF_NAME,
};
pub use engine::{
    ArchiveEntry, Archiver, DocumentComposer, PageRasterizer, PdfiumRasterizer, PlacedBitmap,
    PrintpdfComposer, ZipArchiver,
};
pub use error::RepageError;
pub use output::{
    ConversionOutput, ConversionStats, ConvertedFile, DocumentInfo, DownloadArtifact, DownloadKind,
    FileSummary, PageDims,
};
pub use pipeline::input::InputFile;
pub use preview::{HandleRegistry, PreviewHandle, MIME_JPEG, MIME_PDF, MIME_ZIP};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use selection::{ImageEntry, Selection, SelectionNotice};
pub use session::{ConversionMode, ConversionStatus, ConverterSession};
