//! Engine seams: the three third-party capabilities behind trait objects.
//!
//! None of the conversion logic parses PDF syntax, writes PDF objects, or
//! deflates bytes itself. Each of those jobs belongs to an engine crate
//! reached through one of the traits below, injected via
//! [`crate::config::ConversionConfig`]. When no engine is injected, the
//! `resolve_*` helpers in [`crate::convert`] fall back to the production
//! implementations re-exported here. Tests substitute fakes through the
//! same config slots.

use crate::config::PageSize;
use crate::error::RepageError;
use crate::output::DocumentInfo;
use crate::pipeline::input::InputFile;
use crate::pipeline::layout::Placement;
use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use std::sync::Arc;

pub mod archive;
pub mod compose;
pub mod raster;

pub use archive::ZipArchiver;
pub use compose::PrintpdfComposer;
pub use raster::PdfiumRasterizer;

/// Renders PDF pages to bitmaps. Production engine: [`PdfiumRasterizer`].
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Engine name for logs and config dumps.
    fn name(&self) -> &'static str;

    /// Page count and natural page sizes, with nothing rendered.
    async fn inspect(&self, document: &InputFile) -> Result<DocumentInfo, RepageError>;

    /// Renders every page in document order at `scale` times natural size.
    async fn rasterize(
        &self,
        document: &InputFile,
        scale: f32,
    ) -> Result<Vec<DynamicImage>, RepageError>;
}

/// One bitmap with its resolved placement, filling one output page.
#[derive(Debug, Clone)]
pub struct PlacedBitmap {
    pub image: RgbImage,
    pub placement: Placement,
}

/// Writes placed bitmaps into one paginated PDF. Production engine:
/// [`PrintpdfComposer`].
#[async_trait]
pub trait DocumentComposer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produces one `page`-sized output page per bitmap, in input order.
    async fn compose(
        &self,
        page: PageSize,
        pages: Vec<PlacedBitmap>,
    ) -> Result<Vec<u8>, RepageError>;
}

/// A named byte blob destined for the download archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Bundles named blobs into one archive. Production engine: [`ZipArchiver`].
#[async_trait]
pub trait Archiver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stores every entry under its own name, in order.
    async fn bundle(&self, entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, RepageError>;
}
