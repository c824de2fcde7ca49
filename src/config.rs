//! Configuration types for repage conversions.
//!
//! Both conversion directions are controlled through [`ConversionConfig`],
//! built via its [`ConversionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across sessions, log them, and
//! diff two runs to understand why their outputs differ.

use crate::engine::{Archiver, DocumentComposer, PageRasterizer};
use crate::error::RepageError;
use crate::pipeline::layout;
use crate::preview::HandleRegistry;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a conversion session.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use repage::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .render_scale(3.0)
///     .jpeg_quality(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Magnification applied when rasterising each PDF page. Range: 0.25–8.0. Default: 2.0.
    ///
    /// PDF user space is 72 points per inch, so 2.0 renders at roughly
    /// 144 DPI: sharp enough to re-read on screen while a 30-page document
    /// still fits comfortably in memory. Raise it for small-print documents;
    /// the cost grows with the square of the factor.
    pub render_scale: f32,

    /// JPEG quality for extracted pages. Range: 1–100. Default: 80.
    ///
    /// 80 keeps text legible at a fraction of the lossless size. Below ~50
    /// ringing artefacts appear around glyph edges.
    pub jpeg_quality: u8,

    /// Output page size for document assembly. Default: [`PageSize::A4`].
    pub page_size: PageSize,

    /// Maximum number of images accepted into one assembly selection. Default: 30.
    ///
    /// Excess files are truncated with a single notice, never an error: the
    /// retained prefix is still perfectly convertible.
    pub max_images: usize,

    /// Progress observer fired per page/image. If None, progress is silent.
    pub progress_callback: Option<ProgressCallback>,

    /// Registry that accounts for every live preview handle.
    ///
    /// Sessions, pipeline outputs, and tests share one registry so leak
    /// checks (`registry.live() == 0` after reset) see everything.
    pub handle_registry: HandleRegistry,

    /// Pre-constructed page rasterizer. If None, the pdfium engine is used.
    ///
    /// Useful in tests to substitute a fake engine.
    pub rasterizer: Option<Arc<dyn PageRasterizer>>,

    /// Pre-constructed document composer. If None, the printpdf engine is used.
    pub composer: Option<Arc<dyn DocumentComposer>>,

    /// Pre-constructed archiver. If None, the zip engine is used.
    pub archiver: Option<Arc<dyn Archiver>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            jpeg_quality: 80,
            page_size: PageSize::default(),
            max_images: 30,
            progress_callback: None,
            handle_registry: HandleRegistry::new(),
            rasterizer: None,
            composer: None,
            archiver: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("render_scale", &self.render_scale)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("page_size", &self.page_size)
            .field("max_images", &self.max_images)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .field("handle_registry", &self.handle_registry)
            .field("rasterizer", &self.rasterizer.as_ref().map(|r| r.name()))
            .field("composer", &self.composer.as_ref().map(|c| c.name()))
            .field("archiver", &self.archiver.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale.clamp(0.25, 8.0);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn max_images(mut self, n: usize) -> Self {
        self.config.max_images = n.max(1);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    pub fn handle_registry(mut self, registry: HandleRegistry) -> Self {
        self.config.handle_registry = registry;
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn composer(mut self, composer: Arc<dyn DocumentComposer>) -> Self {
        self.config.composer = Some(composer);
        self
    }

    pub fn archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.config.archiver = Some(archiver);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, RepageError> {
        let c = &self.config;
        if !c.render_scale.is_finite() || c.render_scale < 0.25 || c.render_scale > 8.0 {
            return Err(RepageError::InvalidConfig(format!(
                "Render scale must be 0.25–8.0, got {}",
                c.render_scale
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(RepageError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.max_images == 0 {
            return Err(RepageError::InvalidConfig("Image limit must be ≥ 1".into()));
        }
        if c.page_size.width_mm <= 0.0 || c.page_size.height_mm <= 0.0 {
            return Err(RepageError::InvalidConfig(format!(
                "Page size must be positive, got {} × {} mm",
                c.page_size.width_mm, c.page_size.height_mm
            )));
        }
        Ok(self.config)
    }
}

// ── Page sizes ─────────────────────────────────────────────────────────────

/// Output page size for assembly, in millimetres, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    /// ISO A4: 210 × 297 mm.
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// US Letter: 215.9 × 279.4 mm.
    pub const LETTER: PageSize = PageSize {
        width_mm: 215.9,
        height_mm: 279.4,
    };

    pub fn width_pt(&self) -> f32 {
        layout::mm_to_pt(self.width_mm)
    }

    pub fn height_pt(&self) -> f32 {
        layout::mm_to_pt(self.height_mm)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}
