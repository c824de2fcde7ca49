//! pdfium-backed page rasterisation.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread pool thread designed for blocking operations, preventing the
//! Tokio worker threads from stalling during CPU-heavy rendering.
//!
//! ## Binding order
//!
//! 1. `PDFIUM_LIB_PATH` — a library file, or a directory containing one.
//! 2. The platform library name in the working directory.
//! 3. The system library.
//!
//! Binding happens per operation rather than once at startup so a session
//! that never touches the PDF-to-JPEG direction never needs pdfium at all.

use super::PageRasterizer;
use crate::error::RepageError;
use crate::output::{DocumentInfo, PageDims};
use crate::pipeline::input::InputFile;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Production [`PageRasterizer`] over the pdfium C++ library.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    async fn inspect(&self, document: &InputFile) -> Result<DocumentInfo, RepageError> {
        let name = document.name().to_string();
        let bytes = document.shared_bytes();

        tokio::task::spawn_blocking(move || inspect_blocking(&name, &bytes))
            .await
            .map_err(|e| RepageError::Internal(format!("Inspect task panicked: {}", e)))?
    }

    async fn rasterize(
        &self,
        document: &InputFile,
        scale: f32,
    ) -> Result<Vec<DynamicImage>, RepageError> {
        let name = document.name().to_string();
        let bytes = document.shared_bytes();

        tokio::task::spawn_blocking(move || rasterize_blocking(&name, &bytes, scale))
            .await
            .map_err(|e| RepageError::Internal(format!("Render task panicked: {}", e)))?
    }
}

/// Bind to a pdfium library, trying the documented locations in order.
fn bind_pdfium() -> Result<Pdfium, RepageError> {
    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        let path = PathBuf::from(&env_path);
        let lib = if path.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&path)
        } else {
            path
        };
        let bindings = Pdfium::bind_to_library(&lib).map_err(|e| {
            RepageError::PdfiumBindingFailed(format!("PDFIUM_LIB_PATH '{}': {}", env_path, e))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| RepageError::PdfiumBindingFailed(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of document inspection.
fn inspect_blocking(name: &str, bytes: &[u8]) -> Result<DocumentInfo, RepageError> {
    let pdfium = bind_pdfium()?;

    let document =
        pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| RepageError::CorruptDocument {
                name: name.to_string(),
                detail: format!("{:?}", e),
            })?;

    let pages: Vec<PageDims> = document
        .pages()
        .iter()
        .map(|page| PageDims {
            width_pt: page.width().value,
            height_pt: page.height().value,
        })
        .collect();

    debug!(name, page_count = pages.len(), "Inspected document");
    Ok(DocumentInfo {
        page_count: pages.len(),
        pages,
    })
}

/// Blocking implementation of page rendering.
fn rasterize_blocking(
    name: &str,
    bytes: &[u8],
    scale: f32,
) -> Result<Vec<DynamicImage>, RepageError> {
    let pdfium = bind_pdfium()?;

    let document =
        pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| RepageError::CorruptDocument {
                name: name.to_string(),
                detail: format!("{:?}", e),
            })?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!(name, pages = total, scale, "PDF loaded, rendering pages");

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let mut images = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| RepageError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}
