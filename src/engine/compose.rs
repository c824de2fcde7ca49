//! printpdf-backed document composition.
//!
//! printpdf 0.8 uses a data-oriented API: the document is built by
//! constructing `PdfPage` structs containing `Vec<Op>` operation lists,
//! then serialised in one go via `PdfDocument::save()`. Serialisation of a
//! 30-image document is CPU-heavy enough to warrant `spawn_blocking`.

use super::{DocumentComposer, PlacedBitmap};
use crate::config::PageSize;
use crate::error::RepageError;
use async_trait::async_trait;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, warn};

/// Embedded-image DPI that makes one source pixel equal one point, so the
/// placement's `scale` is the complete transform factor.
const BASE_DPI: f32 = 72.0;

/// Title written into the /Info dictionary of assembled documents.
const DOCUMENT_TITLE: &str = "converted_document";

/// Production [`DocumentComposer`] over printpdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintpdfComposer;

impl PrintpdfComposer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentComposer for PrintpdfComposer {
    fn name(&self) -> &'static str {
        "printpdf"
    }

    async fn compose(
        &self,
        page: PageSize,
        pages: Vec<PlacedBitmap>,
    ) -> Result<Vec<u8>, RepageError> {
        tokio::task::spawn_blocking(move || compose_blocking(page, pages))
            .await
            .map_err(|e| RepageError::Internal(format!("Compose task panicked: {}", e)))?
    }
}

/// Blocking implementation of document composition.
fn compose_blocking(page: PageSize, placed: Vec<PlacedBitmap>) -> Result<Vec<u8>, RepageError> {
    let page_w = Mm(page.width_mm);
    let page_h = Mm(page.height_mm);

    let mut doc = PdfDocument::new(DOCUMENT_TITLE);
    let mut pdf_pages: Vec<PdfPage> = Vec::with_capacity(placed.len());

    for bitmap in placed {
        let (px_w, px_h) = (bitmap.image.width(), bitmap.image.height());
        let raw = RawImage {
            pixels: RawImageData::U8(bitmap.image.into_raw()),
            width: px_w as usize,
            height: px_h as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        let p = bitmap.placement;
        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(p.x)),
                translate_y: Some(Pt(p.y)),
                scale_x: Some(p.scale),
                scale_y: Some(p.scale),
                dpi: Some(BASE_DPI),
                rotate: None,
            },
        }];

        debug!(
            px_w,
            px_h,
            x = p.x,
            y = p.y,
            scale = p.scale,
            "Placed image on page"
        );
        pdf_pages.push(PdfPage::new(page_w, page_h, ops));
    }

    let page_count = pdf_pages.len();
    doc.with_pages(pdf_pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "PDF writer reported warnings");
    }

    debug!(pages = page_count, bytes = output.len(), "Document composed");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout;
    use image::{Rgb, RgbImage};

    fn placed(px_w: u32, px_h: u32, page: PageSize) -> PlacedBitmap {
        PlacedBitmap {
            image: RgbImage::from_pixel(px_w, px_h, Rgb([200, 10, 10])),
            placement: layout::fit_to_page(
                px_w as f32,
                px_h as f32,
                page.width_pt(),
                page.height_pt(),
            ),
        }
    }

    #[tokio::test]
    async fn composes_one_page_per_bitmap() {
        let page = PageSize::A4;
        let composer = PrintpdfComposer::new();
        let bytes = composer
            .compose(page, vec![placed(20, 30, page), placed(30, 20, page)])
            .await
            .unwrap();

        assert!(bytes.starts_with(b"%PDF"), "output is not a PDF");
        let document = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(document.get_pages().len(), 2);
    }
}
