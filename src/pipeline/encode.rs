//! Page encoding: rasterised `DynamicImage` → JPEG bytes.
//!
//! ## Why flatten to RGB first?
//!
//! pdfium hands back RGBA bitmaps, but JPEG has no alpha channel and the
//! encoder rejects four-channel buffers outright. `to_rgb8` composites the
//! page onto its own opaque background, which is exactly what a rendered
//! PDF page is anyway.

use crate::error::RepageError;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// Encode one rasterised page as JPEG at the configured quality (1–100).
///
/// `page` is the 1-based page number, used only for error context.
pub fn encode_page(page: usize, img: &DynamicImage, quality: u8) -> Result<Vec<u8>, RepageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| RepageError::EncodingFailed {
            page,
            detail: e.to_string(),
        })?;

    debug!(
        page,
        width = rgb.width(),
        height = rgb.height(),
        bytes = buf.len(),
        "Encoded page to JPEG"
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_page(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn encodes_rgba_input_as_jpeg() {
        let bytes = encode_page(1, &red_page(10, 10), 80).expect("encode should succeed");
        assert!(bytes.len() > 2);
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF], "missing JPEG SOI marker");
    }

    #[test]
    fn quality_extremes_both_encode() {
        assert!(encode_page(1, &red_page(32, 32), 1).is_ok());
        assert!(encode_page(1, &red_page(32, 32), 100).is_ok());
    }
}
