//! Image decoding: selected JPEG bytes → RGB bitmap for assembly.
//!
//! Decoding serves two purposes at once: it discovers the pixel dimensions
//! the layout step needs, and it produces the flat RGB8 buffer the PDF
//! composer embeds. A decode failure is indexed so the user learns *which*
//! image in their ordered sequence is broken.

use crate::error::RepageError;
use image::RgbImage;
use tracing::debug;

/// Decode one image of the ordered sequence.
///
/// `index` is the 1-based position in the sequence (matching page numbers),
/// `name` the user-visible file name; both only feed error context.
pub fn decode_image(index: usize, name: &str, bytes: &[u8]) -> Result<RgbImage, RepageError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| RepageError::AssemblyFailed {
        index,
        name: name.to_string(),
        detail: e.to_string(),
    })?;

    let rgb = decoded.to_rgb8();
    debug!(
        index,
        name,
        width = rgb.width(),
        height = rgb.height(),
        "Decoded image"
    );
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::encode_page;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn decode_preserves_dimensions() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            40,
            25,
            Rgba([0, 128, 255, 255]),
        ));
        let jpeg = encode_page(1, &source, 90).unwrap();

        let rgb = decode_image(1, "tile.jpg", &jpeg).unwrap();
        assert_eq!((rgb.width(), rgb.height()), (40, 25));
    }

    #[test]
    fn garbage_reports_position_and_name() {
        let err = decode_image(4, "broken.jpg", b"not an image").unwrap_err();
        match err {
            RepageError::AssemblyFailed { index, name, .. } => {
                assert_eq!(index, 4);
                assert_eq!(name, "broken.jpg");
            }
            other => panic!("expected AssemblyFailed, got {other:?}"),
        }
    }
}
