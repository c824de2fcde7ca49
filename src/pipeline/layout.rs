//! Aspect-fit placement geometry for document assembly.
//!
//! Pure arithmetic, no engine types: given a source bitmap size and a target
//! page size (both in points), compute the uniform scale and the centred
//! origin. Assembly feeds the result straight to the PDF composer.

/// Points per millimetre (1 pt = 1/72 inch, 25.4 mm per inch).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Converts millimetres to PostScript points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Resolved position and size of one bitmap on one output page, in points.
///
/// `x`/`y` are measured from the bottom-left page corner, matching PDF
/// user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Uniform factor applied to the source size to reach `width`/`height`.
    pub scale: f32,
}

/// Fits an `img_w` × `img_h` bitmap inside a `page_w` × `page_h` page.
///
/// The scale is `min(page_w / img_w, page_h / img_h)`: aspect ratio is
/// preserved, nothing is cropped, and a small source is scaled up until it
/// touches a page edge. The placed bitmap is centred on both axes, so the
/// non-touching axis gets equal gaps on both sides.
pub fn fit_to_page(img_w: f32, img_h: f32, page_w: f32, page_h: f32) -> Placement {
    let scale = (page_w / img_w).min(page_h / img_h);
    let width = img_w * scale;
    let height = img_h * scale;
    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
        scale,
    }
}
