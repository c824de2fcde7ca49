//! End-to-end tests for repage.
//!
//! These tests render real PDFs through pdfium, so they need the native
//! library to be discoverable (next to the binary, on the system path, or
//! via PDFIUM_LIB_PATH). They are gated behind the `REPAGE_E2E` environment
//! variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   REPAGE_E2E=1 cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   REPAGE_E2E=1 cargo test --test e2e roundtrip -- --nocapture

use repage::{images_to_pdf, inspect, pdf_to_images, ConversionConfig, InputFile};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if REPAGE_E2E is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("REPAGE_E2E").is_err() {
            println!("SKIP — set REPAGE_E2E=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            println!("       Drop any small PDF there to enable this test");
            return;
        }
        p
    }};
}

fn jpeg_file(name: &str, width: u32, height: u32) -> InputFile {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 60]));
    let mut bytes = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 85);
    img.write_with_encoder(encoder).expect("encode test jpeg");
    InputFile::new(name, bytes)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_reports_positive_page_dimensions() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let document = InputFile::from_path(&path).await.expect("read sample");
    let config = ConversionConfig::default();
    let info = inspect(&document, &config).await.expect("inspect sample");

    assert!(info.page_count >= 1, "sample must have at least one page");
    assert_eq!(info.pages.len(), info.page_count);
    for (i, page) in info.pages.iter().enumerate() {
        assert!(
            page.width_pt > 0.0 && page.height_pt > 0.0,
            "page {} has degenerate dimensions {}x{}",
            i + 1,
            page.width_pt,
            page.height_pt
        );
    }
}

#[tokio::test]
async fn test_extraction_emits_one_jpeg_per_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let document = InputFile::from_path(&path).await.expect("read sample");
    let config = ConversionConfig::default();

    let info = inspect(&document, &config).await.expect("inspect sample");
    let output = pdf_to_images(&document, &config).await.expect("extract");

    assert_eq!(output.files.len(), info.page_count);
    for (i, file) in output.files.iter().enumerate() {
        assert_eq!(file.name, format!("sample_page_{}.jpg", i + 1));
        assert!(
            file.payload.bytes().starts_with(&[0xFF, 0xD8, 0xFF]),
            "{} is not a JPEG",
            file.name
        );
    }

    // Keep artifacts around for manual inspection.
    for file in &output.files {
        repage::write_file(file, output_dir())
            .await
            .expect("write page");
    }
    println!(
        "extracted {} pages in {}ms ({} engine / {} codec)",
        output.stats.pages, output.stats.total_ms, output.stats.engine_ms, output.stats.codec_ms
    );
}

#[tokio::test]
async fn test_roundtrip_assembled_pdf_extracts_back() {
    // Assembly itself needs no pdfium, but the extraction leg does.
    if std::env::var("REPAGE_E2E").is_err() {
        println!("SKIP — set REPAGE_E2E=1 to run e2e tests");
        return;
    }

    let config = ConversionConfig::default();
    let images = vec![
        jpeg_file("first.jpg", 120, 80),
        jpeg_file("second.jpg", 80, 120),
        jpeg_file("third.jpg", 100, 100),
    ];

    let assembled = images_to_pdf(&images, &config).await.expect("assemble");
    let pdf = InputFile::new(
        "roundtrip.pdf",
        assembled.files[0].payload.bytes().to_vec(),
    );

    let extracted = pdf_to_images(&pdf, &config).await.expect("extract back");
    assert_eq!(extracted.files.len(), 3);
    assert_eq!(extracted.files[0].name, "roundtrip_page_1.jpg");
}
