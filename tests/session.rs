//! Session behaviour tests driven by stub engines.
//!
//! Engines are substituted through the config slots, so none of these tests
//! need a pdfium library. They exercise the state machine, selection rules,
//! output naming and ordering, download packaging, and preview accounting
//! over synthetic documents. The real printpdf composer and zip archiver do
//! run here; only PDF rasterisation is stubbed.

use async_trait::async_trait;
use image::DynamicImage;
use lopdf::content::Content;
use lopdf::Object;
use repage::{
    ArchiveEntry, Archiver, ConversionConfig, ConversionConfigBuilder, ConversionMode,
    ConversionStatus, ConverterSession, DocumentInfo, DownloadKind, InputFile, PageDims,
    PageRasterizer, RepageError, ARCHIVE_NAME, ASSEMBLED_PDF_NAME,
};
use std::io::{Cursor, Read};
use std::sync::Arc;

// ── Stub engines ─────────────────────────────────────────────────────────────

/// Pretends every document has a fixed number of A4 pages.
struct StubRasterizer {
    pages: usize,
}

#[async_trait]
impl PageRasterizer for StubRasterizer {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn inspect(&self, _document: &InputFile) -> Result<DocumentInfo, RepageError> {
        Ok(DocumentInfo {
            page_count: self.pages,
            pages: (0..self.pages)
                .map(|_| PageDims {
                    width_pt: 595.276,
                    height_pt: 841.89,
                })
                .collect(),
        })
    }

    async fn rasterize(
        &self,
        _document: &InputFile,
        _scale: f32,
    ) -> Result<Vec<DynamicImage>, RepageError> {
        Ok((0..self.pages)
            .map(|_| DynamicImage::new_rgb8(8, 12))
            .collect())
    }
}

/// Refuses every document, standing in for a corrupt input.
struct FailingRasterizer;

#[async_trait]
impl PageRasterizer for FailingRasterizer {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn inspect(&self, document: &InputFile) -> Result<DocumentInfo, RepageError> {
        Err(RepageError::CorruptDocument {
            name: document.name().to_string(),
            detail: "stub refusal".into(),
        })
    }

    async fn rasterize(
        &self,
        document: &InputFile,
        _scale: f32,
    ) -> Result<Vec<DynamicImage>, RepageError> {
        Err(RepageError::CorruptDocument {
            name: document.name().to_string(),
            detail: "stub refusal".into(),
        })
    }
}

/// Refuses to bundle, for the download failure path.
struct FailingArchiver;

#[async_trait]
impl Archiver for FailingArchiver {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn bundle(&self, _entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, RepageError> {
        Err(RepageError::ArchiveFailed {
            detail: "stub refusal".into(),
        })
    }
}

// ── Test helpers ─────────────────────────────────────────────────────────────

fn pdf_file(name: &str) -> InputFile {
    InputFile::new(name, b"%PDF-1.7\nstub".to_vec())
}

/// A tiny real JPEG so the gate, the decoder, and the layout all run.
fn jpeg_file(name: &str, width: u32, height: u32) -> InputFile {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 64, 64]));
    let mut bytes = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 90);
    img.write_with_encoder(encoder).expect("encode test jpeg");
    InputFile::new(name, bytes)
}

fn stubbed(pages: usize) -> ConversionConfigBuilder {
    ConversionConfig::builder().rasterizer(Arc::new(StubRasterizer { pages }))
}

fn page_count(pdf_bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf_bytes)
        .expect("parse assembled pdf")
        .get_pages()
        .len()
}

/// For each page in page order, follows the single `Do` operator in the
/// content stream to the image it draws and returns that image's pixel
/// `/Width`. The resources dictionary lists every image in the document,
/// so only the drawn name identifies which one is on the page.
fn drawn_image_widths(pdf_bytes: &[u8]) -> Vec<i64> {
    let doc = lopdf::Document::load_mem(pdf_bytes).expect("parse assembled pdf");
    let mut widths = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let content = doc.get_page_content(page_id).expect("page content");
        let ops = Content::decode(&content).expect("decode content stream").operations;
        let drawn: Vec<&[u8]> = ops
            .iter()
            .filter(|op| op.operator == "Do")
            .map(|op| op.operands[0].as_name().expect("Do takes an xobject name"))
            .collect();
        assert_eq!(drawn.len(), 1, "expected exactly one image drawn per page");
        widths.push(xobject_width(&doc, page_id, drawn[0]));
    }
    widths
}

/// Resolves `name` through the page's `Resources/XObject` dictionary and
/// reads the image stream's `/Width` entry.
fn xobject_width(doc: &lopdf::Document, page_id: lopdf::ObjectId, name: &[u8]) -> i64 {
    let page = doc.get_dictionary(page_id).expect("page dictionary");
    let resources = match page.get(b"Resources").expect("page resources") {
        Object::Reference(id) => doc.get_dictionary(*id).expect("resources dictionary"),
        Object::Dictionary(dict) => dict,
        other => panic!("unexpected resources object: {other:?}"),
    };
    let xobjects = match resources.get(b"XObject").expect("xobject resources") {
        Object::Reference(id) => doc.get_dictionary(*id).expect("xobject dictionary"),
        Object::Dictionary(dict) => dict,
        other => panic!("unexpected xobject object: {other:?}"),
    };
    let image = match xobjects.get(name).expect("drawn name is in resources") {
        Object::Reference(id) => doc.get_object(*id).expect("image object"),
        direct => direct,
    };
    image
        .as_stream()
        .expect("image xobject is a stream")
        .dict
        .get(b"Width")
        .expect("image stream width")
        .as_i64()
        .expect("width is an integer")
}

// ── PDF → JPEG ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn extraction_names_pages_in_order() {
    let config = stubbed(3).build().unwrap();
    let mut session = ConverterSession::new(config);

    session.select_files(vec![pdf_file("report.v2.pdf")]).unwrap();
    assert_eq!(session.convert().await, ConversionStatus::Success);

    let names: Vec<&str> = session.results().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "report.v2_page_1.jpg",
            "report.v2_page_2.jpg",
            "report.v2_page_3.jpg"
        ]
    );
    for file in session.results() {
        assert!(file.payload.bytes().starts_with(&[0xFF, 0xD8, 0xFF]));
        assert_eq!(file.payload.mime(), "image/jpeg");
    }
}

#[tokio::test]
async fn single_page_downloads_directly() {
    let config = stubbed(1).build().unwrap();
    let mut session = ConverterSession::new(config);

    session.select_files(vec![pdf_file("memo.pdf")]).unwrap();
    session.convert().await;

    let artifact = session.download_all().await.expect("download artifact");
    assert_eq!(artifact.kind, DownloadKind::SingleFile);
    assert_eq!(artifact.file.name, "memo_page_1.jpg");
}

#[tokio::test]
async fn several_pages_download_as_one_zip() {
    let config = stubbed(3).build().unwrap();
    let mut session = ConverterSession::new(config);

    session.select_files(vec![pdf_file("scan.pdf")]).unwrap();
    session.convert().await;

    let artifact = session.download_all().await.expect("download artifact");
    assert_eq!(artifact.kind, DownloadKind::ZipArchive);
    assert_eq!(artifact.file.name, ARCHIVE_NAME);
    assert_eq!(artifact.file.payload.mime(), "application/zip");

    let mut archive =
        zip::ZipArchive::new(Cursor::new(artifact.file.payload.bytes().to_vec())).unwrap();
    assert_eq!(archive.len(), 3);
    for i in 1..=3 {
        let mut entry = archive
            .by_name(&format!("scan_page_{i}.jpg"))
            .expect("page entry present");
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert!(contents.starts_with(&[0xFF, 0xD8, 0xFF]));
    }
}

#[tokio::test]
async fn failed_extraction_keeps_no_results() {
    let config = ConversionConfig::builder()
        .rasterizer(Arc::new(FailingRasterizer))
        .build()
        .unwrap();
    let registry = config.handle_registry.clone();
    let mut session = ConverterSession::new(config);

    session.select_files(vec![pdf_file("bad.pdf")]).unwrap();
    assert_eq!(session.convert().await, ConversionStatus::Error);

    assert!(session.results().is_empty());
    assert!(session.last_error().is_some());
    assert_eq!(registry.live(), 0);
    assert!(session.download_all().await.is_none());
}

// ── JPEG → PDF ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn assembly_follows_the_reordered_selection() {
    let mut session = ConverterSession::new(ConversionConfig::default());
    session.set_mode(ConversionMode::JpegToPdf);

    // Distinct pixel widths let each page be traced back to its source image.
    session
        .select_files(vec![
            jpeg_file("a.jpg", 21, 30),
            jpeg_file("b.jpg", 37, 30),
            jpeg_file("c.jpg", 53, 30),
        ])
        .unwrap();
    assert!(session.move_image(0, 2));
    assert_eq!(
        session
            .images()
            .entries()
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>(),
        vec!["b.jpg", "c.jpg", "a.jpg"]
    );

    assert_eq!(session.convert().await, ConversionStatus::Success);
    assert_eq!(session.results().len(), 1);

    let result = &session.results()[0];
    assert_eq!(result.name, ASSEMBLED_PDF_NAME);
    assert_eq!(result.payload.mime(), "application/pdf");
    assert!(result.payload.bytes().starts_with(b"%PDF"));
    assert_eq!(page_count(result.payload.bytes()), 3);
    assert_eq!(
        drawn_image_widths(result.payload.bytes()),
        vec![37, 53, 21],
        "page order must follow the reordered selection"
    );
}

#[tokio::test]
async fn oversized_selection_truncates_before_assembly() {
    let mut session = ConverterSession::new(ConversionConfig::default());
    session.set_mode(ConversionMode::JpegToPdf);

    let batch: Vec<InputFile> = (1..=35)
        .map(|i| jpeg_file(&format!("{i}.jpg"), 4, 4))
        .collect();
    let notice = session.select_files(batch).unwrap();
    assert_eq!(
        notice,
        Some(repage::SelectionNotice::Truncated {
            offered: 35,
            kept: 30
        })
    );
    assert_eq!(session.images().len(), 30);

    session.convert().await;
    assert_eq!(session.status(), ConversionStatus::Success);
    assert_eq!(page_count(session.results()[0].payload.bytes()), 30);
}

// ── Downloads and lifecycle ──────────────────────────────────────────────────

#[tokio::test]
async fn bundling_failure_drops_results_and_reports() {
    let config = stubbed(2)
        .archiver(Arc::new(FailingArchiver))
        .build()
        .unwrap();
    let mut session = ConverterSession::new(config);

    session.select_files(vec![pdf_file("scan.pdf")]).unwrap();
    assert_eq!(session.convert().await, ConversionStatus::Success);
    assert_eq!(session.results().len(), 2);

    assert!(session.download_all().await.is_none());
    assert_eq!(session.status(), ConversionStatus::Error);
    assert!(session.results().is_empty());
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn reselecting_discards_previous_results() {
    let config = stubbed(2).build().unwrap();
    let mut session = ConverterSession::new(config);

    session.select_files(vec![pdf_file("first.pdf")]).unwrap();
    session.convert().await;
    assert_eq!(session.status(), ConversionStatus::Success);

    session.select_files(vec![pdf_file("second.pdf")]).unwrap();
    assert_eq!(session.status(), ConversionStatus::Idle);
    assert!(session.results().is_empty());
}

#[tokio::test]
async fn preview_handles_are_accounted_for_exactly_once() {
    let config = stubbed(3).build().unwrap();
    let registry = config.handle_registry.clone();
    let mut session = ConverterSession::new(config);

    session.select_files(vec![pdf_file("scan.pdf")]).unwrap();
    session.convert().await;
    assert_eq!(registry.live(), 3);

    {
        let artifact = session.download_all().await.expect("zip artifact");
        assert_eq!(artifact.kind, DownloadKind::ZipArchive);
        assert_eq!(registry.live(), 4);
    }
    // The artifact went out of scope; only the session's results remain.
    assert_eq!(registry.live(), 3);

    session.reset();
    assert_eq!(registry.live(), 0);
    assert_eq!(session.status(), ConversionStatus::Idle);
}
