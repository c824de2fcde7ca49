//! Conversion outputs: named byte blobs, run statistics, document info,
//! and the download artifact surface.

use crate::preview::PreviewHandle;
use serde::Serialize;

/// One converted output file.
///
/// The payload travels inside a [`PreviewHandle`] so display surfaces can
/// show it and the registry can account for it; the blob is released when
/// the last handle drops.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub name: String,
    pub payload: PreviewHandle,
}

impl ConvertedFile {
    pub fn size_bytes(&self) -> u64 {
        self.payload.len() as u64
    }
}

/// Everything a finished conversion run produced.
#[derive(Debug)]
pub struct ConversionOutput {
    /// Output files in emission order (page order for extraction, sequence
    /// order for assembly).
    pub files: Vec<ConvertedFile>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Flat per-file summaries for machine-readable reporting.
    pub fn file_summaries(&self) -> Vec<FileSummary> {
        self.files
            .iter()
            .map(|f| FileSummary {
                name: f.name.clone(),
                size_bytes: f.size_bytes(),
            })
            .collect()
    }
}

/// Aggregate statistics for one conversion run.
///
/// `engine_ms` is time spent inside the third-party engine (pdfium render
/// or PDF composition); `codec_ms` is JPEG encode/decode time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub input_files: usize,
    pub pages: usize,
    pub output_files: usize,
    pub output_bytes: u64,
    pub engine_ms: u64,
    pub codec_ms: u64,
    pub total_ms: u64,
}

/// One output file, summarised for `--json` style consumers.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size_bytes: u64,
}

/// Page inventory reported by `inspect`, with nothing rendered.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    /// Natural page sizes in document order.
    pub pages: Vec<PageDims>,
}

/// Natural size of one page in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageDims {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// What `download_all` hands to the caller: either the lone result file or
/// a zip bundling all of them. Never both.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub file: ConvertedFile,
    pub kind: DownloadKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadKind {
    /// A single converted file under its own name.
    SingleFile,
    /// Multiple results bundled into one archive.
    ZipArchive,
}
