//! zip-backed archive bundling.
//!
//! The archive is materialised whole in memory: downloads are bounded by
//! the 30-image selection cap, so streaming would buy nothing. Deflate is
//! used even though JPEG payloads barely compress, because consumers expect
//! a standard `.zip` they can open anywhere.

use super::{ArchiveEntry, Archiver};
use crate::error::RepageError;
use async_trait::async_trait;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::{write::SimpleFileOptions, ZipWriter};

/// Production [`Archiver`] over the zip crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    fn name(&self) -> &'static str {
        "zip"
    }

    async fn bundle(&self, entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, RepageError> {
        tokio::task::spawn_blocking(move || bundle_blocking(entries))
            .await
            .map_err(|e| RepageError::Internal(format!("Archive task panicked: {}", e)))?
    }
}

/// Blocking implementation of archive bundling.
fn bundle_blocking(entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, RepageError> {
    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let mut zip = ZipWriter::new(cursor);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in &entries {
            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| RepageError::ArchiveFailed {
                    detail: format!("'{}': {}", entry.name, e),
                })?;
            zip.write_all(&entry.bytes)
                .map_err(|e| RepageError::ArchiveFailed {
                    detail: format!("'{}': {}", entry.name, e),
                })?;
        }

        zip.finish().map_err(|e| RepageError::ArchiveFailed {
            detail: e.to_string(),
        })?;
    }

    debug!(
        entries = entries.len(),
        bytes = buffer.len(),
        "Archive built"
    );
    Ok(buffer)
}
