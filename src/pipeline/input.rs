//! Input files: named byte buffers plus the type gates in front of both
//! conversion directions.
//!
//! ## Why magic bytes instead of extensions?
//!
//! Selection is the last moment a bad file can be rejected cheaply. A
//! mislabelled `.jpg` that is really a PNG would otherwise fail halfway
//! through a conversion and take the whole run down with it (conversions
//! are all-or-nothing). So both gates look at the leading bytes — `%PDF`
//! for documents, the `FF D8 FF` SOI marker for images — and the file name
//! is only used for output naming.

use crate::error::RepageError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Leading bytes of every PDF document.
pub const PDF_MAGIC: [u8; 4] = *b"%PDF";
/// JPEG start-of-image marker plus the first marker byte.
pub const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// A selected input: the user-visible name and the raw bytes.
///
/// Immutable once constructed. Bytes are shared (`Arc`) because the same
/// buffer travels into preview handles and blocking engine tasks.
#[derive(Clone)]
pub struct InputFile {
    name: String,
    bytes: Arc<Vec<u8>>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(bytes.into()),
        }
    }

    /// Reads a file from disk, mapping the usual io failures.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, RepageError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RepageError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => RepageError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => RepageError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        debug!(name = %name, bytes = bytes.len(), "Read input file");

        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap shared reference for handing the buffer to blocking tasks.
    pub fn shared_bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The name minus its final extension; used for output naming.
    ///
    /// `report.v2.pdf` → `report.v2`. A name with no extension (or nothing
    /// but an extension, like `.hidden`) is returned unchanged.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }

    /// Gate for the PDF-to-JPEG direction.
    pub fn validate_pdf(&self) -> Result<(), RepageError> {
        if is_pdf(&self.bytes) {
            Ok(())
        } else {
            Err(RepageError::NotAPdf {
                name: self.name.clone(),
                magic: leading_magic(&self.bytes),
            })
        }
    }

    /// Gate for the JPEG-to-PDF direction.
    pub fn validate_jpeg(&self) -> Result<(), RepageError> {
        if is_jpeg(&self.bytes) {
            Ok(())
        } else {
            Err(RepageError::NotAJpeg {
                name: self.name.clone(),
                magic: leading_magic(&self.bytes),
            })
        }
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// True when the buffer starts with the PDF magic bytes.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(&PDF_MAGIC)
}

/// True when the buffer starts with the JPEG SOI marker.
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_MAGIC)
}

fn leading_magic(bytes: &[u8]) -> [u8; 4] {
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    magic
}
