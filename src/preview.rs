//! Display-handle lifecycle for selected and converted files.
//!
//! The UI-facing layers hold byte blobs that a display surface may want to
//! show (image thumbnails, the finished PDF). Each blob is wrapped in a
//! [`PreviewHandle`]: an RAII guard that registers itself in a shared
//! [`HandleRegistry`] on creation and releases its slot exactly once, in
//! `Drop`, on every exit path. Tests assert `registry.live() == 0` after
//! `reset()` to prove nothing leaks.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use base64::Engine;

/// MIME type attached to JPEG preview handles.
pub const MIME_JPEG: &str = "image/jpeg";
/// MIME type attached to assembled-PDF handles.
pub const MIME_PDF: &str = "application/pdf";
/// MIME type attached to download-archive handles.
pub const MIME_ZIP: &str = "application/zip";

/// Shared counter of live preview handles.
///
/// Cloning a registry clones the *handle to the counter*, not the count:
/// a session, its pipeline outputs, and a test all observe the same number.
#[derive(Clone, Default)]
pub struct HandleRegistry {
    live: Arc<AtomicUsize>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles currently alive.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn register(&self) {
        self.live.fetch_add(1, Ordering::SeqCst);
    }

    // Never underflows: every handle registers exactly once in
    // `PreviewHandle::new` or `Clone`, and releases exactly once in `Drop`.
    fn release(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("live", &self.live())
            .finish()
    }
}

/// A displayable byte blob, released exactly once when dropped.
///
/// ```
/// use std::sync::Arc;
/// use repage::preview::{HandleRegistry, PreviewHandle, MIME_JPEG};
///
/// let registry = HandleRegistry::new();
/// {
///     let handle = PreviewHandle::new(Arc::new(vec![0xFF, 0xD8, 0xFF]), MIME_JPEG, &registry);
///     assert_eq!(registry.live(), 1);
///     assert!(handle.data_uri().starts_with("data:image/jpeg;base64,"));
/// }
/// assert_eq!(registry.live(), 0);
/// ```
pub struct PreviewHandle {
    bytes: Arc<Vec<u8>>,
    mime: &'static str,
    registry: HandleRegistry,
}

impl PreviewHandle {
    /// Wraps `bytes` and registers one live slot in `registry`.
    pub fn new(bytes: Arc<Vec<u8>>, mime: &'static str, registry: &HandleRegistry) -> Self {
        registry.register();
        Self {
            bytes,
            mime,
            registry: registry.clone(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap shared reference to the underlying blob.
    pub fn shared_bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Base64 data URI for display surfaces that cannot take raw bytes.
    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.bytes.as_slice());
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

impl Clone for PreviewHandle {
    /// A clone is its own live slot: the pair still releases exactly twice.
    fn clone(&self) -> Self {
        self.registry.register();
        Self {
            bytes: Arc::clone(&self.bytes),
            mime: self.mime,
            registry: self.registry.clone(),
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release();
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}
