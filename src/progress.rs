//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline processes each page. In the assembly
//! direction each selected image becomes one output page, so the same
//! vocabulary covers both directions.
//!
//! # Why callbacks instead of channels?
//!
//! A callback trait is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a status enum behind a mutex,
//! or a frontend channel without the library knowing how the host
//! application communicates. The trait is `Send + Sync` because the callback
//! is shared across `spawn_blocking` boundaries.
//!
//! # Example
//!
//! ```rust
//! use repage::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, output_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} bytes)", page_num, total_pages, output_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is strictly sequential: events for
/// page N+1 never arrive before page N has completed or failed, and a
/// failure ends the event stream (conversions are all-or-nothing, so
/// [`on_conversion_complete`](Self::on_conversion_complete) is only called
/// on success).
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any page is processed.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be produced
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is rendered (extraction) or an image is
    /// decoded and placed (assembly).
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the run
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been fully processed.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `output_len`  — byte length of the page's output (JPEG size for
    ///   extraction; decoded pixel-buffer size for assembly)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, output_len: usize) {
        let _ = (page_num, total_pages, output_len);
    }

    /// Called when a page fails. The conversion aborts after this event.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `error`       — human-readable error description
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the whole run has succeeded.
    ///
    /// # Arguments
    /// * `total_pages`  — pages produced
    /// * `output_bytes` — total size of all produced files
    fn on_conversion_complete(&self, total_pages: usize, output_bytes: u64) {
        let _ = (total_pages, output_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every event as a compact string so tests can assert on the
    /// exact sequence, not just the counts.
    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<String>>,
    }

    impl EventLog {
        fn drain(&self) -> Vec<String> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl ConversionProgressCallback for EventLog {
        fn on_conversion_start(&self, total_pages: usize) {
            self.events.lock().unwrap().push(format!("start/{total_pages}"));
        }

        fn on_page_start(&self, page_num: usize, total_pages: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page-start/{page_num}/{total_pages}"));
        }

        fn on_page_complete(&self, page_num: usize, _total_pages: usize, output_len: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page-done/{page_num}/{output_len}"));
        }

        fn on_page_error(&self, page_num: usize, _total_pages: usize, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page-error/{page_num}/{error}"));
        }

        fn on_conversion_complete(&self, total_pages: usize, output_bytes: u64) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done/{total_pages}/{output_bytes}"));
        }
    }

    #[test]
    fn default_methods_are_no_ops() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 42);
        cb.on_page_error(2, 5, "truncated scan data");
        cb.on_conversion_complete(5, 4096);
    }

    #[test]
    fn overridden_methods_see_the_full_sequence() {
        let log = EventLog::default();

        log.on_conversion_start(2);
        log.on_page_start(1, 2);
        log.on_page_complete(1, 2, 100);
        log.on_page_start(2, 2);
        log.on_page_complete(2, 2, 200);
        log.on_conversion_complete(2, 300);

        assert_eq!(
            log.drain(),
            vec![
                "start/2",
                "page-start/1/2",
                "page-done/1/100",
                "page-start/2/2",
                "page-done/2/200",
                "done/2/300",
            ]
        );
    }

    #[test]
    fn shared_arc_handle_dispatches_through_the_trait() {
        let log = Arc::new(EventLog::default());
        let cb: ProgressCallback = log.clone();
        cb.on_page_error(3, 7, "bad scanline");
        assert_eq!(log.drain(), vec!["page-error/3/bad scanline"]);
    }
}
