//! Progress-callback trait for workflow events.
//!
//! Inject an [`Arc<dyn WorkflowProgressCallback>`] via
//! [`crate::config::ProcessorConfigBuilder::progress_callback`] to be told
//! when a download or an OCR run starts and finishes.
//!
//! # Example
//!
//! ```rust
//! use scan2pdf::{ProcessorConfig, WorkflowProgressCallback};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl WorkflowProgressCallback for Printer {
//!     fn on_ocr_complete(&self, output: &Path) {
//!         eprintln!("wrote {}", output.display());
//!     }
//! }
//!
//! let config = ProcessorConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn WorkflowProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::classify::FileKind;
use std::path::Path;
use std::sync::Arc;

/// Called by the workflow as it moves through download and OCR.
///
/// Implementations must be `Send + Sync`: the web adapter shares one
/// processor between concurrent requests. All methods default to no-ops.
pub trait WorkflowProgressCallback: Send + Sync {
    /// Called before a remote fetch is sent.
    fn on_download_start(&self, url: &str) {
        let _ = url;
    }

    /// Called after a remote file has been written to disk.
    ///
    /// # Arguments
    /// * `path` : where the file landed
    /// * `bytes`: size of the downloaded body
    fn on_download_complete(&self, path: &Path, bytes: u64) {
        let _ = (path, bytes);
    }

    /// Called when a remote fetch fails. Nothing else follows for that request.
    fn on_download_error(&self, url: &str, error: &str) {
        let _ = (url, error);
    }

    /// Called just before the OCR engine is invoked.
    fn on_ocr_start(&self, input: &Path, kind: FileKind) {
        let _ = (input, kind);
    }

    /// Called when the engine has produced `output`.
    fn on_ocr_complete(&self, output: &Path) {
        let _ = output;
    }

    /// Called when the OCR step fails, whether the file was rejected before
    /// the engine ran or the engine itself reported the failure.
    fn on_ocr_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl WorkflowProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessorConfig`].
pub type ProgressCallback = Arc<dyn WorkflowProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCallback {
        downloads: AtomicUsize,
        ocr_runs: AtomicUsize,
        errors: AtomicUsize,
    }

    impl WorkflowProgressCallback for CountingCallback {
        fn on_download_complete(&self, _path: &Path, _bytes: u64) {
            self.downloads.fetch_add(1, Ordering::SeqCst);
        }

        fn on_ocr_complete(&self, _output: &Path) {
            self.ocr_runs.fetch_add(1, Ordering::SeqCst);
        }

        fn on_ocr_error(&self, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_download_start("https://example.com/a.pdf");
        cb.on_download_complete(Path::new("output/a.pdf"), 42);
        cb.on_download_error("https://example.com/b.pdf", "HTTP 404 Not Found");
        cb.on_ocr_start(Path::new("output/a.pdf"), FileKind::Pdf);
        cb.on_ocr_complete(Path::new("output/a_OCR.pdf"));
        cb.on_ocr_error("boom");
    }

    #[test]
    fn arc_dyn_callback_receives_events() {
        let counter = Arc::new(CountingCallback::default());
        let cb: ProgressCallback = counter.clone();

        cb.on_download_complete(Path::new("a.pdf"), 10);
        cb.on_ocr_complete(Path::new("a_OCR.pdf"));
        cb.on_ocr_complete(Path::new("b_OCR.pdf"));
        cb.on_ocr_error("engine failed");

        assert_eq!(counter.downloads.load(Ordering::SeqCst), 1);
        assert_eq!(counter.ocr_runs.load(Ordering::SeqCst), 2);
        assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
    }
}
