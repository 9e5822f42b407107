//! Error types for the scan2pdf library.
//!
//! * [`Scan2PdfError`]: every failure of the ingestion and dispatch
//!   workflow. There is no partial success: a request either yields an
//!   output path or exactly one of these.
//!
//! * [`EngineError`]: failures reported by the external OCR engine. Wrapped
//!   verbatim in [`Scan2PdfError::Engine`] and never classified further.

use crate::pipeline::classify::FileKind;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scan2pdf library.
#[derive(Debug, Error)]
pub enum Scan2PdfError {
    // ── Retrieval errors ──────────────────────────────────────────────────
    /// Remote fetch failed: timeout, connection error, or non-success status.
    #[error("Failed to download '{url}': {reason}")]
    Retrieval { url: String, reason: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// The file extension is neither a supported image nor `.pdf`.
    #[error("Unsupported file format: '{path}'\nSupported: .jpg .jpeg .png .bmp .tiff .tif .pdf")]
    UnsupportedFormat { path: PathBuf },

    /// A typed entry point (`process_image` / `process_pdf`) got the other kind.
    #[error("File is not {kind}: '{path}'", kind = .expected.describe())]
    KindMismatch { path: PathBuf, expected: FileKind },

    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Caller supplied neither a file nor a URL.
    #[error("{0}")]
    Validation(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Destination already exists and the collision policy is `Fail`.
    #[error("Output file already exists: '{path}'")]
    OutputExists { path: PathBuf },

    /// Could not create the output directory or write a file into it.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The OCR engine reported a failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Scan2PdfError {
    /// True when the error was raised by the caller's input rather than by
    /// the workflow (web adapters answer these with `400`).
    pub fn is_validation(&self) -> bool {
        matches!(self, Scan2PdfError::Validation(_))
    }
}

/// Failures surfaced by an [`crate::pipeline::engine::OcrEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be spawned.
    #[error("OCR engine '{binary}' not found.\nInstall it (apt install ocrmypdf / brew install ocrmypdf) or set OCRMYPDF_BIN.")]
    NotInstalled { binary: String },

    /// The engine ran and exited unsuccessfully.
    #[error("OCR engine failed (exit code {code}): {stderr}")]
    Failed { code: i32, stderr: String },

    /// The engine reported success but left no file at the output path.
    #[error("OCR engine produced no output at '{path}'")]
    MissingOutput { path: PathBuf },

    /// Any other failure raised from inside an engine implementation.
    #[error("OCR engine error: {0}")]
    Other(String),

    #[error("I/O error while running OCR engine: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_display() {
        let e = Scan2PdfError::Retrieval {
            url: "https://example.com/a.pdf".into(),
            reason: "HTTP 404 Not Found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("example.com/a.pdf"), "got: {msg}");
        assert!(msg.contains("404"), "got: {msg}");
    }

    #[test]
    fn engine_error_is_transparent() {
        let e: Scan2PdfError = EngineError::Failed {
            code: 2,
            stderr: "input file is not a valid PDF".into(),
        }
        .into();
        assert_eq!(
            e.to_string(),
            "OCR engine failed (exit code 2): input file is not a valid PDF"
        );
    }

    #[test]
    fn kind_mismatch_names_expected_kind() {
        let e = Scan2PdfError::KindMismatch {
            path: "doc.pdf".into(),
            expected: FileKind::Image,
        };
        assert!(e.to_string().contains("an image"));
    }

    #[test]
    fn only_validation_is_validation() {
        assert!(Scan2PdfError::Validation("No file or URL provided".into()).is_validation());
        assert!(!Scan2PdfError::UnsupportedFormat {
            path: "notes.txt".into()
        }
        .is_validation());
    }
}
