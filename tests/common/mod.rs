//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Router};
use scan2pdf::{EngineError, OcrEngine, OcrOptions};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n%fake scanned page\n";
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// One recorded engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCall {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: OcrOptions,
}

/// Engine double: records every call and writes a stub PDF, or fails.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    failure: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(stderr.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl OcrEngine for RecordingEngine {
    fn ocr(&self, input: &Path, output: &Path, options: &OcrOptions) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(EngineCall {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            options: options.clone(),
        });
        if let Some(ref stderr) = self.failure {
            return Err(EngineError::Failed {
                code: 2,
                stderr: stderr.clone(),
            });
        }
        std::fs::write(output, FAKE_PDF)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Serve a few fixed files on `127.0.0.1:<random>`.
///
/// - `/files/doc.pdf`  → 200, [`FAKE_PDF`]
/// - `/files/scan.png` → 200, [`FAKE_PNG`]
/// - `/files/notes.txt` → 200, plain text
/// - `/files/slow.pdf` → 200 after 5 seconds
/// - `/files/gone.pdf` → 410
/// - anything else     → 404
pub async fn spawn_file_server() -> SocketAddr {
    let app = Router::new()
        .route("/files/doc.pdf", get(|| async { FAKE_PDF }))
        .route("/files/scan.png", get(|| async { FAKE_PNG }))
        .route("/files/notes.txt", get(|| async { "just text" }))
        .route(
            "/files/slow.pdf",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                FAKE_PDF
            }),
        )
        .route("/files/gone.pdf", get(|| async { StatusCode::GONE }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
