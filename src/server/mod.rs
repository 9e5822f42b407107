//! Web adapter: an upload/URL form in front of the [`Processor`].
//!
//! Two endpoints do nearly the same thing:
//! - `POST /process/` takes a `file` upload or a `url` field and answers JSON
//! - `POST /home` takes a `pdf_file` upload and answers an HTML page linking
//!   to `/media/OCR_<name>`
//!
//! Each request runs the workflow inline. The engine call sits on tokio's
//! blocking pool, so concurrent requests are bounded by that pool and by
//! nothing else; two requests producing the same output name race.

mod handlers;
mod routes;
mod templates;
pub mod upload;

pub use handlers::{ApiError, ErrorResponse, HealthResponse, ProcessResponse};
pub use routes::create_router;
pub use templates::{render_home, HomeOutcome};

use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

use crate::process::Processor;

/// Listener and storage layout for the web adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind. Default: `127.0.0.1`.
    pub host: String,
    /// Port to bind. Default: 8000.
    pub port: u16,
    /// Root of uploads and outputs. Default: `media`.
    pub media_root: PathBuf,
    /// Largest accepted request body. Default: 50 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            media_root: PathBuf::from("media"),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `<media_root>/uploads`
    pub fn upload_dir(&self) -> PathBuf {
        self.media_root.join("uploads")
    }

    /// `<media_root>/output`: where `/process/` results land.
    pub fn output_dir(&self) -> PathBuf {
        self.media_root.join("output")
    }
}

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<Processor>,
    pub media_root: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(processor: Processor, config: &ServerConfig) -> Self {
        Self {
            processor: Arc::new(processor),
            media_root: config.media_root.clone(),
            upload_dir: config.upload_dir(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Start the web server and run until Ctrl-C.
pub async fn serve(config: &ServerConfig, processor: Processor) -> std::io::Result<()> {
    std::fs::create_dir_all(config.upload_dir())?;
    let state = AppState::new(processor, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessorConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn setup_test_app() -> (axum::Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let server = ServerConfig {
            media_root: dir.path().join("media"),
            ..ServerConfig::default()
        };
        let processor = Processor::new(
            ProcessorConfig::builder()
                .output_dir(server.output_dir())
                .build()
                .unwrap(),
        )
        .unwrap();
        (create_router(AppState::new(processor, &server)), dir)
    }

    #[test]
    fn default_layout() {
        let c = ServerConfig::default();
        assert_eq!(c.upload_dir(), PathBuf::from("media/uploads"));
        assert_eq!(c.output_dir(), PathBuf::from("media/output"));
        assert_eq!(c.port, 8000);
    }

    #[tokio::test]
    async fn test_index_page() {
        let (app, _dir) = setup_test_app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("ocr-form"));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = setup_test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_process_rejects_get() {
        let (app, _dir) = setup_test_app();
        let response = app
            .oneshot(Request::builder().uri("/process/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Invalid request method");
    }

    #[tokio::test]
    async fn test_media_serves_files() {
        let (app, dir) = setup_test_app();
        std::fs::create_dir_all(dir.path().join("media")).unwrap();
        std::fs::write(dir.path().join("media/OCR_doc.pdf"), b"%PDF-1.7").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/media/OCR_doc.pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"%PDF-1.7");
    }
}
