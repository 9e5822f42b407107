//! Request handlers for the web adapter.
//!
//! Handlers only translate: pull a file or URL out of the multipart body,
//! call the [`crate::Processor`], and turn the result into JSON or HTML.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::Path;

use super::templates::{self, HomeOutcome};
use super::upload::save_upload;
use super::AppState;
use crate::config::CollisionPolicy;
use crate::error::Scan2PdfError;
use crate::options::{
    OptionOverrides, OptionValue, DESKEW, PROGRESS_INDICATOR, REMOVE_BACKGROUND, ROTATE_PAGES,
};

/// Checkbox-style option fields the upload form may send.
const FORM_CHECKBOXES: &[&str] = &[DESKEW, ROTATE_PAGES, REMOVE_BACKGROUND];

/// Hidden field marking that the option checkboxes were rendered, so an
/// absent checkbox means "off" rather than "use the default".
const OPTIONS_PRESENT_FIELD: &str = "options_present";

/// Successful `/process/` reply.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub message: &'static str,
    pub output_path: String,
}

/// Failed `/process/` reply.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check reply.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Every workflow error, rendered as `{"error": "..."}`.
///
/// Missing input answers `400`; everything else answers `500`.
#[derive(Debug)]
pub struct ApiError(pub Scan2PdfError);

impl From<Scan2PdfError> for ApiError {
    fn from(e: Scan2PdfError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::error!("Request failed ({}): {}", status, self.0);
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// The fields of an upload form after the multipart body has been read.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    url: Option<String>,
    overrides: OptionOverrides,
}

async fn read_upload_form(
    multipart: &mut Multipart,
    file_field: &str,
) -> Result<UploadForm, Scan2PdfError> {
    let mut form = UploadForm::default();
    let mut options_present = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Scan2PdfError::Validation(format!("Failed to read upload: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        tracing::debug!("Received field: name='{}', filename={:?}", name, field.file_name());

        if name == file_field {
            // Browsers send an empty part with no filename when nothing was picked.
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| Scan2PdfError::Validation(format!("Failed to read file data: {e}")))?;
            if !filename.is_empty() {
                form.file = Some((filename, data.to_vec()));
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| Scan2PdfError::Validation(format!("Failed to read field '{name}': {e}")))?;

        match name.as_str() {
            "url" => {
                let url = text.trim();
                if !url.is_empty() {
                    form.url = Some(url.to_string());
                }
            }
            OPTIONS_PRESENT_FIELD => options_present = true,
            key if FORM_CHECKBOXES.contains(&key) || key == PROGRESS_INDICATOR => {
                form.overrides
                    .insert(key.to_string(), OptionValue::parse(&text));
            }
            _ => {}
        }
    }

    if options_present {
        for key in FORM_CHECKBOXES {
            form.overrides
                .entry(key.to_string())
                .or_insert(OptionValue::Bool(false));
        }
    }

    Ok(form)
}

/// `GET /`: upload form.
pub async fn index() -> Html<&'static str> {
    Html(templates::INDEX_HTML)
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /process/`: OCR an uploaded file or a URL, answer with JSON.
pub async fn process_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let form = read_upload_form(&mut multipart, "file").await?;

    let output = if let Some((filename, data)) = form.file {
        let input = save_upload(
            &state.upload_dir,
            &filename,
            &data,
            CollisionPolicy::Overwrite,
        )
        .await?;
        tracing::info!("Upload stored at {}", input.display());
        state.processor.dispatch(&input, None, &form.overrides).await?
    } else if let Some(url) = form.url {
        state
            .processor
            .process_from_url(&url, None, &form.overrides)
            .await?
    } else {
        return Err(Scan2PdfError::Validation("No file or URL provided".into()).into());
    };

    Ok(Json(ProcessResponse {
        success: true,
        message: "OCR completed successfully!",
        output_path: output.display().to_string(),
    }))
}

/// Any method other than `POST` on `/process/`.
pub async fn method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Invalid request method".to_string(),
        }),
    )
}

/// `GET /home`: legacy PDF form.
pub async fn home_form() -> Html<String> {
    Html(templates::render_home(None))
}

/// `POST /home`: legacy PDF upload. Stores the upload in the media root,
/// writes `OCR_<name>` beside it, and re-renders the form with the outcome.
pub async fn home_upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match read_upload_form(&mut multipart, "pdf_file").await {
        Ok(form) => form,
        Err(e) => return render_outcome(HomeOutcome::Error(e.to_string())),
    };

    let Some((filename, data)) = form.file else {
        return Html(templates::render_home(None)).into_response();
    };

    match legacy_ocr(&state, &filename, &data).await {
        Ok(output_name) => render_outcome(HomeOutcome::Success {
            output_url: format!("/media/{output_name}"),
        }),
        Err(e) => {
            tracing::error!("Legacy OCR failed: {}", e);
            render_outcome(HomeOutcome::Error(e.to_string()))
        }
    }
}

async fn legacy_ocr(state: &AppState, filename: &str, data: &[u8]) -> Result<String, Scan2PdfError> {
    let input = save_upload(&state.media_root, filename, data, CollisionPolicy::Version).await?;
    let stored_name = file_name_of(&input);
    let output_name = format!("OCR_{stored_name}");
    let output = state.media_root.join(&output_name);

    state
        .processor
        .dispatch(&input, Some(output.as_path()), &legacy_overrides())
        .await?;
    Ok(output_name)
}

/// The legacy form only ever asked for deskewing; page rotation stays off.
fn legacy_overrides() -> OptionOverrides {
    OptionOverrides::from([(ROTATE_PAGES.to_string(), OptionValue::Bool(false))])
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn render_outcome(outcome: HomeOutcome) -> Response {
    Html(templates::render_home(Some(&outcome))).into_response()
}
