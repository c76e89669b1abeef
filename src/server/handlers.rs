//! HTTP handlers for the upload form, results and saved uploads.

use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use super::template_structs::{ErrorTemplate, IndexTemplate};
use super::AppState;
use crate::pipeline::PipelineError;

/// Multipart field names accepted for the uploaded image.
const IMAGE_FIELDS: &[&str] = &["image", "file"];

/// An image pulled out of a multipart request.
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read the first non-empty image field from a multipart body.
pub async fn read_image_field(
    multipart: &mut Multipart,
) -> Result<Option<UploadedImage>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if !IMAGE_FIELDS.contains(&name.as_str()) {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let bytes = field.bytes().await?;
        // Browsers send an empty part when no file was chosen.
        if bytes.is_empty() {
            continue;
        }
        return Ok(Some(UploadedImage {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

fn render_page(template: &IndexTemplate<'_>) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| e.to_string()))
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let template = ErrorTemplate {
        title: "Error",
        message,
    };
    (
        status,
        Html(template.render().unwrap_or_else(|_| message.to_string())),
    )
        .into_response()
}

/// Upload form.
pub async fn index() -> impl IntoResponse {
    render_page(&IndexTemplate::form())
}

/// Accept an image upload, run the pipeline and render the results.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let upload = match read_image_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return render_page(&IndexTemplate::with_message("No image uploaded")).into_response()
        }
        Err(e) => return error_page(StatusCode::BAD_REQUEST, &e.body_text()),
    };

    let saved_as = match state.uploads.save(&upload.filename, &upload.bytes).await {
        Ok(name) => name,
        Err(e) => {
            error!("failed to save upload: {}", e);
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save upload");
        }
    };

    match state.pipeline.process(upload.bytes).await {
        Ok(outcome) => {
            render_page(&IndexTemplate::with_outcome(&outcome, Some(&saved_as))).into_response()
        }
        Err(PipelineError::EmptyUpload) => {
            render_page(&IndexTemplate::with_message("No image uploaded")).into_response()
        }
        Err(e) => {
            error!("processing {} failed: {}", saved_as, e);
            error_page(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Serve a previously saved upload by its generated filename.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let path = match state.uploads.resolve(&filename) {
        Ok(p) => p,
        Err(_) => return (StatusCode::NOT_FOUND, "File not found").into_response(),
    };

    let content = match tokio::fs::read(&path).await {
        Ok(c) => c,
        Err(e) => {
            warn!("failed to read upload {}: {}", filename, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response();
        }
    };

    let mime = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    ([(header::CONTENT_TYPE, mime)], content).into_response()
}

/// JSON variant of the upload endpoint.
pub async fn api_extract(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let upload = match read_image_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "No image uploaded"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": e.body_text()})),
            )
                .into_response()
        }
    };

    match state.pipeline.process(upload.bytes).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(PipelineError::EmptyUpload) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No image uploaded"})),
        )
            .into_response(),
        Err(e) => {
            error!("processing {} failed: {}", upload.filename, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}
