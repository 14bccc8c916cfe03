use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::debug;

use parley_blob::BlobError;
use parley_core::Attachment;

use super::AppState;
use super::schemas::ErrorResponse;

fn error_body(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(serde_json::json!(ErrorResponse {
            error: message.into()
        })),
    )
}

/// `POST /v1/upload` -- upload a file attachment via multipart form data.
///
/// Expects a single `file` part with a filename and content type. The
/// accepted types and the 10 MB cap are enforced by the blob store
/// before anything is written. On success returns the attachment
/// descriptor to embed in a subsequent message submission.
#[utoipa::path(
    post,
    path = "/v1/upload",
    tag = "Upload",
    summary = "Upload attachment",
    description = "Uploads a file and returns the attachment descriptor for use in a message.",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = Attachment),
        (status = 400, description = "Missing file part", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 413, description = "File exceeds the size cap", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_body(StatusCode::BAD_REQUEST, format!("malformed multipart body: {e}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("file").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let data = field.bytes().await.map_err(|e| {
            error_body(
                StatusCode::BAD_REQUEST,
                format!("failed to read file part: {e}"),
            )
        })?;

        debug!(filename = %filename, content_type = %content_type, size = data.len(), "upload received");

        let meta = state
            .blob
            .put(&filename, &content_type, data)
            .await
            .map_err(|e| {
                let status = match &e {
                    BlobError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    BlobError::InvalidContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    BlobError::NotFound(_) | BlobError::Storage(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                error_body(status, e.to_string())
            })?;

        let attachment = Attachment {
            url: meta.url,
            name: meta.filename,
            content_type: meta.content_type,
            size_bytes: meta.size_bytes,
        };
        return Ok((StatusCode::CREATED, Json(attachment)));
    }

    Err(error_body(
        StatusCode::BAD_REQUEST,
        "multipart body must contain a `file` part",
    ))
}
