// handlers/protected/upload.rs - Multipart uploads

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::database::models::Attachment;
use crate::error::ApiResult;
use crate::handlers::AppJson;
use crate::services::{UploadError, UploadService};

fn request_host(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST).and_then(|v| v.to_str().ok())
}

/// Bodies over `DefaultBodyLimit` become 413; anything else malformed is 400.
fn stream_error(uploads: &UploadService, err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge(uploads.max_upload_bytes())
    } else {
        UploadError::Multipart(err.body_text())
    }
}

/// POST /upload - Store the multipart field `file`, respond with its URL as text/plain
///
/// Empty files are accepted. 400 when no `file` field is present, 413 over the body limit.
pub async fn single_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<String> {
    let uploads = &state.uploads;
    let mut multipart = multipart.map_err(|e| UploadError::Multipart(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(|e| stream_error(uploads, e))? {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| stream_error(uploads, e))?;

        let stored = uploads.store(original.as_deref(), &bytes).await?;
        return Ok(uploads.public_url(&stored, request_host(&headers))?);
    }

    Err(UploadError::MissingFile("file").into())
}

/// POST /upload/multiple - Store every non-empty `files` field
///
/// Expected Output:
/// ```json
/// [{ "url": "http://host/uploads/<uuid>.pdf", "filename": "notes.pdf" }]
/// ```
///
/// A request with no files, or one that is not multipart at all, yields `[]`.
/// A body that breaks off or exceeds the limit fails as a whole (400 / 413)
/// and the files already written for it are removed.
pub async fn multiple_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<AppJson<Vec<Attachment>>> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            debug!("Multi-upload without multipart body: {}", e.body_text());
            return Ok(AppJson(Vec::new()));
        }
    };

    let mut stored = Vec::new();
    match store_files(&state, &headers, &mut multipart, &mut stored).await {
        Ok(uploaded) => Ok(AppJson(uploaded)),
        Err(e) => {
            warn!("Multi-upload failed after {} file(s): {}", stored.len(), e);
            state.uploads.discard(&stored).await;
            Err(e.into())
        }
    }
}

/// Stored names are pushed to `stored` as they are written so the caller can roll back.
async fn store_files(
    state: &AppState,
    headers: &HeaderMap,
    multipart: &mut Multipart,
    stored: &mut Vec<String>,
) -> Result<Vec<Attachment>, UploadError> {
    let uploads = &state.uploads;
    let mut uploaded = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| stream_error(uploads, e))? {
        if field.name() != Some("files") {
            continue;
        }
        let original = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| stream_error(uploads, e))?;
        if bytes.is_empty() {
            debug!("Skipping empty upload {:?}", original);
            continue;
        }

        let name = uploads.store(original.as_deref(), &bytes).await?;
        stored.push(name.clone());
        uploaded.push(Attachment {
            url: uploads.public_url(&name, request_host(headers))?,
            filename: original.unwrap_or_else(|| "unknown".to_string()),
        });
    }

    Ok(uploaded)
}
