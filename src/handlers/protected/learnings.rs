// handlers/protected/learnings.rs - Learning writes

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
};

use crate::app::AppState;
use crate::database::models::{Learning, LearningDraft};
use crate::error::{ApiError, ApiResult};
use crate::handlers::AppJson;
use crate::middleware::AuthUser;

/// POST /learnings - Store a new learning
///
/// Expected Input (every field optional; `id` is ignored):
/// ```json
/// {
///   "title": "Spring Boot", "description": "...", "category": "Job",
///   "date": "2023-10-15", "tags": "java,spring",
///   "attachments": [{ "url": "http://host/uploads/<uuid>.pdf", "filename": "notes.pdf" }],
///   "customProperties": "{\"source\":\"book\"}"
/// }
/// ```
///
/// Returns 201 with the stored record including its generated id.
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(draft): AppJson<LearningDraft>,
) -> ApiResult<(StatusCode, AppJson<Learning>)> {
    let learning = state.learnings.create(draft).await?;
    tracing::debug!("Learning {} created by {}", learning.id, user.username);
    Ok((StatusCode::CREATED, AppJson(learning)))
}

/// PUT /learnings/:id - Replace every content field of an existing learning
pub async fn update_put(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    AppJson(draft): AppJson<LearningDraft>,
) -> ApiResult<AppJson<Learning>> {
    let Path(id) = id.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(AppJson(state.learnings.update(id, draft).await?))
}

/// DELETE /learnings/:id - 200 with an empty body, 404 when absent
pub async fn delete_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id.map_err(|e| ApiError::bad_request(e.body_text()))?;
    state.learnings.delete(id).await?;
    Ok(StatusCode::OK)
}
