// handlers/public/learnings.rs - GET /learnings, GET /learnings/all

use axum::extract::{rejection::QueryRejection, Query, State};

use crate::app::AppState;
use crate::database::models::Learning;
use crate::error::{ApiError, ApiResult};
use crate::handlers::AppJson;
use crate::services::{LearningPage, PageParams};

/// GET /learnings?page=0&size=10&search=java - One page of learnings, id order
///
/// `page` is zero-based. `search` matches title, description, tags and category
/// case-insensitively.
///
/// Expected Output:
/// ```json
/// {
///   "learnings": [{ "id": 1, "title": "Java streams", "tags": "java" }],
///   "currentPage": 0, "totalItems": 1, "totalPages": 1, "pageSize": 10,
///   "hasNext": false, "hasPrevious": false, "searchTerm": "java"
/// }
/// ```
pub async fn list_get(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<AppJson<LearningPage>> {
    let Query(params) = params.map_err(|e| ApiError::validation_error(e.body_text(), None))?;
    Ok(AppJson(state.learnings.list(params).await?))
}

/// GET /learnings/all - Every learning, unpaged
pub async fn all_get(State(state): State<AppState>) -> ApiResult<AppJson<Vec<Learning>>> {
    Ok(AppJson(state.learnings.list_all().await?))
}
