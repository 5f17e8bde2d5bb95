// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiResult;
use crate::handlers::AppJson;
use crate::services::RegisterRequest;

/// POST /auth/register - Create a new account
///
/// Expected Input:
/// ```json
/// { "username": "ada", "email": "ada@example.com", "password": "at-least-6" }
/// ```
///
/// Expected Output (201):
/// ```json
/// { "message": "User registered successfully" }
/// ```
///
/// 400 for blank username/email or a short password, 409 for a taken username or email.
pub async fn register_post(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "User registered successfully" }))))
}
