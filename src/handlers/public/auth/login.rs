// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::handlers::AppJson;
use crate::services::{LoginRequest, LoginResponse};

/// POST /auth/login - Authenticate and receive a JWT
///
/// Expected Input:
/// ```json
/// { "username": "ada", "password": "secret1", "rememberMe": false }
/// ```
///
/// Expected Output:
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiI...",
///   "username": "ada",
///   "email": "ada@example.com",
///   "roles": ["ROLE_USER", "ROLE_ADMIN"],
///   "expiresIn": 3600
/// }
/// ```
///
/// `rememberMe` extends the token lifetime to seven days.
pub async fn login_post(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> ApiResult<AppJson<LoginResponse>> {
    Ok(AppJson(state.auth.login(request).await?))
}
