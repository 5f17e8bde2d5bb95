// handlers/protected/auth.rs - GET /auth/me handler

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::AccountProfile;
use crate::error::ApiResult;
use crate::handlers::AppJson;
use crate::middleware::AuthUser;

/// GET /auth/me - Profile of the token's subject
///
/// Expected Output:
/// ```json
/// { "username": "ada", "email": "ada@example.com", "roles": ["ROLE_USER"] }
/// ```
///
/// 401 when the account behind a still-valid token no longer exists.
pub async fn me_get(State(state): State<AppState>, user: AuthUser) -> ApiResult<AppJson<AccountProfile>> {
    Ok(AppJson(state.auth.current_user(&user.username).await?))
}
