// handlers/public/auth/logout.rs - POST /auth/logout handler

use axum::response::Json;
use serde_json::{json, Value};

/// POST /auth/logout - Sessions are stateless JWTs; the client discards its token.
pub async fn logout_post() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}
