// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - Service description
pub async fn root_get(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "Learnings API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "endpoints": {
            "auth": "/auth/register, /auth/login, /auth/logout (public); /auth/me (bearer)",
            "learnings": "GET /learnings, GET /learnings/all (public); POST, PUT /:id, DELETE /:id (bearer)",
            "upload": "POST /upload, POST /upload/multiple (bearer)",
            "files": "/uploads/* (public)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health - Store connectivity
pub async fn health_get(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "store": backend })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": backend,
                    "error": "store unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
