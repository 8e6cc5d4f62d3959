use crate::startup::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Liveness probe; reports the loaded model artifact.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "model": state.config.model.artifact_name(),
    }))
}

/// Readiness probe. The classifier is loaded before the listener binds, so
/// any served request implies readiness.
pub async fn readiness_check() -> impl IntoResponse {
    StatusCode::OK
}
