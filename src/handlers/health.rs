use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "charges-predictor",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 200 only when both the dataset and the model are loaded
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let artifacts = &state.artifacts;
    let status = |failure: Option<String>| match failure {
        None => json!({ "loaded": true }),
        Some(error) => json!({ "loaded": false, "error": error }),
    };

    let label = if artifacts.is_ready() { "ready" } else { "degraded" };
    let body = json!({
        "status": label,
        "service": "charges-predictor",
        "dataset": status(artifacts.dataset().err().map(|f| f.to_string())),
        "model": status(artifacts.model().err().map(|f| f.to_string())),
    });

    let code = if artifacts.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body))
}
