use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{error::AskError, services::metrics, startup::AppState};

/// Plain-text banner served at `/`.
pub const INDEX_BANNER: &str = "Gemini API 기반 봇 서버입니다.";

pub async fn index() -> &'static str {
    INDEX_BANNER
}

/// Health check endpoint for liveness probes.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "ask-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness: the context document must currently be loadable.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.documents.load().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        metrics::get_metrics(),
    )
}

pub async fn not_found(uri: axum::http::Uri) -> AskError {
    AskError::NotFound(uri.path().to_string())
}
