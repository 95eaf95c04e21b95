//! HTTP route handlers.
//!
//! Handlers stay thin: they translate HTTP to an engine call and pick a
//! status code from the result.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use techgraph_core::engine::{DiagnosticResult, FailureKind};

use super::models::{ErrorResponse, HealthResponse, QueryBody};
use super::AppState;

/// POST `/query` - Answer one query.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> (StatusCode, Json<DiagnosticResult>) {
    let result = state.engine.process_query(body).await;
    (status_for(&result), Json(result))
}

/// GET `/health` - Backend connectivity.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let backend = state.engine.backend_name().to_string();
    let timestamp = Utc::now().to_rfc3339();

    match state.engine.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                backend,
                error: None,
                timestamp,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                backend,
                error: Some(e.to_string()),
                timestamp,
            }),
        ),
    }
}

/// GET `/stats` - Node and relationship counts.
pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.engine.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

fn status_for(result: &DiagnosticResult) -> StatusCode {
    match result.failure_kind {
        None => StatusCode::OK,
        Some(FailureKind::UnrecognizedQuery) => StatusCode::BAD_REQUEST,
        Some(FailureKind::NoMatch) => StatusCode::NOT_FOUND,
        Some(FailureKind::BackendUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
        Some(FailureKind::InternalQueryError) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
