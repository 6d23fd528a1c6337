//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use storage::CacheStatsSnapshot;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache_backend: String,
    pub stations: usize,
    pub regions: usize,
    pub uptime_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStatsSnapshot>,
}

/// GET /health
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        cache_backend: state.store().backend().to_string(),
        stations: state.catalog.stations().len(),
        regions: state.catalog.regions().len(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        cache: state.store().stats(),
    })
}

/// GET /metrics - Prometheus text format
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
