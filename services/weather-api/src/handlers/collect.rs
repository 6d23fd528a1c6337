use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::state::AppState;
use crate::warming::WarmSummary;

/// POST /api/v1/collect
///
/// Runs one forced warm cycle over every station and reports the result.
pub async fn collect_handler(Extension(state): Extension<Arc<AppState>>) -> Json<WarmSummary> {
    Json(state.warmer.run_cycle(true).await)
}
