//! Region endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
    Json,
};
use serde::Serialize;
use weather_common::{format_region, DisplayUnit, RegionDocument};

use super::{text_lines, ApiError, RefreshQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub id: String,
    pub name: String,
    pub unit: DisplayUnit,
    pub stations: Vec<String>,
}

/// GET /api/v1/regions
pub async fn list_regions_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<RegionSummary>> {
    Json(
        state
            .catalog
            .regions()
            .iter()
            .map(|r| RegionSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                unit: r.unit,
                stations: r.stations.clone(),
            })
            .collect(),
    )
}

/// GET /api/v1/regions/:id
///
/// Always 200 for a known region; failed stations show up as invalid slots.
pub async fn region_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(region): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<RegionDocument>, ApiError> {
    let response = state.aggregator.aggregate(&region, query.refresh).await?;
    Ok(Json(RegionDocument::from_response(&response)))
}

/// GET /api/v1/regions/:id/display
pub async fn region_display_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(region): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Response, ApiError> {
    let response = state.aggregator.aggregate(&region, query.refresh).await?;
    Ok(text_lines(format_region(&response)))
}
