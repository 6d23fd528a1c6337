//! Per-station endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use weather_common::{
    format_reading_titled, CanonicalReading, DisplayUnit, ReadingDocument, WeatherError,
};

use super::{text_lines, ApiError, RefreshQuery};
use crate::error::CollectError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DisplayQuery {
    pub unit: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

/// Fresh reading, or the last good one marked stale. Unknown stations are
/// 404; a station with nothing to serve is 503.
async fn reading_or_stale(
    state: &AppState,
    station: &str,
    force: bool,
) -> Result<(CanonicalReading, bool), CollectError> {
    match state.collector.collect(station, force).await {
        Ok(reading) => Ok((reading, false)),
        Err(err @ CollectError::UnknownStation(_)) => Err(err),
        Err(err) => match state.collector.stale(station).await {
            Some(reading) => Ok((reading, true)),
            None => Err(err),
        },
    }
}

/// GET /api/v1/stations/:id
pub async fn station_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(station): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<ReadingDocument>, ApiError> {
    let (reading, stale) = reading_or_stale(&state, &station, query.refresh).await?;
    let doc = ReadingDocument::from_reading(&reading, state.ttl_secs());
    Ok(Json(if stale { doc.mark_stale() } else { doc }))
}

/// Unit for a station's display text: explicit query, else the unit of the
/// first region listing the station, else knots.
fn display_unit(
    state: &AppState,
    station: &str,
    requested: Option<&str>,
) -> Result<DisplayUnit, ApiError> {
    if let Some(raw) = requested {
        return DisplayUnit::parse(raw).ok_or_else(|| {
            ApiError::Weather(WeatherError::InvalidParameter {
                param: "unit".to_string(),
                message: format!("expected knots or kmh, got '{}'", raw),
            })
        });
    }
    Ok(state
        .catalog
        .regions()
        .iter()
        .find(|r| r.stations.iter().any(|s| s == station))
        .map(|r| r.unit)
        .unwrap_or(DisplayUnit::Knots))
}

/// GET /api/v1/stations/:id/display
pub async fn station_display_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(station): Path<String>,
    Query(query): Query<DisplayQuery>,
) -> Result<Response, ApiError> {
    let name = state.catalog.station(&station)?.name.clone();
    let unit = display_unit(&state, &station, query.unit.as_deref())?;
    let (reading, stale) = reading_or_stale(&state, &station, query.refresh).await?;

    let title = if stale {
        format!("{} (stale)", name)
    } else {
        name
    };
    Ok(text_lines(format_reading_titled(&title, &reading, unit)).into_response())
}
