//! HTTP handlers for the serving edge.

pub mod collect;
pub mod health;
pub mod regions;
pub mod stations;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use weather_common::WeatherError;

use crate::error::CollectError;

/// `?refresh=true` bypasses the bucket cache.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

/// Error returned by handlers, rendered as JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Collect(#[from] CollectError),
}

impl ApiError {
    fn status(&self) -> u16 {
        match self {
            ApiError::Weather(e) => e.http_status_code(),
            ApiError::Collect(e) => e.http_status_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.to_string(),
            status,
        };
        (code, Json(body)).into_response()
    }
}

/// Join display lines into a `text/plain` body.
pub(crate) fn text_lines(lines: Vec<String>) -> Response {
    let mut body = lines.join("\n");
    body.push('\n');
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
