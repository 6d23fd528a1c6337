//! Typed JSON envelopes of the primary/fallback and public sources.
//!
//! Each shape is deserialized strictly into its own struct. Required fields
//! that are missing make the payload a [`SourceError::Schema`] error; the
//! adapter layer decides whether that triggers a fallback.

use serde::Deserialize;
use weather_common::{parse_timestamp, units, Measurements};

use super::ParsedSample;
use crate::error::{SourceError, SourceResult};

const STATUS_OK: &str = "ok";

/// Averaged wind with gust envelope, knots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrimaryJsonShape {
    pub status: String,
    pub data: PrimaryData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrimaryData {
    pub ts: Option<String>,
    /// Average speed
    pub wsa: f64,
    /// Highest speed in the averaging window
    pub wsh: f64,
    /// Average direction
    pub wda: f64,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
}

/// Current wind only, knots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FallbackJsonShape {
    pub status: String,
    pub data: FallbackData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FallbackData {
    pub ts: Option<String>,
    pub wsc: f64,
    pub wdc: f64,
}

/// Public station document, km/h.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicJsonShape {
    pub data: PublicData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicData {
    pub id: u64,
    #[serde(default)]
    pub meta: Option<PublicMeta>,
    pub measurements: PublicMeasurements,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicMeta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicMeasurements {
    pub date: Option<String>,
    pub wind_heading: Option<f64>,
    pub wind_speed_avg: Option<f64>,
    pub wind_speed_max: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
}

/// Syntax errors are parse errors, well-formed JSON of the wrong shape is a
/// schema error.
fn decode<'a, T: Deserialize<'a>>(label: &str, body: &'a str) -> SourceResult<T> {
    serde_json::from_str(body).map_err(|e| {
        if e.is_data() {
            SourceError::schema(label, body)
        } else {
            SourceError::parse(label, e.to_string(), body)
        }
    })
}

pub fn parse_primary(body: &str) -> SourceResult<ParsedSample> {
    const LABEL: &str = "primary json";

    let shape: PrimaryJsonShape = decode(LABEL, body)?;
    if shape.status != STATUS_OK {
        return Err(SourceError::schema(LABEL, body));
    }
    let data = shape.data;

    Ok(ParsedSample {
        timestamp: data.ts.as_deref().and_then(parse_timestamp),
        measurements: Measurements {
            wind_speed: Some(units::knots_to_mps(data.wsa)),
            wind_gust: Some(units::knots_to_mps(data.wsh)),
            wind_direction: Some(data.wda),
            temperature: data.temp,
            pressure: data.pressure,
        },
    })
}

pub fn parse_fallback(body: &str) -> SourceResult<ParsedSample> {
    const LABEL: &str = "fallback json";

    let shape: FallbackJsonShape = decode(LABEL, body)?;
    if shape.status != STATUS_OK {
        return Err(SourceError::schema(LABEL, body));
    }
    let data = shape.data;

    Ok(ParsedSample {
        timestamp: data.ts.as_deref().and_then(parse_timestamp),
        measurements: Measurements {
            wind_speed: Some(units::knots_to_mps(data.wsc)),
            wind_gust: None,
            wind_direction: Some(data.wdc),
            ..Measurements::default()
        },
    })
}

/// Parse a public document, rejecting one that belongs to another station.
pub fn parse_public(body: &str, expected_station: u64) -> SourceResult<ParsedSample> {
    const LABEL: &str = "public json";

    let shape: PublicJsonShape = decode(LABEL, body)?;
    if shape.data.id != expected_station {
        return Err(SourceError::schema(LABEL, body));
    }
    let m = shape.data.measurements;

    Ok(ParsedSample {
        timestamp: m.date.as_deref().and_then(parse_timestamp),
        measurements: Measurements {
            wind_speed: m.wind_speed_avg.map(units::kmh_to_mps),
            wind_gust: m.wind_speed_max.map(units::kmh_to_mps),
            wind_direction: m.wind_heading,
            temperature: None,
            pressure: m.pressure,
        },
    })
}
