//! JSON documents served to API clients (`weather.v1`, `weather-region.v1`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::CanonicalReading;
use crate::region::{DisplayUnit, RegionResponse, SlotOutcome};

pub const READING_SCHEMA: &str = "weather.v1";
pub const REGION_SCHEMA: &str = "weather-region.v1";

/// Per-station document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDocument {
    pub schema: String,
    pub station_id: String,
    pub timestamp: String,
    pub is_valid: bool,
    pub data: ReadingData,
    pub ttl: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingData {
    pub wind: WindBlock,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TemperatureBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<PressureBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<u16>,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureBlock {
    pub air: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureBlock {
    pub value: f64,
    pub unit: String,
}

fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl ReadingDocument {
    pub fn from_reading(reading: &CanonicalReading, ttl: u64) -> Self {
        Self {
            schema: READING_SCHEMA.to_string(),
            station_id: reading.station_id.clone(),
            timestamp: iso8601(reading.timestamp),
            is_valid: reading.is_valid,
            data: ReadingData {
                wind: WindBlock {
                    avg: reading.wind_speed,
                    gust: reading.wind_gust,
                    direction: reading.wind_direction,
                    unit: "mps".to_string(),
                },
                temperature: reading.temperature.map(|air| TemperatureBlock {
                    air,
                    unit: "celsius".to_string(),
                }),
                pressure: reading.pressure.map(|value| PressureBlock {
                    value,
                    unit: "hPa".to_string(),
                }),
            },
            ttl,
            stale: false,
            error: None,
        }
    }

    /// Slot filler for a station that could not be collected.
    ///
    /// The wind block is zeroed rather than omitted because display clients
    /// index into it unconditionally; `isValid` is false and `error` is set.
    pub fn placeholder(
        station_id: impl Into<String>,
        error: impl Into<String>,
        now: DateTime<Utc>,
        ttl: u64,
    ) -> Self {
        Self {
            schema: READING_SCHEMA.to_string(),
            station_id: station_id.into(),
            timestamp: iso8601(now),
            is_valid: false,
            data: ReadingData {
                wind: WindBlock {
                    avg: Some(0.0),
                    gust: Some(0.0),
                    direction: Some(0),
                    unit: "mps".to_string(),
                },
                temperature: None,
                pressure: None,
            },
            ttl,
            stale: false,
            error: Some(error.into()),
        }
    }

    pub fn mark_stale(mut self) -> Self {
        self.stale = true;
        self
    }
}

/// Region document: fixed-length, configured-order station array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDocument {
    pub schema: String,
    pub region_id: String,
    pub name: String,
    pub unit: DisplayUnit,
    pub generated_at: String,
    pub ttl: u64,
    pub stations: Vec<ReadingDocument>,
}

impl RegionDocument {
    pub fn from_response(response: &RegionResponse) -> Self {
        let stations = response
            .stations
            .iter()
            .map(|slot| match &slot.outcome {
                SlotOutcome::Fresh(r) => ReadingDocument::from_reading(r, response.ttl_secs),
                SlotOutcome::Stale(r) => {
                    ReadingDocument::from_reading(r, response.ttl_secs).mark_stale()
                }
                SlotOutcome::Failed(message) => ReadingDocument::placeholder(
                    &slot.station_id,
                    message,
                    response.generated_at,
                    response.ttl_secs,
                ),
            })
            .collect();

        Self {
            schema: REGION_SCHEMA.to_string(),
            region_id: response.region_id.clone(),
            name: response.name.clone(),
            unit: response.unit,
            generated_at: iso8601(response.generated_at),
            ttl: response.ttl_secs,
            stations,
        }
    }
}
