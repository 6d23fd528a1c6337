//! Raw payload -> [`CanonicalReading`].
//!
//! Every parser returns a [`ParsedSample`] of unvalidated values in SI wind
//! units. Range checks, direction wrapping and validity are applied once,
//! here, when the canonical reading is built.

pub mod bitfield;
pub mod json;
pub mod session_text;
pub mod table;

use std::time::Instant;

use chrono::{DateTime, Utc};
use weather_common::{CanonicalReading, Measurements};

use crate::error::SourceResult;
use crate::raw::RawSample;
use crate::reconcile;

/// Values pulled out of one payload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedSample {
    /// Source-reported time, if the payload carries one.
    pub timestamp: Option<DateTime<Utc>>,
    pub measurements: Measurements,
}

impl ParsedSample {
    /// Canonical reading stamped with the source time, or `now` when absent.
    pub fn into_reading(self, station: &str, now: DateTime<Utc>) -> CanonicalReading {
        CanonicalReading::from_measurements(
            station,
            self.timestamp.unwrap_or(now),
            self.measurements,
        )
    }
}

/// Instantaneous reading from one decoded live record. Never has a gust.
pub fn live_sample(live: &session_text::LiveTextShape) -> ParsedSample {
    ParsedSample {
        timestamp: live.timestamp,
        measurements: Measurements {
            wind_speed: Some(live.record.speed_ms),
            wind_gust: None,
            wind_direction: Some(live.record.direction_deg as f64),
            temperature: Some(live.record.temperature_c),
            pressure: None,
        },
    }
}

/// Parse any raw sample for `station`.
///
/// `now` stamps readings whose payload carries no timestamp.
pub fn parse(raw: &RawSample, station: &str, now: DateTime<Utc>) -> SourceResult<CanonicalReading> {
    let started = Instant::now();

    let sample = match raw {
        RawSample::HtmlTable { html, labels } => table::parse_table(html, labels)?,
        RawSample::LiveText(body) => live_sample(&session_text::parse_live(body)?),
        RawSample::HistoricalText(body) => {
            let window = session_text::parse_historical(body)?;
            reconcile::reconcile(Ok(window), None)?
        }
        RawSample::PrimaryJson(body) => json::parse_primary(body)?,
        RawSample::FallbackJson(body) => json::parse_fallback(body)?,
        RawSample::PublicJson {
            body,
            expected_station,
        } => json::parse_public(body, *expected_station)?,
    };

    let latency_ms = started.elapsed().as_millis() as u64;
    Ok(sample.into_reading(station, now).with_parse_latency(latency_ms))
}
