//! The canonical reading: one station at one instant, in SI units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Valid air temperature range in °C (inclusive).
pub const TEMPERATURE_RANGE_C: (f64, f64) = (-60.0, 60.0);

/// Valid station pressure range in hPa (inclusive).
pub const PRESSURE_RANGE_HPA: (f64, f64) = (800.0, 1200.0);

/// Anything faster than this is a corrupt frame, not weather.
pub const MAX_WIND_SPEED_MPS: f64 = 100.0;

/// Normalized weather reading for a single station.
///
/// Every optional field is `None` when the value was not measured or was
/// outside its physical range. `None` never means calm or freezing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReading {
    pub station_id: String,
    pub timestamp: DateTime<Utc>,
    /// Average wind speed in m/s.
    pub wind_speed: Option<f64>,
    /// Peak wind speed in m/s. `None` for single-sample sources.
    pub wind_gust: Option<f64>,
    /// Degrees, 0..=359.
    pub wind_direction: Option<u16>,
    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Pressure in hPa.
    pub pressure: Option<f64>,
    pub is_valid: bool,
    /// Time spent turning the raw payload into this reading.
    #[serde(default)]
    pub parse_latency_ms: u64,
}

/// Unvalidated values extracted by a parser, wind already in m/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_direction: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
}

impl CanonicalReading {
    /// Build a reading from raw measurements, dropping out-of-range values.
    pub fn from_measurements(
        station_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        m: Measurements,
    ) -> Self {
        let mut reading = Self {
            station_id: station_id.into(),
            timestamp,
            wind_speed: normalize_speed(m.wind_speed),
            wind_gust: normalize_speed(m.wind_gust),
            wind_direction: normalize_direction(m.wind_direction),
            temperature: normalize_temperature(m.temperature),
            pressure: normalize_pressure(m.pressure),
            is_valid: false,
            parse_latency_ms: 0,
        };
        reading.is_valid = reading.compute_validity();
        reading
    }

    pub fn with_parse_latency(mut self, latency_ms: u64) -> Self {
        self.parse_latency_ms = latency_ms;
        self
    }

    /// Wind speed and direction present, temperature absent or in range.
    pub fn compute_validity(&self) -> bool {
        let temperature_ok = self
            .temperature
            .map_or(true, |t| in_range(t, TEMPERATURE_RANGE_C));
        self.wind_speed.is_some() && self.wind_direction.is_some() && temperature_ok
    }
}

fn in_range(value: f64, (lo, hi): (f64, f64)) -> bool {
    value.is_finite() && value >= lo && value <= hi
}

pub fn normalize_speed(value: Option<f64>) -> Option<f64> {
    value.filter(|v| in_range(*v, (0.0, MAX_WIND_SPEED_MPS)))
}

/// Wrap into 0..=359; non-finite input is dropped.
pub fn normalize_direction(value: Option<f64>) -> Option<u16> {
    let deg = value.filter(|v| v.is_finite())?.round() as i64;
    Some(deg.rem_euclid(360) as u16)
}

pub fn normalize_temperature(value: Option<f64>) -> Option<f64> {
    value.filter(|v| in_range(*v, TEMPERATURE_RANGE_C))
}

pub fn normalize_pressure(value: Option<f64>) -> Option<f64> {
    value.filter(|v| in_range(*v, PRESSURE_RANGE_HPA))
}
