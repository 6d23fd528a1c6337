//! Regions: fixed groups of three stations sharing one display unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WeatherError, WeatherResult};
use crate::reading::CanonicalReading;
use crate::units::SpeedUnit;

/// Display clients are hard-coded to three slots per region.
pub const REGION_STATION_COUNT: usize = 3;

/// Unit a region's display text is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    /// Marine regions.
    Knots,
    /// Alpine regions.
    #[serde(alias = "km/h")]
    Kmh,
}

impl DisplayUnit {
    pub fn speed_unit(self) -> SpeedUnit {
        match self {
            DisplayUnit::Knots => SpeedUnit::Knots,
            DisplayUnit::Kmh => SpeedUnit::KilometersPerHour,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "knots" | "kt" | "kts" => Some(DisplayUnit::Knots),
            "kmh" | "km/h" | "kph" => Some(DisplayUnit::Kmh),
            _ => None,
        }
    }
}

/// Static region definition. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub id: String,
    pub name: String,
    pub unit: DisplayUnit,
    /// Ordered; response slots follow this order.
    pub stations: Vec<String>,
}

impl RegionConfig {
    pub fn validate(&self) -> WeatherResult<()> {
        if self.stations.len() != REGION_STATION_COUNT {
            return Err(WeatherError::InvalidConfig(format!(
                "region '{}' has {} stations, expected {}",
                self.id,
                self.stations.len(),
                REGION_STATION_COUNT
            )));
        }
        Ok(())
    }
}

/// What ended up in one region slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    /// Collected (or cached) within the current window.
    Fresh(CanonicalReading),
    /// Collection failed; this is the last known good reading.
    Stale(CanonicalReading),
    /// Collection failed and nothing usable was cached.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationSlot {
    pub station_id: String,
    pub name: String,
    pub outcome: SlotOutcome,
}

impl StationSlot {
    pub fn reading(&self) -> Option<&CanonicalReading> {
        match &self.outcome {
            SlotOutcome::Fresh(r) | SlotOutcome::Stale(r) => Some(r),
            SlotOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SlotOutcome::Failed(_))
    }
}

/// Aggregated region result. `stations.len()` always equals the configured count.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionResponse {
    pub region_id: String,
    pub name: String,
    pub unit: DisplayUnit,
    pub generated_at: DateTime<Utc>,
    pub ttl_secs: u64,
    pub stations: Vec<StationSlot>,
}

impl RegionResponse {
    pub fn failed_count(&self) -> usize {
        self.stations.iter().filter(|s| s.is_failed()).count()
    }
}
