//! Wind speed unit conversion.
//!
//! Canonical speeds are meters per second. Conversions in both directions use
//! the same factor so that round trips are exact up to floating-point error.

use serde::{Deserialize, Serialize};

/// Meters per second in one knot.
pub const MPS_PER_KNOT: f64 = 0.514444;

/// Kilometers per hour in one meter per second.
pub const KMH_PER_MPS: f64 = 3.6;

pub fn knots_to_mps(knots: f64) -> f64 {
    knots * MPS_PER_KNOT
}

pub fn mps_to_knots(mps: f64) -> f64 {
    mps / MPS_PER_KNOT
}

pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / KMH_PER_MPS
}

pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * KMH_PER_MPS
}

/// A wind speed unit as reported by an upstream source or shown to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    #[serde(rename = "mps")]
    MetersPerSecond,
    Knots,
    #[serde(rename = "kmh")]
    KilometersPerHour,
}

impl SpeedUnit {
    /// Parse a unit token as it appears next to a value ("Knots", "kts", "km/h", "m/s").
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "kt" | "kts" | "knot" | "knots" => Some(SpeedUnit::Knots),
            "km/h" | "kmh" | "kph" => Some(SpeedUnit::KilometersPerHour),
            "m/s" | "mps" | "ms" => Some(SpeedUnit::MetersPerSecond),
            _ => None,
        }
    }

    pub fn to_mps(self, value: f64) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => value,
            SpeedUnit::Knots => knots_to_mps(value),
            SpeedUnit::KilometersPerHour => kmh_to_mps(value),
        }
    }

    pub fn from_mps(self, mps: f64) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => mps,
            SpeedUnit::Knots => mps_to_knots(mps),
            SpeedUnit::KilometersPerHour => mps_to_kmh(mps),
        }
    }

    /// Short suffix used in display text.
    pub fn suffix(self) -> &'static str {
        match self {
            SpeedUnit::MetersPerSecond => "m/s",
            SpeedUnit::Knots => "kt",
            SpeedUnit::KilometersPerHour => "km/h",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_knots_round_trip() {
        for mps in [0.0, 0.1, 3.7, 8.08, 25.0, 61.3] {
            assert_approx_eq!(knots_to_mps(mps_to_knots(mps)), mps, 1e-6);
        }
    }

    #[test]
    fn test_kmh_round_trip() {
        for mps in [0.0, 0.1, 3.7, 8.08, 25.0, 61.3] {
            assert_approx_eq!(kmh_to_mps(mps_to_kmh(mps)), mps, 1e-6);
        }
    }

    #[test]
    fn test_known_values() {
        assert_approx_eq!(knots_to_mps(15.7), 8.0767708, 1e-6);
        assert_approx_eq!(kmh_to_mps(36.0), 10.0, 1e-9);
        assert_approx_eq!(mps_to_kmh(10.0), 36.0, 1e-9);
    }

    #[test]
    fn test_unit_tokens() {
        assert_eq!(SpeedUnit::from_token("Knots"), Some(SpeedUnit::Knots));
        assert_eq!(SpeedUnit::from_token(" kts "), Some(SpeedUnit::Knots));
        assert_eq!(SpeedUnit::from_token("km/h"), Some(SpeedUnit::KilometersPerHour));
        assert_eq!(SpeedUnit::from_token("m/s"), Some(SpeedUnit::MetersPerSecond));
        assert_eq!(SpeedUnit::from_token("furlongs"), None);
    }

    #[test]
    fn test_unit_dispatch() {
        assert_approx_eq!(SpeedUnit::Knots.to_mps(10.0), 5.14444, 1e-9);
        assert_approx_eq!(SpeedUnit::KilometersPerHour.from_mps(5.0), 18.0, 1e-9);
        assert_eq!(SpeedUnit::MetersPerSecond.to_mps(4.2), 4.2);
    }
}
