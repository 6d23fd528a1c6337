//! Plain-text rendering for constrained display clients.
//!
//! Applied at the serving edge only. Readings arrive in SI units and are
//! converted to the region's display unit here. Absent optional fields are
//! omitted; [`format_region`] is the caller that renders `--` for failed slots.

use crate::reading::CanonicalReading;
use crate::region::{DisplayUnit, RegionResponse, SlotOutcome};

/// A gust line is only worth showing when it differs from the average by
/// at least this much, in display units.
pub const GUST_DISPLAY_THRESHOLD: f64 = 1.0;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass label for a direction in degrees.
pub fn compass_point(degrees: u16) -> &'static str {
    let index = ((degrees % 360) as f64 / 22.5 + 0.5) as usize % 16;
    COMPASS_POINTS[index]
}

/// Render a reading with the station id as header.
pub fn format_reading(reading: &CanonicalReading, unit: DisplayUnit) -> Vec<String> {
    format_reading_titled(&reading.station_id, reading, unit)
}

/// Render a reading under an explicit header.
pub fn format_reading_titled(
    title: &str,
    reading: &CanonicalReading,
    unit: DisplayUnit,
) -> Vec<String> {
    let speed_unit = unit.speed_unit();
    let suffix = speed_unit.suffix();
    let mut lines = vec![title.to_string()];

    let avg = reading.wind_speed.map(|s| speed_unit.from_mps(s));
    if let Some(avg) = avg {
        let mut line = format!("Wind: {:.1} {}", avg, suffix);
        if let Some(dir) = reading.wind_direction {
            line.push_str(&format!(" {}° {}", dir, compass_point(dir)));
        }
        lines.push(line);
    }

    if let Some(gust) = reading.wind_gust.map(|g| speed_unit.from_mps(g)) {
        let meaningful = avg.map_or(true, |avg| gust - avg >= GUST_DISPLAY_THRESHOLD);
        if meaningful {
            lines.push(format!("Gust: {:.1} {}", gust, suffix));
        }
    }

    if let Some(t) = reading.temperature {
        lines.push(format!("Temp: {:.1}°C", t));
    }

    if let Some(p) = reading.pressure {
        lines.push(format!("Pressure: {:.0} hPa", p));
    }

    lines.push(format!("Updated: {}", reading.timestamp.format("%H:%M UTC")));
    lines
}

/// Render a whole region, one block per configured slot, blank line between.
pub fn format_region(response: &RegionResponse) -> Vec<String> {
    let mut lines = vec![response.name.to_uppercase()];

    for slot in &response.stations {
        lines.push(String::new());
        match &slot.outcome {
            SlotOutcome::Fresh(reading) => {
                lines.extend(format_reading_titled(&slot.name, reading, response.unit));
            }
            SlotOutcome::Stale(reading) => {
                let title = format!("{} (stale)", slot.name);
                lines.extend(format_reading_titled(&title, reading, response.unit));
            }
            SlotOutcome::Failed(_) => {
                lines.push(slot.name.clone());
                lines.push("Wind: --".to_string());
            }
        }
    }

    lines
}
