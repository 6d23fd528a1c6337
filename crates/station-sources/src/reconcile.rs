//! Historical reconciliation for the session-binary source.
//!
//! A single live record cannot produce a gust and its temperature is
//! occasionally corrupt. Wind statistics therefore come from the trailing
//! historical window, while temperature comes from the live record whenever
//! one was obtained and it is within the plausible range.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use weather_common::reading::normalize_temperature;
use weather_common::Measurements;

use crate::error::{SourceError, SourceResult};
use crate::parsers::session_text::{HistoricalSample, HistoricalTextShape, LiveTextShape};
use crate::parsers::{live_sample, ParsedSample};

/// Most recent samples kept from a window.
pub const MAX_WINDOW_SAMPLES: usize = 30;

/// Temperatures further than this from the window median are dropped.
pub const TEMPERATURE_OUTLIER_C: f64 = 8.0;

/// Wind and temperature statistics of one historical window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub latest: DateTime<Utc>,
    pub sample_count: usize,
    pub avg_speed_ms: f64,
    pub gust_ms: f64,
    /// Arithmetic mean, no circular correction.
    pub direction_deg: f64,
    pub temperature_c: f64,
}

/// Summarize the most recent [`MAX_WINDOW_SAMPLES`] samples.
///
/// Returns `None` for an empty window.
pub fn summarize(samples: &[HistoricalSample]) -> Option<WindowSummary> {
    let mut ordered = samples.to_vec();
    ordered.sort_by_key(|s| s.timestamp);
    let start = ordered.len().saturating_sub(MAX_WINDOW_SAMPLES);
    let window = &ordered[start..];

    let latest = window.last()?.timestamp;
    let speeds: Vec<f64> = window.iter().map(|s| s.record.speed_ms).collect();
    let directions: Vec<f64> = window.iter().map(|s| s.record.direction_deg as f64).collect();
    let temperatures: Vec<f64> = window.iter().map(|s| s.record.temperature_c).collect();

    Some(WindowSummary {
        latest,
        sample_count: window.len(),
        avg_speed_ms: mean(&speeds)?,
        gust_ms: speeds.iter().copied().fold(f64::MIN, f64::max),
        direction_deg: mean(&directions)?,
        temperature_c: filtered_temperature(&temperatures)?,
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Mean of the temperatures within [`TEMPERATURE_OUTLIER_C`] of the median,
/// or the median itself if nothing survives.
pub fn filtered_temperature(values: &[f64]) -> Option<f64> {
    let median = median(values)?;
    let kept: Vec<f64> = values
        .iter()
        .copied()
        .filter(|t| (t - median).abs() <= TEMPERATURE_OUTLIER_C)
        .collect();
    Some(mean(&kept).unwrap_or(median))
}

/// Combine the historical window with the live record.
///
/// `live` is `None` when no live fetch was made. If the window is missing
/// the live record alone is used, without a gust. If both are missing the
/// historical error is returned.
pub fn reconcile(
    history: SourceResult<HistoricalTextShape>,
    live: Option<SourceResult<LiveTextShape>>,
) -> SourceResult<ParsedSample> {
    let window = match history {
        Ok(window) => window,
        Err(history_err) => {
            return match live {
                Some(Ok(live)) => {
                    warn!(error = %history_err, "Historical window unavailable, using live record");
                    Ok(live_sample(&live))
                }
                _ => Err(history_err),
            };
        }
    };

    let summary = summarize(&window.samples).ok_or_else(|| {
        SourceError::parse("historical records", "empty window", "")
    })?;
    debug!(
        samples = summary.sample_count,
        discarded = window.discarded,
        avg_ms = summary.avg_speed_ms,
        gust_ms = summary.gust_ms,
        "Reconciled historical window"
    );

    let temperature = match live {
        Some(Ok(live)) => match normalize_temperature(Some(live.record.temperature_c)) {
            Some(t) => t,
            None => {
                debug!(
                    live_c = live.record.temperature_c,
                    "Live temperature out of range, keeping window temperature"
                );
                summary.temperature_c
            }
        },
        Some(Err(live_err)) => {
            debug!(error = %live_err, "Live record unavailable, keeping window temperature");
            summary.temperature_c
        }
        None => summary.temperature_c,
    };

    Ok(ParsedSample {
        timestamp: Some(summary.latest),
        measurements: Measurements {
            wind_speed: Some(summary.avg_speed_ms),
            wind_gust: Some(summary.gust_ms),
            wind_direction: Some(summary.direction_deg),
            temperature: Some(temperature),
            pressure: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::bitfield::decode_record;
    use crate::parsers::session_text::{parse_historical, parse_live};
    use test_utils::fixtures::{session_history, session_record, SESSION_LIVE};
    use test_utils::{assert_approx_eq, assert_some_approx_eq};

    fn sample(ts: i64, temperature: f64, speed: f64, direction: u32) -> HistoricalSample {
        HistoricalSample {
            timestamp: DateTime::from_timestamp(ts, 0).unwrap(),
            record: decode_record(&session_record(temperature, speed, direction)).unwrap(),
        }
    }

    #[test]
    fn test_wind_statistics() {
        let samples = vec![
            sample(3, 15.0, 6.0, 200),
            sample(1, 15.0, 2.0, 180),
            sample(2, 15.0, 4.0, 190),
        ];
        let s = summarize(&samples).unwrap();
        assert_approx_eq!(s.avg_speed_ms, 4.0, 1e-9);
        assert_approx_eq!(s.gust_ms, 6.0, 1e-9);
        assert_approx_eq!(s.direction_deg, 190.0, 1e-9);
        assert_eq!(s.latest.timestamp(), 3);
    }

    #[test]
    fn test_direction_is_arithmetic_mean() {
        // Across north the arithmetic mean points south; kept as-is.
        let samples = vec![sample(1, 15.0, 3.0, 350), sample(2, 15.0, 3.0, 10)];
        let s = summarize(&samples).unwrap();
        assert_approx_eq!(s.direction_deg, 180.0, 1e-9);
    }

    #[test]
    fn test_keeps_most_recent_thirty() {
        let mut samples: Vec<_> = (0..40).map(|i| sample(i, 15.0, 1.0, 90)).collect();
        // The oldest ten carry a huge speed that must not reach the gust
        for s in samples.iter_mut().take(10) {
            *s = sample(s.timestamp.timestamp(), 15.0, 50.0, 90);
        }
        samples.reverse();
        let s = summarize(&samples).unwrap();
        assert_eq!(s.sample_count, MAX_WINDOW_SAMPLES);
        assert_approx_eq!(s.gust_ms, 1.0, 1e-9);
        assert_eq!(s.latest.timestamp(), 39);
    }

    #[test]
    fn test_temperature_outlier_rejected() {
        let t = filtered_temperature(&[14.0, 14.2, 14.4, 40.0, 14.6]).unwrap();
        assert_approx_eq!(t, 14.3, 1e-9);
    }

    #[test]
    fn test_temperature_falls_back_to_median() {
        // Even count, median 10.0, both samples 10 away
        let t = filtered_temperature(&[0.0, 20.0]).unwrap();
        assert_approx_eq!(t, 10.0, 1e-9);
    }

    #[test]
    fn test_gust_never_below_average() {
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for round in 0..200 {
            let n = 1 + round % 35;
            let samples: Vec<_> = (0..n)
                .map(|i| {
                    seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    let speed = ((seed >> 33) % 400) as f64 / 10.0;
                    sample(i as i64, 12.0, speed, ((seed >> 20) % 360) as u32)
                })
                .collect();
            let s = summarize(&samples).unwrap();
            assert!(s.gust_ms >= s.avg_speed_ms, "{:?}", s);
        }
    }

    #[test]
    fn test_live_temperature_overrides_window() {
        let history = parse_historical(&session_history(&[(1, 20.0, 3.0, 180), (2, 20.0, 5.0, 180)]));
        let live = parse_live(SESSION_LIVE);
        let parsed = reconcile(history, Some(live)).unwrap();
        let m = parsed.measurements;
        assert_eq!(m.temperature, Some(15.0));
        assert_some_approx_eq!(m.wind_speed, 4.0, 1e-9);
        assert_some_approx_eq!(m.wind_gust, 5.0, 1e-9);
    }

    #[test]
    fn test_live_failure_keeps_window_temperature() {
        let history = parse_historical(&session_history(&[(1, 20.0, 3.0, 180)]));
        let parsed = reconcile(history, Some(parse_live("junk"))).unwrap();
        assert_eq!(parsed.measurements.temperature, Some(20.0));
    }

    #[test]
    fn test_implausible_live_temperature_keeps_window() {
        let history = parse_historical(&session_history(&[(1, 20.0, 3.0, 180), (2, 21.0, 5.0, 180)]));
        let live = parse_live(&format!("1714564800:{}", session_record(99.0, 3.7, 188)));
        let parsed = reconcile(history, Some(live)).unwrap();
        assert_some_approx_eq!(parsed.measurements.temperature, 20.5, 1e-9);
    }

    #[test]
    fn test_history_failure_uses_live_without_gust() {
        let history = parse_historical("");
        let parsed = reconcile(history, Some(parse_live(SESSION_LIVE))).unwrap();
        assert_eq!(parsed.measurements.wind_gust, None);
        assert_eq!(parsed.measurements.wind_speed, Some(3.7));
    }

    #[test]
    fn test_both_failing_is_error() {
        let err = reconcile(parse_historical(""), Some(parse_live(""))).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
        assert!(reconcile(parse_historical(""), None).is_err());
    }
}
