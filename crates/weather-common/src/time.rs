//! Time handling: cache buckets and upstream timestamp parsing.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Default cache bucket width (5 minutes).
pub const DEFAULT_BUCKET_SECS: i64 = 300;

/// A fixed-width time window used as part of a cache key.
///
/// Two instants inside the same window map to the same bucket, so repeated
/// collection within a window is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBucket {
    start: i64,
    width_secs: i64,
}

impl TimeBucket {
    pub fn containing(instant: DateTime<Utc>, width_secs: i64) -> Self {
        let width_secs = width_secs.max(1);
        Self {
            start: instant.timestamp().div_euclid(width_secs) * width_secs,
            width_secs,
        }
    }

    /// Bucket with the default 5 minute width.
    pub fn default_for(instant: DateTime<Utc>) -> Self {
        Self::containing(instant, DEFAULT_BUCKET_SECS)
    }

    /// Bucket start as unix seconds.
    pub fn start_epoch(&self) -> i64 {
        self.start
    }

    pub fn start(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.start, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn width_secs(&self) -> i64 {
        self.width_secs
    }
}

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`
/// (assumed UTC) and integer unix seconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    s.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}
