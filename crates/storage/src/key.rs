//! Cache keys for readings.

use std::fmt;

use weather_common::TimeBucket;

const PREFIX: &str = "weather";

/// Where a reading lives in a [`ReadingStore`](crate::ReadingStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadingKey {
    /// Reading collected within one time bucket. Two collections in the same
    /// bucket share this key.
    Bucket { station: String, bucket: TimeBucket },
    /// Most recent good reading for a station, kept longer as a stale fallback.
    Latest { station: String },
}

impl ReadingKey {
    pub fn bucket(station: impl Into<String>, bucket: TimeBucket) -> Self {
        ReadingKey::Bucket {
            station: station.into(),
            bucket,
        }
    }

    pub fn latest(station: impl Into<String>) -> Self {
        ReadingKey::Latest {
            station: station.into(),
        }
    }

    pub fn station(&self) -> &str {
        match self {
            ReadingKey::Bucket { station, .. } | ReadingKey::Latest { station } => station,
        }
    }
}

impl fmt::Display for ReadingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingKey::Bucket { station, bucket } => {
                write!(f, "{}:reading:{}:{}", PREFIX, station, bucket.start_epoch())
            }
            ReadingKey::Latest { station } => write!(f, "{}:latest:{}", PREFIX, station),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_bucket_key_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 3, 20).unwrap();
        let key = ReadingKey::bucket("brambles", TimeBucket::default_for(at));
        assert_eq!(key.to_string(), "weather:reading:brambles:1714564800");
        assert_eq!(key.station(), "brambles");
    }

    #[test]
    fn test_same_bucket_same_key() {
        let a = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 1).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 1, 12, 4, 59).unwrap();
        assert_eq!(
            ReadingKey::bucket("seaview", TimeBucket::default_for(a)),
            ReadingKey::bucket("seaview", TimeBucket::default_for(b))
        );
    }

    #[test]
    fn test_latest_key_format() {
        assert_eq!(ReadingKey::latest("prarion").to_string(), "weather:latest:prarion");
    }
}
