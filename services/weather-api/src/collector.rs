//! Cache-first collection of one station.
//!
//! The collector returns either a reading for the current time bucket or an
//! explicit [`CollectError`]. It never serves an expired reading itself; the
//! `latest` copy it writes is for the layer above to fall back on.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use station_sources::{build_source, StationSource};
use storage::{ReadingKey, ReadingStore};
use tracing::{debug, info, instrument, warn};
use weather_common::{CanonicalReading, TimeBucket, DEFAULT_BUCKET_SECS};

use crate::config::StationCatalog;
use crate::error::CollectError;
use crate::metrics::{
    READING_CACHE_HITS_TOTAL, READING_CACHE_MISSES_TOTAL, STATION_COLLECT_DURATION_MS,
    STATION_COLLECT_TOTAL,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectorSettings {
    /// Lifetime of a bucket entry.
    pub reading_ttl: Duration,
    /// Lifetime of the per-station `latest` entry.
    pub stale_ttl: Duration,
    pub bucket_secs: i64,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            reading_ttl: Duration::from_secs(300),
            stale_ttl: Duration::from_secs(3600),
            bucket_secs: DEFAULT_BUCKET_SECS,
        }
    }
}

pub struct Collector {
    sources: HashMap<String, Arc<dyn StationSource>>,
    store: Arc<dyn ReadingStore>,
    settings: CollectorSettings,
}

impl Collector {
    pub fn new(store: Arc<dyn ReadingStore>, settings: CollectorSettings) -> Self {
        Self {
            sources: HashMap::new(),
            store,
            settings,
        }
    }

    /// One adapter per catalogue station, all sharing `client`.
    pub fn from_catalog(
        catalog: &StationCatalog,
        client: reqwest::Client,
        store: Arc<dyn ReadingStore>,
        settings: CollectorSettings,
    ) -> Self {
        let mut collector = Self::new(store, settings);
        for station in catalog.stations() {
            collector.register(build_source(station, &catalog.fetch, client.clone()));
        }
        collector
    }

    pub fn register(&mut self, source: Arc<dyn StationSource>) {
        self.sources.insert(source.station_id().to_string(), source);
    }

    pub fn station_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sources.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn ReadingStore> {
        &self.store
    }

    /// Cache key for `station` in the bucket containing `now`.
    pub fn bucket_key(&self, station: &str, now: DateTime<Utc>) -> ReadingKey {
        ReadingKey::bucket(station, TimeBucket::containing(now, self.settings.bucket_secs))
    }

    pub async fn collect(&self, station: &str, force: bool) -> Result<CanonicalReading, CollectError> {
        self.collect_at(station, force, Utc::now()).await
    }

    /// Collect `station` as of `now`.
    ///
    /// With `force` the cache read is skipped; the fresh reading still
    /// overwrites the bucket entry.
    #[instrument(skip(self, now))]
    pub async fn collect_at(
        &self,
        station: &str,
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<CanonicalReading, CollectError> {
        let source = self
            .sources
            .get(station)
            .ok_or_else(|| CollectError::UnknownStation(station.to_string()))?;
        let key = self.bucket_key(station, now);

        if !force {
            match self.store.get(&key).await {
                Ok(Some(reading)) => {
                    counter!(READING_CACHE_HITS_TOTAL).increment(1);
                    record_outcome(station, "cached");
                    debug!(key = %key, "Serving cached reading");
                    return Ok(reading);
                }
                Ok(None) => counter!(READING_CACHE_MISSES_TOTAL).increment(1),
                Err(e) => {
                    counter!(READING_CACHE_MISSES_TOTAL).increment(1);
                    warn!(key = %key, error = %e, "Cache read failed, collecting upstream");
                }
            }
        }

        let started = Instant::now();
        let result = source.read(now).await;
        histogram!(STATION_COLLECT_DURATION_MS, "station" => station.to_string())
            .record(started.elapsed().as_millis() as f64);

        let reading = match result {
            Ok(reading) if reading.is_valid => reading,
            Ok(_) => {
                let err = CollectError::Invalid {
                    station: station.to_string(),
                };
                record_outcome(station, err.outcome());
                warn!(error = %err, "Discarding invalid reading");
                return Err(err);
            }
            Err(e) => {
                let err = CollectError::Upstream {
                    station: station.to_string(),
                    message: e.to_string(),
                };
                record_outcome(station, err.outcome());
                warn!(kind = e.kind(), error = %e, "Collection failed");
                return Err(err);
            }
        };

        self.write_through(&key, &reading).await;
        record_outcome(station, "fresh");
        info!(
            key = %key,
            wind_ms = ?reading.wind_speed,
            gust_ms = ?reading.wind_gust,
            direction = ?reading.wind_direction,
            "Collected reading"
        );
        Ok(reading)
    }

    /// Store under the bucket key and refresh the station's `latest` copy.
    ///
    /// Store failures are logged; the reading is still returned.
    async fn write_through(&self, key: &ReadingKey, reading: &CanonicalReading) {
        if let Err(e) = self.store.put(key, reading, self.settings.reading_ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
        let latest = ReadingKey::latest(key.station());
        if let Err(e) = self.store.put(&latest, reading, self.settings.stale_ttl).await {
            warn!(key = %latest, error = %e, "Cache write failed");
        }
    }

    /// Last good reading for a station, if one is still held.
    pub async fn stale(&self, station: &str) -> Option<CanonicalReading> {
        match self.store.get(&ReadingKey::latest(station)).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(station, error = %e, "Stale lookup failed");
                None
            }
        }
    }
}

fn record_outcome(station: &str, outcome: &'static str) {
    counter!(STATION_COLLECT_TOTAL, "station" => station.to_string(), "outcome" => outcome)
        .increment(1);
}
