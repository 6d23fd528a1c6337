//! In-process LRU reading cache.
//!
//! Bounded by entry count. Expiry is lazy: an expired entry is dropped when
//! it is next read. Counters are atomics so the health endpoint can read
//! them without taking the lock.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use weather_common::{CanonicalReading, WeatherResult};

use crate::{ReadingKey, ReadingStore};

/// Default number of readings kept.
pub const DEFAULT_CAPACITY: usize = 4096;

struct CachedReading {
    reading: CanonicalReading,
    inserted_at: Instant,
    ttl: Duration,
}

impl CachedReading {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    evictions: AtomicU64,
    entry_count: AtomicU64,
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub evictions: u64,
    pub entries: u64,
}

impl CacheStatsSnapshot {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

pub struct MemoryReadingCache {
    cache: RwLock<LruCache<String, CachedReading>>,
    counters: CacheCounters,
}

impl MemoryReadingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            counters: CacheCounters::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.counters.entry_count.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            entries: self.counters.entry_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for MemoryReadingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingCache {
    async fn get(&self, key: &ReadingKey) -> WeatherResult<Option<CanonicalReading>> {
        let key = key.to_string();
        // LRU reads reorder entries, so even a lookup needs the write lock
        let mut cache = self.cache.write().await;

        let hit = match cache.get(&key) {
            Some(entry) if entry.is_expired() => None,
            Some(entry) => Some(entry.reading.clone()),
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
        };

        match hit {
            Some(reading) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(reading))
            }
            None => {
                cache.pop(&key);
                self.counters.expired.fetch_add(1, Ordering::Relaxed);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .entry_count
                    .store(cache.len() as u64, Ordering::Relaxed);
                debug!(key = %key, "Dropped expired reading");
                Ok(None)
            }
        }
    }

    async fn put(
        &self,
        key: &ReadingKey,
        reading: &CanonicalReading,
        ttl: Duration,
    ) -> WeatherResult<()> {
        let entry = CachedReading {
            reading: reading.clone(),
            inserted_at: Instant::now(),
            ttl,
        };

        let mut cache = self.cache.write().await;
        let key = key.to_string();

        // push hands back the displaced entry: our own key or the LRU victim
        if let Some((displaced, _)) = cache.push(key.clone(), entry) {
            if displaced != key {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %displaced, "Evicted least recently used reading");
            }
        }
        self.counters
            .entry_count
            .store(cache.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    fn stats(&self) -> Option<CacheStatsSnapshot> {
        Some(self.snapshot())
    }
}
