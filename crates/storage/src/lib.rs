//! Reading cache stores for the station-weather services.
//!
//! Provides:
//! - [`ReadingStore`], the `get`/`put` contract the collector writes through
//! - [`ReadingKey`], bucketed and per-station `latest` keys
//! - [`MemoryReadingCache`], an in-process LRU with lazy TTL expiry
//! - [`RedisReadingCache`], a shared Redis store for multi-instance deployments

pub mod key;
pub mod memory_cache;
pub mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use weather_common::{CanonicalReading, WeatherResult};

pub use key::ReadingKey;
pub use memory_cache::{CacheStatsSnapshot, MemoryReadingCache};
pub use redis_cache::RedisReadingCache;

/// Key/value store for canonical readings.
///
/// Puts are atomic per key and last-writer-wins. Entries disappear when their
/// TTL runs out; there is no delete.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn get(&self, key: &ReadingKey) -> WeatherResult<Option<CanonicalReading>>;

    async fn put(
        &self,
        key: &ReadingKey,
        reading: &CanonicalReading,
        ttl: Duration,
    ) -> WeatherResult<()>;

    /// Backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    /// Hit/miss counters, where the backend keeps them.
    fn stats(&self) -> Option<CacheStatsSnapshot> {
        None
    }
}
