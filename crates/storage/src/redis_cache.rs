//! Redis-backed reading store shared between service instances.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::debug;
use weather_common::{CanonicalReading, WeatherError, WeatherResult};

use crate::{ReadingKey, ReadingStore};

/// Readings stored as JSON strings with `SETEX`.
pub struct RedisReadingCache {
    conn: MultiplexedConnection,
}

impl RedisReadingCache {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> WeatherResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| WeatherError::CacheError(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| WeatherError::CacheError(format!("Redis connection failed: {}", e)))?;

        Ok(Self { conn })
    }

    /// Round-trip a PING.
    pub async fn ping(&self) -> WeatherResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| WeatherError::CacheError(format!("Ping failed: {}", e)))?;
        Ok(())
    }
}

/// Redis rejects `SETEX` with 0, and sub-second TTLs round down to it.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl ReadingStore for RedisReadingCache {
    async fn get(&self, key: &ReadingKey) -> WeatherResult<Option<CanonicalReading>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(key.to_string())
            .await
            .map_err(|e| WeatherError::CacheError(format!("Cache get failed: {}", e)))?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &ReadingKey,
        reading: &CanonicalReading,
        ttl: Duration,
    ) -> WeatherResult<()> {
        let json = serde_json::to_string(reading)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key.to_string(), json, ttl_secs(ttl))
            .await
            .map_err(|e| WeatherError::CacheError(format!("Cache set failed: {}", e)))?;
        debug!(key = %key, ttl_secs = ttl_secs(ttl), "Stored reading");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
