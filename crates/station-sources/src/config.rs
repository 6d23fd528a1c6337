//! Station and fetch configuration as it appears in the station catalogue.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use weather_common::SpeedUnit;

use crate::retry::RetryPolicy;

/// One physical station and how to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub id: String,
    pub name: String,
    pub source: SourceConfig,
}

/// Upstream protocol family plus its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// HTML page with label/value table cells.
    TableScrape {
        url: String,
        #[serde(default)]
        labels: TableLabels,
    },

    /// Session cookie then packed hex telemetry.
    SessionBinary {
        session_url: String,
        live_url: String,
        history_url: String,
        #[serde(default = "default_session_cookie")]
        session_cookie: String,
    },

    /// Feature-rich endpoint with a minimal fallback, both POST with an auth header.
    PrimaryFallbackJson {
        primary_url: String,
        fallback_url: String,
        #[serde(default = "default_auth_header")]
        auth_header: String,
        #[serde(default)]
        token: String,
        /// Environment variable that overrides `token` when set.
        #[serde(default)]
        token_env: Option<String>,
    },

    /// Public JSON API keyed by a numeric station id.
    PublicJson { base_url: String, station: u64 },
}

fn default_session_cookie() -> String {
    "PHPSESSID".to_string()
}

fn default_auth_header() -> String {
    "wf-tkn".to_string()
}

/// Cell labels searched for on a table-scrape page (case-insensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLabels {
    pub wind_speed: String,
    pub wind_gust: Option<String>,
    pub wind_direction: String,
    pub temperature: String,
    pub pressure: String,
    /// Unit assumed when a speed cell carries none.
    pub speed_unit: SpeedUnit,
}

impl Default for TableLabels {
    fn default() -> Self {
        Self {
            wind_speed: "Wind Speed".to_string(),
            wind_gust: Some("Max Gust".to_string()),
            wind_direction: "Wind Direction".to_string(),
            temperature: "Air Temperature".to_string(),
            pressure: "Pressure".to_string(),
            speed_unit: SpeedUnit::Knots,
        }
    }
}

impl SourceConfig {
    /// Resolve the auth token, preferring the environment.
    ///
    /// Empty values count as unset, so `None` means no usable credential.
    pub fn resolved_token(&self) -> Option<String> {
        match self {
            SourceConfig::PrimaryFallbackJson {
                token, token_env, ..
            } => token_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|t| !t.trim().is_empty())
                .or_else(|| Some(token.clone()).filter(|t| !t.trim().is_empty())),
            _ => None,
        }
    }

    /// Token-authenticated source with no usable token.
    pub fn missing_credentials(&self) -> bool {
        matches!(self, SourceConfig::PrimaryFallbackJson { .. }) && self.resolved_token().is_none()
    }
}

/// Network behaviour shared by all adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub attempt_timeout_ms: u64,
    /// Wait after establishing a session before using it.
    pub session_wait_ms: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2000,
            backoff_multiplier: 1.5,
            attempt_timeout_ms: 10_000,
            session_wait_ms: 500,
            user_agent: "station-weather/0.1".to_string(),
        }
    }
}

impl FetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            multiplier: self.backoff_multiplier,
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
        }
    }

    pub fn session_wait(&self) -> Duration {
        Duration::from_millis(self.session_wait_ms)
    }

    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(Duration::from_millis(self.attempt_timeout_ms))
            .pool_max_idle_per_host(4)
            .build()
    }
}
