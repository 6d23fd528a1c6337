//! Upstream adapters, one per protocol family.
//!
//! An adapter's [`StationSource::fetch`] is a single network exchange that
//! yields a [`RawSample`]. [`StationSource::read`] runs fetch and parse
//! together under the station's [`RetryPolicy`], so a malformed payload is
//! retried just like a dropped connection.

mod primary_fallback;
mod public_json;
mod session_binary;
mod table_scrape;

pub use primary_fallback::PrimaryFallbackSource;
pub use public_json::PublicJsonSource;
pub use session_binary::{SessionBinarySource, SessionContext};
pub use table_scrape::TableScrapeSource;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;
use weather_common::CanonicalReading;

use crate::config::{FetchConfig, SourceConfig, StationConfig};
use crate::error::SourceResult;
use crate::parsers;
use crate::raw::RawSample;
use crate::retry::RetryPolicy;

/// Protocol family of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    TableScrape,
    SessionBinary,
    PrimaryFallbackJson,
    PublicJson,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::TableScrape => "table_scrape",
            SourceKind::SessionBinary => "session_binary",
            SourceKind::PrimaryFallbackJson => "primary_fallback_json",
            SourceKind::PublicJson => "public_json",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait StationSource: Send + Sync {
    fn station_id(&self) -> &str;

    fn kind(&self) -> SourceKind;

    fn retry_policy(&self) -> &RetryPolicy;

    /// One attempt at retrieving the raw payload.
    async fn fetch(&self) -> SourceResult<RawSample>;

    /// Fetch and parse with retries, stamping timestamp-less payloads with `now`.
    async fn read(&self, now: DateTime<Utc>) -> SourceResult<CanonicalReading> {
        let station = self.station_id();
        self.retry_policy()
            .run(station, |_| async move {
                let raw = self.fetch().await?;
                parsers::parse(&raw, station, now)
            })
            .await
    }
}

/// Build the adapter for one configured station.
pub fn build_source(
    station: &StationConfig,
    fetch: &FetchConfig,
    client: reqwest::Client,
) -> Arc<dyn StationSource> {
    let policy = fetch.retry_policy();
    let id = station.id.clone();

    match &station.source {
        SourceConfig::TableScrape { url, labels } => Arc::new(TableScrapeSource::new(
            id,
            client,
            url.clone(),
            labels.clone(),
            policy,
        )),
        SourceConfig::SessionBinary {
            session_url,
            live_url,
            history_url,
            session_cookie,
        } => Arc::new(SessionBinarySource {
            station_id: id,
            client,
            session_url: session_url.clone(),
            live_url: live_url.clone(),
            history_url: history_url.clone(),
            cookie_name: session_cookie.clone(),
            session_wait: fetch.session_wait(),
            policy,
        }),
        SourceConfig::PrimaryFallbackJson {
            primary_url,
            fallback_url,
            auth_header,
            ..
        } => {
            let token = station.source.resolved_token();
            if token.is_none() {
                warn!(
                    station = %id,
                    header = %auth_header,
                    "No auth token configured, requests will be sent without one"
                );
            }
            Arc::new(PrimaryFallbackSource {
                station_id: id,
                client,
                primary_url: primary_url.clone(),
                fallback_url: fallback_url.clone(),
                auth_header: auth_header.clone(),
                token,
                policy,
            })
        }
        SourceConfig::PublicJson { base_url, station: numeric_id } => Arc::new(
            PublicJsonSource::new(id, client, base_url, *numeric_id, policy),
        ),
    }
}

/// Send `request` and return the body of a 2xx response.
pub(crate) async fn get_text(request: reqwest::RequestBuilder) -> SourceResult<String> {
    let response = request.send().await?.error_for_status()?;
    Ok(response.text().await?)
}
