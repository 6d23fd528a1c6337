//! Session-authenticated packed telemetry.
//!
//! The upstream only serves data to a browser-like session: a GET on the
//! viewer page sets a session cookie, and the cookie must accompany the data
//! requests. The cookie lives in a [`SessionContext`] created per read and
//! passed explicitly to each data call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{COOKIE, SET_COOKIE};
use tracing::{debug, instrument};
use weather_common::CanonicalReading;

use super::{get_text, SourceKind, StationSource};
use crate::error::{SourceError, SourceResult};
use crate::parsers::session_text::{parse_historical, parse_live};
use crate::raw::RawSample;
use crate::reconcile::reconcile;
use crate::retry::RetryPolicy;

/// An established upstream session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub cookie_name: String,
    pub token: String,
}

impl SessionContext {
    pub fn cookie_header(&self) -> String {
        format!("{}={}", self.cookie_name, self.token)
    }

    /// Pick the named cookie out of a set of `Set-Cookie` header values.
    pub fn from_set_cookie<'a>(
        cookie_name: &str,
        headers: impl IntoIterator<Item = &'a str>,
    ) -> Option<Self> {
        headers.into_iter().find_map(|header| {
            let pair = header.split(';').next()?.trim();
            let (name, value) = pair.split_once('=')?;
            (name.trim() == cookie_name && !value.trim().is_empty()).then(|| SessionContext {
                cookie_name: cookie_name.to_string(),
                token: value.trim().to_string(),
            })
        })
    }
}

pub struct SessionBinarySource {
    pub(super) station_id: String,
    pub(super) client: reqwest::Client,
    pub(super) session_url: String,
    pub(super) live_url: String,
    pub(super) history_url: String,
    pub(super) cookie_name: String,
    /// Time the upstream needs before a fresh session is usable.
    pub(super) session_wait: Duration,
    pub(super) policy: RetryPolicy,
}

impl SessionBinarySource {
    /// GET the session page and extract the session cookie.
    #[instrument(skip(self), fields(station = %self.station_id))]
    pub async fn establish_session(&self) -> SourceResult<SessionContext> {
        let response = self
            .client
            .get(&self.session_url)
            .send()
            .await
            .map_err(|e| SourceError::Session(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Session(format!(
                "session page returned {}",
                response.status()
            )));
        }

        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok());

        let session = SessionContext::from_set_cookie(&self.cookie_name, cookies).ok_or_else(|| {
            SourceError::Session(format!("no {} cookie in response", self.cookie_name))
        })?;
        debug!(cookie = %self.cookie_name, "Session established");
        Ok(session)
    }

    async fn get_with_session(&self, url: &str, session: &SessionContext) -> SourceResult<String> {
        get_text(
            self.client
                .get(url)
                .header(COOKIE, session.cookie_header()),
        )
        .await
    }

    /// Single live record body, fetched with an existing session.
    async fn fetch_live(&self, session: &SessionContext) -> SourceResult<String> {
        self.get_with_session(&self.live_url, session).await
    }

    /// Trailing historical window body, fetched with an existing session.
    async fn fetch_historical(&self, session: &SessionContext) -> SourceResult<String> {
        self.get_with_session(&self.history_url, session).await
    }

    async fn session(&self) -> SourceResult<SessionContext> {
        let label = format!("{}:session", self.station_id);
        let session = self
            .policy
            .run(&label, |_| self.establish_session())
            .await?;
        if !self.session_wait.is_zero() {
            tokio::time::sleep(self.session_wait).await;
        }
        Ok(session)
    }
}

#[async_trait]
impl StationSource for SessionBinarySource {
    fn station_id(&self) -> &str {
        &self.station_id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::SessionBinary
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Live mode: new session, then one live record.
    async fn fetch(&self) -> SourceResult<RawSample> {
        let session = self.establish_session().await?;
        if !self.session_wait.is_zero() {
            tokio::time::sleep(self.session_wait).await;
        }
        Ok(RawSample::LiveText(self.fetch_live(&session).await?))
    }

    /// Historical wind statistics with live temperature.
    ///
    /// Session failure fails the read. The historical and live requests share
    /// the session and run concurrently, each with its own retries.
    #[instrument(skip(self), fields(station = %self.station_id))]
    async fn read(&self, now: DateTime<Utc>) -> SourceResult<CanonicalReading> {
        let session = self.session().await?;
        let session = &session;

        let history_label = format!("{}:history", self.station_id);
        let live_label = format!("{}:live", self.station_id);

        let (history, live) = tokio::join!(
            self.policy.run(&history_label, |_| async move {
                parse_historical(&self.fetch_historical(session).await?)
            }),
            self.policy.run(&live_label, |_| async move {
                parse_live(&self.fetch_live(session).await?)
            }),
        );

        let started = Instant::now();
        let sample = reconcile(history, Some(live))?;
        Ok(sample
            .into_reading(&self.station_id, now)
            .with_parse_latency(started.elapsed().as_millis() as u64))
    }
}
