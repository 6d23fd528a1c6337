use async_trait::async_trait;
use tracing::{instrument, warn};

use super::{get_text, SourceKind, StationSource};
use crate::error::{SourceError, SourceResult};
use crate::parsers::json::parse_primary;
use crate::raw::RawSample;
use crate::retry::RetryPolicy;

/// Token-authenticated JSON API with a feature-rich primary endpoint and a
/// current-value fallback.
///
/// Both endpoints take a POST with an empty body. The fallback is used when
/// the primary answers with an error status or with a payload of the wrong
/// shape. Connection failures and timeouts are left to the retry policy.
pub struct PrimaryFallbackSource {
    pub(super) station_id: String,
    pub(super) client: reqwest::Client,
    pub(super) primary_url: String,
    pub(super) fallback_url: String,
    pub(super) auth_header: String,
    /// Sent as `auth_header`; the header is omitted when there is none.
    pub(super) token: Option<String>,
    pub(super) policy: RetryPolicy,
}

impl PrimaryFallbackSource {
    async fn post(&self, url: &str) -> SourceResult<String> {
        let mut request = self.client.post(url).body("");
        if let Some(token) = &self.token {
            request = request.header(self.auth_header.as_str(), token.as_str());
        }
        get_text(request).await
    }
}

#[async_trait]
impl StationSource for PrimaryFallbackSource {
    fn station_id(&self) -> &str {
        &self.station_id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PrimaryFallbackJson
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[instrument(skip(self), fields(station = %self.station_id))]
    async fn fetch(&self) -> SourceResult<RawSample> {
        let reason = match self.post(&self.primary_url).await {
            Ok(body) => match parse_primary(&body) {
                Ok(_) => return Ok(RawSample::PrimaryJson(body)),
                Err(err) => err,
            },
            Err(err @ SourceError::HttpStatus { .. }) => err,
            Err(err) => return Err(err),
        };

        warn!(
            station = %self.station_id,
            error = %reason,
            "Primary endpoint unusable, trying fallback"
        );
        let body = self.post(&self.fallback_url).await?;
        Ok(RawSample::FallbackJson(body))
    }
}
