use async_trait::async_trait;
use tracing::instrument;

use super::{get_text, SourceKind, StationSource};
use crate::error::SourceResult;
use crate::raw::RawSample;
use crate::retry::RetryPolicy;

/// Public wind network API, one GET per station.
pub struct PublicJsonSource {
    station_id: String,
    client: reqwest::Client,
    url: String,
    numeric_id: u64,
    policy: RetryPolicy,
}

impl PublicJsonSource {
    pub fn new(
        station_id: String,
        client: reqwest::Client,
        base_url: &str,
        numeric_id: u64,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            station_id,
            client,
            url: format!("{}/{}", base_url.trim_end_matches('/'), numeric_id),
            numeric_id,
            policy,
        }
    }
}

#[async_trait]
impl StationSource for PublicJsonSource {
    fn station_id(&self) -> &str {
        &self.station_id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PublicJson
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[instrument(skip(self), fields(station = %self.station_id, upstream_id = self.numeric_id))]
    async fn fetch(&self) -> SourceResult<RawSample> {
        let body = get_text(self.client.get(&self.url)).await?;
        Ok(RawSample::PublicJson {
            body,
            expected_station: self.numeric_id,
        })
    }
}
