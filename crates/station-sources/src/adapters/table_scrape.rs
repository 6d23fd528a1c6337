use async_trait::async_trait;
use tracing::instrument;

use super::{get_text, SourceKind, StationSource};
use crate::config::TableLabels;
use crate::error::SourceResult;
use crate::raw::RawSample;
use crate::retry::RetryPolicy;

/// Scrapes a live-weather HTML table.
pub struct TableScrapeSource {
    station_id: String,
    client: reqwest::Client,
    url: String,
    labels: TableLabels,
    policy: RetryPolicy,
}

impl TableScrapeSource {
    pub fn new(
        station_id: String,
        client: reqwest::Client,
        url: String,
        labels: TableLabels,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            station_id,
            client,
            url,
            labels,
            policy,
        }
    }
}

#[async_trait]
impl StationSource for TableScrapeSource {
    fn station_id(&self) -> &str {
        &self.station_id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::TableScrape
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[instrument(skip(self), fields(station = %self.station_id))]
    async fn fetch(&self) -> SourceResult<RawSample> {
        let html = get_text(self.client.get(&self.url)).await?;
        Ok(RawSample::HtmlTable {
            html,
            labels: self.labels.clone(),
        })
    }
}
