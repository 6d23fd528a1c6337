//! Raw upstream payloads.
//!
//! A [`RawSample`] lives for exactly one parse call and is never persisted.
//! Each variant names a closed payload shape with its own parser.

use crate::config::TableLabels;

#[derive(Debug, Clone, PartialEq)]
pub enum RawSample {
    /// HTML document containing a label/value table.
    HtmlTable { html: String, labels: TableLabels },
    /// One `<epoch>:<hex>` record from the session-binary live endpoint.
    LiveText(String),
    /// Comma/newline separated `<epoch>:<hex>` records.
    HistoricalText(String),
    /// Averaged wind plus gust envelope.
    PrimaryJson(String),
    /// Current wind only envelope.
    FallbackJson(String),
    /// Public API document; `expected_station` guards against misrouted queries.
    PublicJson { body: String, expected_station: u64 },
}

impl RawSample {
    /// Label used in parse errors and logs.
    pub fn label(&self) -> &'static str {
        match self {
            RawSample::HtmlTable { .. } => "html table",
            RawSample::LiveText(_) => "live record",
            RawSample::HistoricalText(_) => "historical records",
            RawSample::PrimaryJson(_) => "primary json",
            RawSample::FallbackJson(_) => "fallback json",
            RawSample::PublicJson { .. } => "public json",
        }
    }
}
