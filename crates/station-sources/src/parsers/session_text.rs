//! Text framings of the session-binary source.
//!
//! Live: `<unix seconds>:<hex>[:...]`, or a bare `<hex>`.
//! Historical: `<unix seconds>:<hex>` pairs separated by commas or newlines.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::bitfield::{decode_record, DecodedRecord};
use crate::error::{SourceError, SourceResult};

/// One decoded instantaneous record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveTextShape {
    /// `None` when the upstream sent a bare record.
    pub timestamp: Option<DateTime<Utc>>,
    pub record: DecodedRecord,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalSample {
    pub timestamp: DateTime<Utc>,
    pub record: DecodedRecord,
}

/// Every entry of a historical window that decoded cleanly, in payload order.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalTextShape {
    pub samples: Vec<HistoricalSample>,
    /// Entries dropped because they did not parse.
    pub discarded: usize,
}

fn parse_epoch(field: &str) -> Option<DateTime<Utc>> {
    let secs = field.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}

pub fn parse_live(body: &str) -> SourceResult<LiveTextShape> {
    const LABEL: &str = "live record";

    let body = body.trim();
    if body.is_empty() {
        return Err(SourceError::parse(LABEL, "empty body", body));
    }

    let mut fields = body.split(':');
    let first = fields.next().unwrap_or_default();
    match fields.next() {
        None => Ok(LiveTextShape {
            timestamp: None,
            record: decode_record(first)?,
        }),
        Some(hex) => {
            let timestamp = parse_epoch(first)
                .ok_or_else(|| SourceError::parse(LABEL, "bad timestamp", body))?;
            Ok(LiveTextShape {
                timestamp: Some(timestamp),
                record: decode_record(hex)?,
            })
        }
    }
}

/// Parse a historical window, skipping entries that do not decode.
///
/// A window where nothing decodes is an error.
pub fn parse_historical(body: &str) -> SourceResult<HistoricalTextShape> {
    const LABEL: &str = "historical records";

    let mut samples = Vec::new();
    let mut discarded = 0;

    for entry in body
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|e| !e.is_empty())
    {
        let parsed = entry.split_once(':').and_then(|(ts, hex)| {
            let timestamp = parse_epoch(ts)?;
            let record = decode_record(hex).ok()?;
            Some(HistoricalSample { timestamp, record })
        });
        match parsed {
            Some(sample) => samples.push(sample),
            None => {
                debug!(entry, "Discarding unparseable historical entry");
                discarded += 1;
            }
        }
    }

    if samples.is_empty() {
        return Err(SourceError::parse(LABEL, "no decodable samples", body));
    }

    Ok(HistoricalTextShape { samples, discarded })
}
