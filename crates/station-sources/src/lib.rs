//! Upstream weather station sources.
//!
//! Provides:
//! - One adapter per upstream protocol family (HTML table scrape,
//!   session-authenticated binary telemetry, primary/fallback JSON,
//!   public JSON), all sharing a single [`RetryPolicy`]
//! - Typed parsers turning each raw payload into a [`CanonicalReading`]
//! - The packed-record bitfield decoder and historical reconciliation
//!   used for gust derivation on the session-binary source
//!
//! [`CanonicalReading`]: weather_common::CanonicalReading

pub mod adapters;
pub mod config;
pub mod error;
pub mod parsers;
pub mod raw;
pub mod reconcile;
pub mod retry;

pub use adapters::{build_source, SourceKind, StationSource};
pub use config::{FetchConfig, SourceConfig, StationConfig, TableLabels};
pub use error::{SourceError, SourceResult};
pub use parsers::bitfield::{decode_record, DecodedRecord};
pub use raw::RawSample;
pub use retry::RetryPolicy;
