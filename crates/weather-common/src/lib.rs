//! Common types and utilities shared across all station-weather crates.
//!
//! Everything in here is pure: no I/O, no async. The cache always holds
//! SI-unit [`CanonicalReading`]s; regional units only appear in [`display`].

pub mod display;
pub mod document;
pub mod error;
pub mod reading;
pub mod region;
pub mod time;
pub mod units;

pub use display::{format_reading, format_reading_titled, format_region};
pub use document::{ReadingDocument, RegionDocument, READING_SCHEMA, REGION_SCHEMA};
pub use error::{WeatherError, WeatherResult};
pub use reading::{CanonicalReading, Measurements};
pub use region::{DisplayUnit, RegionConfig, RegionResponse, SlotOutcome, StationSlot, REGION_STATION_COUNT};
pub use time::{parse_timestamp, TimeBucket, DEFAULT_BUCKET_SECS};
pub use units::SpeedUnit;
