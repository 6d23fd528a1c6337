//! Packed telemetry record decoder for the session-binary source.
//!
//! A record is a hex string of 9 to 16 digits. The last 8 digits form the
//! low word, anything before them the high word.
//!
//! ```text
//! high word  bits 0-10   temperature code, (code - 400) / 10 = °C
//! low word   bits 16-31  speed, decimeters per second
//! low word   bits 7-15   direction, degrees
//! ```

use crate::error::{SourceError, SourceResult};

/// Knots in one meter per second, as used by the station firmware.
pub const KNOTS_PER_MPS: f64 = 1.94384449;

const LABEL: &str = "binary record";
const LSB_DIGITS: usize = 8;
const MAX_DIGITS: usize = 16;

const TEMPERATURE_MASK: u32 = 0x7FF;
const SPEED_SHIFT: u32 = 16;
const SPEED_MASK: u32 = 0xFFFF;
const DIRECTION_SHIFT: u32 = 7;
const DIRECTION_MASK: u32 = 0x1FF;
const TEMPERATURE_OFFSET: i32 = 400;

/// Every intermediate of a decode, kept for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedRecord {
    pub msb: u32,
    pub lsb: u32,
    pub temperature_raw: u32,
    pub speed_raw: u32,
    pub direction_raw: u32,
    pub speed_ms: f64,
    pub speed_knots: f64,
    pub temperature_c: f64,
    pub direction_deg: u32,
}

/// Decode one hex record.
pub fn decode_record(hex: &str) -> SourceResult<DecodedRecord> {
    let hex = hex.trim();
    if hex.len() <= LSB_DIGITS {
        return Err(SourceError::parse(LABEL, "record too short", hex));
    }
    if hex.len() > MAX_DIGITS {
        return Err(SourceError::parse(LABEL, "record too long", hex));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SourceError::parse(LABEL, "not hexadecimal", hex));
    }

    let split = hex.len() - LSB_DIGITS;
    let msb = u32::from_str_radix(&hex[..split], 16)
        .map_err(|e| SourceError::parse(LABEL, e.to_string(), hex))?;
    let lsb = u32::from_str_radix(&hex[split..], 16)
        .map_err(|e| SourceError::parse(LABEL, e.to_string(), hex))?;

    let temperature_raw = msb & TEMPERATURE_MASK;
    let speed_raw = (lsb >> SPEED_SHIFT) & SPEED_MASK;
    let direction_raw = (lsb >> DIRECTION_SHIFT) & DIRECTION_MASK;

    let speed_ms = speed_raw as f64 / 10.0;

    Ok(DecodedRecord {
        msb,
        lsb,
        temperature_raw,
        speed_raw,
        direction_raw,
        speed_ms,
        speed_knots: speed_ms * KNOTS_PER_MPS,
        temperature_c: (temperature_raw as i32 - TEMPERATURE_OFFSET) as f64 / 10.0,
        direction_deg: direction_raw,
    })
}
