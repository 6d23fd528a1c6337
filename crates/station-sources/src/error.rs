//! Error types for upstream fetches and payload parsing.

use std::time::Duration;

use thiserror::Error;

/// Raw payload excerpts attached to errors are capped at this many bytes.
pub const EXCERPT_BYTES: usize = 128;

pub type SourceResult<T> = Result<T, SourceError>;

/// Expected failure modes of an adapter or parser.
///
/// Out-of-range values are not errors: parsers set the field to `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Connection refused, reset, DNS failure, body read failure.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {status}")]
    HttpStatus { status: u16 },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Session could not be established; the binary source cannot proceed.
    #[error("Session error: {0}")]
    Session(String),

    /// Payload is well-formed but not the shape we expect.
    #[error("Unexpected {label} payload: {excerpt}")]
    Schema { label: String, excerpt: String },

    /// Payload could not be read at all.
    #[error("Failed to parse {label}: {reason} (raw: {excerpt})")]
    Parse {
        label: String,
        reason: String,
        excerpt: String,
    },
}

impl SourceError {
    pub fn parse(label: &str, reason: impl Into<String>, raw: &str) -> Self {
        SourceError::Parse {
            label: label.to_string(),
            reason: reason.into(),
            excerpt: excerpt(raw),
        }
    }

    pub fn schema(label: &str, raw: &str) -> Self {
        SourceError::Schema {
            label: label.to_string(),
            excerpt: excerpt(raw),
        }
    }

    /// Short name used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Transport(_) => "transport",
            SourceError::HttpStatus { .. } => "http_status",
            SourceError::Timeout(_) => "timeout",
            SourceError::Session(_) => "session",
            SourceError::Schema { .. } => "schema",
            SourceError::Parse { .. } => "parse",
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return SourceError::HttpStatus {
                status: status.as_u16(),
            };
        }
        SourceError::Transport(err.to_string())
    }
}

/// First [`EXCERPT_BYTES`] bytes of `raw`, cut on a char boundary.
pub fn excerpt(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() <= EXCERPT_BYTES {
        return raw.to_string();
    }
    let mut end = EXCERPT_BYTES;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &raw[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_is_untouched() {
        assert_eq!(excerpt("  abc  "), "abc");
    }

    #[test]
    fn test_excerpt_is_byte_limited() {
        let raw = "x".repeat(1000);
        let e = excerpt(&raw);
        assert!(e.len() <= EXCERPT_BYTES + '…'.len_utf8());
        assert!(e.ends_with('…'));
    }

    #[test]
    fn test_excerpt_respects_char_boundary() {
        // 'é' is two bytes; 127 ASCII bytes puts the boundary mid-char
        let raw = format!("{}{}", "a".repeat(127), "é".repeat(10));
        let e = excerpt(&raw);
        assert!(e.starts_with(&"a".repeat(127)));
    }

    #[test]
    fn test_parse_error_carries_label() {
        let err = SourceError::parse("live record", "not hex", "zzz");
        assert_eq!(
            err.to_string(),
            "Failed to parse live record: not hex (raw: zzz)"
        );
        assert_eq!(err.kind(), "parse");
    }
}
