//! `Range` header parsing and validation.
//!
//! Only a single `bytes=<start>-<end>` range is honoured, where either side
//! may be empty. Anything else that arrives in a `Range` header is logged and
//! answered with the whole object, so a confused client still plays.

use axum::http::{HeaderValue, StatusCode};
use rangegate_common::{ByteRange, TransferWindow};
use thiserror::Error;

/// A syntactically valid single byte range, not yet checked against a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    /// `None` for an open-ended `bytes=<start>-`.
    pub end: Option<u64>,
}

/// Why a `Range` header was ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRange {
    #[error("header value is not visible ASCII")]
    NotAscii,

    #[error("unit is not 'bytes'")]
    UnsupportedUnit,

    #[error("multiple ranges are not supported")]
    MultipleRanges,

    #[error("suffix ranges are not supported")]
    SuffixRange,

    #[error("missing '-' separator")]
    MissingSeparator,

    #[error("range has neither start nor end")]
    Empty,

    #[error("invalid position '{0}'")]
    InvalidNumber(String),
}

/// What to serve for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDecision {
    /// The whole object with status 200.
    Full { size: u64 },
    /// One validated range with status 206.
    Partial { range: ByteRange, size: u64 },
    /// Status 416 with `Content-Range: bytes */size`.
    Unsatisfiable { size: u64 },
}

impl RangeDecision {
    pub fn status(&self) -> StatusCode {
        match self {
            RangeDecision::Full { .. } => StatusCode::OK,
            RangeDecision::Partial { .. } => StatusCode::PARTIAL_CONTENT,
            RangeDecision::Unsatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    /// Object size the decision was made against.
    pub fn size(&self) -> u64 {
        match *self {
            RangeDecision::Full { size }
            | RangeDecision::Partial { size, .. }
            | RangeDecision::Unsatisfiable { size } => size,
        }
    }

    /// Bytes to skip and copy. Empty for a 416.
    pub fn window(&self) -> TransferWindow {
        match *self {
            RangeDecision::Full { size } => TransferWindow::full(size),
            RangeDecision::Partial { range, .. } => TransferWindow::from(range),
            RangeDecision::Unsatisfiable { .. } => TransferWindow::empty(),
        }
    }

    /// `Content-Range` value, present for 206 and 416.
    pub fn content_range(&self) -> Option<String> {
        match *self {
            RangeDecision::Full { .. } => None,
            RangeDecision::Partial { range, size } => {
                Some(format!("bytes {}-{}/{}", range.start(), range.end(), size))
            }
            RangeDecision::Unsatisfiable { size } => Some(format!("bytes */{}", size)),
        }
    }
}

/// Parse a `Range` header value into a single [`RangeSpec`].
pub fn parse_range_header(value: &str) -> Result<RangeSpec, MalformedRange> {
    let value = value.trim();
    let spec = match value.get(..6) {
        Some(unit) if unit.eq_ignore_ascii_case("bytes=") => &value[6..],
        _ => return Err(MalformedRange::UnsupportedUnit),
    };
    if spec.contains(',') {
        return Err(MalformedRange::MultipleRanges);
    }

    let (start, end) = spec
        .split_once('-')
        .ok_or(MalformedRange::MissingSeparator)?;
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        (true, true) => Err(MalformedRange::Empty),
        (true, false) => Err(MalformedRange::SuffixRange),
        (false, open_ended) => {
            let start = parse_position(start)?;
            let end = if open_ended {
                None
            } else {
                Some(parse_position(end)?)
            };
            Ok(RangeSpec { start, end })
        }
    }
}

/// Digits only: `u64::from_str` would also take a leading `+`.
fn parse_position(raw: &str) -> Result<u64, MalformedRange> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedRange::InvalidNumber(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| MalformedRange::InvalidNumber(raw.to_string()))
}

/// Check a parsed range against the object size.
pub fn resolve(spec: RangeSpec, size: u64) -> RangeDecision {
    if size == 0 || spec.start >= size {
        return RangeDecision::Unsatisfiable { size };
    }
    let last = size - 1;
    let end = spec.end.map_or(last, |end| end.min(last));
    match ByteRange::new(spec.start, end) {
        Ok(range) => RangeDecision::Partial { range, size },
        Err(_) => RangeDecision::Unsatisfiable { size },
    }
}

/// Decide what to serve for an optional `Range` header and an object size.
///
/// Malformed headers are logged and fall back to [`RangeDecision::Full`].
pub fn evaluate(header: Option<&HeaderValue>, size: u64) -> RangeDecision {
    let Some(value) = header else {
        return RangeDecision::Full { size };
    };

    let parsed = value
        .to_str()
        .map_err(|_| MalformedRange::NotAscii)
        .and_then(parse_range_header);

    match parsed {
        Ok(spec) => resolve(spec, size),
        Err(reason) => {
            tracing::warn!(
                range = ?value,
                %reason,
                "Ignoring malformed Range header, serving full object"
            );
            RangeDecision::Full { size }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(header: &str, size: u64) -> RangeDecision {
        evaluate(Some(&HeaderValue::from_str(header).unwrap()), size)
    }

    fn partial(start: u64, end: u64, size: u64) -> RangeDecision {
        RangeDecision::Partial {
            range: ByteRange::new(start, end).unwrap(),
            size,
        }
    }

    #[test]
    fn test_absent_header_is_full() {
        let d = evaluate(None, 1000);
        assert_eq!(d, RangeDecision::Full { size: 1000 });
        assert_eq!(d.status(), StatusCode::OK);
        assert_eq!(d.window(), TransferWindow::full(1000));
        assert_eq!(d.content_range(), None);
    }

    #[test]
    fn test_closed_range() {
        let d = decide("bytes=100-199", 1000);
        assert_eq!(d, partial(100, 199, 1000));
        assert_eq!(
            d.window(),
            TransferWindow {
                offset: 100,
                length: 100
            }
        );
        assert_eq!(d.content_range().as_deref(), Some("bytes 100-199/1000"));
    }

    #[test]
    fn test_open_ended_range() {
        let d = decide("bytes=500-", 1000);
        assert_eq!(d, partial(500, 999, 1000));
        assert_eq!(d.window().length, 500);
    }

    #[test]
    fn test_end_is_clamped() {
        let d = decide("bytes=0-1999", 500);
        assert_eq!(d, partial(0, 499, 500));
        assert_eq!(d.content_range().as_deref(), Some("bytes 0-499/500"));
    }

    #[test]
    fn test_single_byte_ranges() {
        assert_eq!(decide("bytes=0-0", 10), partial(0, 0, 10));
        assert_eq!(decide("bytes=9-9", 10), partial(9, 9, 10));
        assert_eq!(decide("bytes=9-", 10), partial(9, 9, 10));
    }

    #[test]
    fn test_start_past_end_is_unsatisfiable() {
        let d = decide("bytes=2000-3000", 1000);
        assert_eq!(d, RangeDecision::Unsatisfiable { size: 1000 });
        assert_eq!(d.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(d.content_range().as_deref(), Some("bytes */1000"));
        assert_eq!(d.window().length, 0);

        assert_eq!(
            decide("bytes=1000-", 1000),
            RangeDecision::Unsatisfiable { size: 1000 }
        );
    }

    #[test]
    fn test_end_before_start_is_unsatisfiable() {
        assert_eq!(
            decide("bytes=500-100", 1000),
            RangeDecision::Unsatisfiable { size: 1000 }
        );
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(evaluate(None, 0), RangeDecision::Full { size: 0 });
        assert_eq!(
            decide("bytes=0-", 0),
            RangeDecision::Unsatisfiable { size: 0 }
        );
        assert_eq!(decide("bytes=-5", 0), RangeDecision::Full { size: 0 });
    }

    #[test]
    fn test_malformed_falls_back_to_full() {
        for header in [
            "bytes=-500",
            "bytes=abc-def",
            "bytes=10-x",
            "bytes=-",
            "bytes=100",
            "bytes=0-1,5-9",
            "items=0-10",
            "bytes=+5-10",
            "bytes=99999999999999999999999-",
            "",
        ] {
            assert_eq!(
                decide(header, 1000),
                RangeDecision::Full { size: 1000 },
                "header {header:?}"
            );
        }
    }

    #[test]
    fn test_non_ascii_header_is_malformed() {
        let value = HeaderValue::from_bytes(b"bytes=0-\xff").unwrap();
        assert_eq!(
            evaluate(Some(&value), 10),
            RangeDecision::Full { size: 10 }
        );
    }

    #[test]
    fn test_parse_tolerates_case_and_whitespace() {
        assert_eq!(
            parse_range_header("  Bytes= 5 - 9 "),
            Ok(RangeSpec {
                start: 5,
                end: Some(9)
            })
        );
        assert_eq!(
            parse_range_header("BYTES=7-"),
            Ok(RangeSpec {
                start: 7,
                end: None
            })
        );
    }

    #[test]
    fn test_parse_reports_reason() {
        assert_eq!(
            parse_range_header("bytes=-10"),
            Err(MalformedRange::SuffixRange)
        );
        assert_eq!(
            parse_range_header("bytes=1-2,3-4"),
            Err(MalformedRange::MultipleRanges)
        );
        assert_eq!(
            parse_range_header("pages=1-2"),
            Err(MalformedRange::UnsupportedUnit)
        );
        assert_eq!(
            parse_range_header("bytes=12"),
            Err(MalformedRange::MissingSeparator)
        );
        assert_eq!(parse_range_header("bytes=-"), Err(MalformedRange::Empty));
        assert!(matches!(
            parse_range_header("bytes=1x-2"),
            Err(MalformedRange::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_huge_end_clamps() {
        assert_eq!(
            decide(&format!("bytes=0-{}", u64::MAX), 42),
            partial(0, 41, 42)
        );
    }
}
