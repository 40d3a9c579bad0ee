//! Core type definitions for objects and the byte windows served from them.
//!
//! Everything here is request-scoped: metadata is fetched fresh for every
//! request and ranges are derived from it before any response bytes go out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// What a remote store reports about an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Total object size in bytes.
    pub size: u64,
    /// Content type as declared by the store, if any.
    pub declared_mime_type: Option<String>,
    /// Human-readable object name (usually a file name), if any.
    pub name: Option<String>,
}

impl ObjectMetadata {
    /// Metadata with only a size.
    pub fn with_size(size: u64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// An inclusive, validated byte interval `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawByteRange")]
pub struct ByteRange {
    start: u64,
    end: u64,
}

#[derive(Deserialize)]
struct RawByteRange {
    start: u64,
    end: u64,
}

impl TryFrom<RawByteRange> for ByteRange {
    type Error = Error;

    fn try_from(raw: RawByteRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl ByteRange {
    /// Build a range, rejecting `end < start`.
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end < start {
            return Err(Error::validation(format!(
                "range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// First byte offset.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset (inclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A validated range always covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The concrete `(offset, length)` actually served: how far to skip and how
/// many bytes to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferWindow {
    /// Bytes to discard before the first forwarded byte.
    pub offset: u64,
    /// Bytes to forward.
    pub length: u64,
}

impl TransferWindow {
    /// The whole object.
    pub fn full(size: u64) -> Self {
        Self {
            offset: 0,
            length: size,
        }
    }

    /// A window that forwards nothing.
    pub fn empty() -> Self {
        Self {
            offset: 0,
            length: 0,
        }
    }
}

impl From<ByteRange> for TransferWindow {
    fn from(range: ByteRange) -> Self {
        Self {
            offset: range.start(),
            length: range.len(),
        }
    }
}
