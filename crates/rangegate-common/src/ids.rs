//! Typed identifier for remote objects.
//!
//! Remote stores name objects with opaque strings (Drive file IDs, file names,
//! keys). [`ObjectId`] wraps such a handle so it cannot be confused with other
//! strings and so obviously unusable handles are rejected up front.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Longest identifier accepted, in bytes.
pub const MAX_OBJECT_ID_LEN: usize = 512;

/// Opaque handle naming an object in a remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangegate_common::ObjectId;
    ///
    /// assert!(ObjectId::new("1AbC_def-9").is_ok());
    /// assert!(ObjectId::new("").is_err());
    /// assert!(ObjectId::new("bad\nid").is_err());
    /// assert!(ObjectId::new("..").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(Error::validation("object id is empty"));
        }
        if raw.len() > MAX_OBJECT_ID_LEN {
            return Err(Error::validation(format!(
                "object id exceeds {MAX_OBJECT_ID_LEN} bytes"
            )));
        }
        if raw.chars().any(char::is_control) {
            return Err(Error::validation("object id contains control characters"));
        }
        // URL path segments drop these when joined.
        if raw == "." || raw == ".." {
            return Err(Error::validation(format!("object id '{raw}' is reserved")));
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
