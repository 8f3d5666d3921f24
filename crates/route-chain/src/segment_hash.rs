//! Content hash identifying an immutable road segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SegmentHashError;

/// Content hash of a segment.
///
/// Hashes are opaque to this crate: any non-empty string without whitespace
/// or control characters is accepted.
///
/// # Examples
///
/// ```
/// use route_chain::SegmentHash;
///
/// let hash = SegmentHash::new("9f86d081").expect("valid hash");
/// assert_eq!(hash.as_str(), "9f86d081");
/// assert!(SegmentHash::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SegmentHash(String);

impl SegmentHash {
    /// Validate and construct a hash.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentHashError`] when the value is empty or contains
    /// whitespace or control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, SegmentHashError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(SegmentHashError::Empty);
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SegmentHashError::InvalidCharacters { value: raw });
        }
        Ok(Self(raw))
    }

    /// Borrow the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SegmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SegmentHash {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for SegmentHash {
    type Error = SegmentHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SegmentHash> for String {
    fn from(value: SegmentHash) -> Self {
        value.0
    }
}
