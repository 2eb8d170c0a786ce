//! Station identifiers and admin records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Reasons a string is not a usable station identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationIdError {
    /// The value is empty after trimming.
    #[error("station ID is empty")]
    Empty,
    /// The value cannot be used as a lock filename.
    #[error("station ID '{0}' is not a plain filename")]
    NotPlainName(String),
}

impl From<StationIdError> for AppError {
    fn from(err: StationIdError) -> Self {
        AppError::with_source(
            crate::error::ErrorKind::Validation,
            err.to_string(),
            err,
        )
    }
}

/// Identifier of a workstation; also the filename of its lock.
///
/// Construction only rejects values that could escape the lock directory.
/// Whether an ID has the canonical numeric shape is a separate question
/// answered by [`StationId::is_canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier.
    pub fn parse(value: &str) -> Result<Self, StationIdError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(StationIdError::Empty);
        }
        if !super::is_plain_file_name(value) || value.contains('.') {
            return Err(StationIdError::NotPlainName(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// Return the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the ID is all ASCII digits and at most `max_len`
    /// characters long.
    pub fn is_canonical(&self, max_len: usize) -> bool {
        self.0.len() <= max_len && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Numeric value used for ordering station listings.
    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Numeric IDs first in numeric order, then the rest lexically.
    pub fn display_cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StationId {
    type Err = StationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StationId {
    type Error = StationIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> String {
        id.0
    }
}

/// A station as listed in the admin record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Station identifier (record field 2).
    pub id: StationId,
    /// Human-readable station name (record field 3).
    pub name: String,
}
