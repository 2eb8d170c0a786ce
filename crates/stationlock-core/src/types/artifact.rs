//! Session-ID Artifact filenames and their PID payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identity::LoginName;
use super::station::{StationId, StationIdError};
use crate::error::{AppError, ErrorKind};

/// Reasons a filename is not a Session-ID Artifact name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactNameError {
    /// No `.` separates the user part from the station part.
    #[error("'{0}' has no '.' between user and station")]
    MissingSeparator(String),
    /// Nothing precedes the final `.`.
    #[error("'{0}' has an empty user identity")]
    EmptyUser(String),
    /// The part after the final `.` is not a station ID.
    #[error("'{name}' has an invalid station part: {source}")]
    InvalidStation {
        /// The filename that failed to parse.
        name: String,
        /// Why the station part was rejected.
        #[source]
        source: StationIdError,
    },
}

impl From<ArtifactNameError> for AppError {
    fn from(err: ArtifactNameError) -> Self {
        AppError::with_source(ErrorKind::Validation, err.to_string(), err)
    }
}

/// Parsed `<UserIdentity>.<StationID>` filename.
///
/// The split happens at the last `.`, so login names containing dots still
/// parse; station IDs never contain one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionArtifactName {
    /// Login name of the owning user.
    pub user: LoginName,
    /// Station the session is bound to.
    pub station: StationId,
}

impl SessionArtifactName {
    /// Build an artifact name from its parts.
    pub fn new(user: LoginName, station: StationId) -> Self {
        Self { user, station }
    }

    /// Parse a filename of the form `<UserIdentity>.<StationID>`.
    pub fn parse(file_name: &str) -> Result<Self, ArtifactNameError> {
        let (user, station) = file_name
            .rsplit_once('.')
            .ok_or_else(|| ArtifactNameError::MissingSeparator(file_name.to_string()))?;

        if user.trim().is_empty() {
            return Err(ArtifactNameError::EmptyUser(file_name.to_string()));
        }

        let station =
            StationId::parse(station).map_err(|source| ArtifactNameError::InvalidStation {
                name: file_name.to_string(),
                source,
            })?;

        Ok(Self {
            user: LoginName::new(user),
            station,
        })
    }

    /// Returns `true` if this artifact belongs to `station`.
    pub fn is_for(&self, station: &StationId) -> bool {
        &self.station == station
    }

    /// The filename this artifact is stored under.
    pub fn file_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SessionArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.user, self.station)
    }
}

impl FromStr for SessionArtifactName {
    type Err = ArtifactNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Operating-system process identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(u32);

impl Pid {
    /// Wrap a raw PID. Zero is not a process and yields `None`.
    pub fn new(raw: u32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Parse the sole content line of a Session-ID Artifact.
    ///
    /// Empty or non-numeric content is an unknown PID, not an error.
    pub fn from_content(content: &str) -> Option<Self> {
        content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| line.parse::<u32>().ok())
            .and_then(Self::new)
    }

    /// Return the raw value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
