//! Core type definitions used across the stationlock workspace.

pub mod artifact;
pub mod identity;
pub mod outcome;
pub mod station;

pub use artifact::{ArtifactNameError, Pid, SessionArtifactName};
pub use identity::{EncodedIdentity, LoginName, UserKey};
pub use outcome::Outcome;
pub use station::{StationId, StationIdError, StationRecord};

/// Returns `true` if `value` names a single entry inside a directory.
pub(crate) fn is_plain_file_name(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0'])
        && !value.chars().any(char::is_whitespace)
}
