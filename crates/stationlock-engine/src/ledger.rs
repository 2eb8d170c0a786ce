//! Per-user open-session counters.
//!
//! One file per encoded user identity, holding a single decimal count.
//! An entry whose count would drop to zero is deleted instead of written,
//! so the directory always lists exactly the users with open sessions.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stationlock_core::error::AppError;
use stationlock_core::types::EncodedIdentity;

/// What happened (or would happen) to a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum LedgerChange {
    /// The count was lowered by one.
    Decremented {
        /// Count before the change.
        from: i64,
        /// Count after the change.
        to: i64,
    },
    /// The count reached zero and the entry was deleted.
    Removed {
        /// Count before the change.
        from: i64,
    },
    /// No entry exists for the user.
    Missing,
    /// The entry exists but does not hold a number.
    Unreadable,
    /// The owning user could not be mapped to a ledger key.
    Unresolved,
    /// The outcome does not touch the ledger.
    Unchanged,
}

impl fmt::Display for LedgerChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerChange::Decremented { from, to } => write!(f, "{from} -> {to}"),
            LedgerChange::Removed { from } => write!(f, "{from} -> removed"),
            LedgerChange::Missing => write!(f, "missing"),
            LedgerChange::Unreadable => write!(f, "unreadable"),
            LedgerChange::Unresolved => write!(f, "unresolved"),
            LedgerChange::Unchanged => write!(f, "-"),
        }
    }
}

/// Current state of one entry.
enum Reading {
    Missing,
    Unreadable,
    Count(i64),
}

/// Counter Ledger stored as a directory of count files.
#[derive(Debug, Clone)]
pub struct CounterLedger {
    /// Directory with one file per encoded identity.
    dir: PathBuf,
}

impl CounterLedger {
    /// Creates a ledger over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory backing the ledger.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, identity: &EncodedIdentity) -> Result<PathBuf, AppError> {
        if !identity.is_plain_file_name() || identity.as_str().starts_with('.') {
            return Err(AppError::validation(format!(
                "Encoded identity '{identity}' is not a valid ledger key"
            )));
        }
        Ok(self.dir.join(identity.as_str()))
    }

    async fn read(&self, path: &Path) -> Result<Reading, AppError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .and_then(|line| line.parse::<i64>().ok())
                .map(Reading::Count)
                .unwrap_or(Reading::Unreadable)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Reading::Missing),
            Err(e) => Err(AppError::storage(format!(
                "Failed to read ledger entry '{}': {e}",
                path.display()
            ))),
        }
    }

    fn next_change(count: i64) -> LedgerChange {
        let next = count.saturating_sub(1);
        if next <= 0 {
            LedgerChange::Removed { from: count }
        } else {
            LedgerChange::Decremented {
                from: count,
                to: next,
            }
        }
    }

    /// Current count for `identity`, `None` if missing or unreadable.
    pub async fn count(&self, identity: &EncodedIdentity) -> Result<Option<i64>, AppError> {
        let path = self.entry_path(identity)?;
        match self.read(&path).await? {
            Reading::Count(count) => Ok(Some(count)),
            Reading::Missing | Reading::Unreadable => Ok(None),
        }
    }

    /// Reports what [`CounterLedger::decrement`] would do, without writing.
    pub async fn preview_decrement(
        &self,
        identity: &EncodedIdentity,
    ) -> Result<LedgerChange, AppError> {
        let path = self.entry_path(identity)?;
        Ok(match self.read(&path).await? {
            Reading::Missing => LedgerChange::Missing,
            Reading::Unreadable => LedgerChange::Unreadable,
            Reading::Count(count) => Self::next_change(count),
        })
    }

    /// Lowers the count for `identity` by one.
    ///
    /// A missing or unreadable entry is logged and left alone. When the new
    /// count would be zero or less the entry is deleted.
    pub async fn decrement(&self, identity: &EncodedIdentity) -> Result<LedgerChange, AppError> {
        let path = self.entry_path(identity)?;

        let count = match self.read(&path).await? {
            Reading::Missing => {
                warn!(user = %identity, "No ledger entry to decrement");
                return Ok(LedgerChange::Missing);
            }
            Reading::Unreadable => {
                warn!(user = %identity, "Ledger entry is not a number, leaving it alone");
                return Ok(LedgerChange::Unreadable);
            }
            Reading::Count(count) => count,
        };

        let change = Self::next_change(count);
        match change {
            LedgerChange::Removed { from } => {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        debug!(user = %identity, "Ledger entry vanished before removal");
                    }
                    Err(e) => {
                        return Err(AppError::storage(format!(
                            "Failed to remove ledger entry '{}': {e}",
                            path.display()
                        )));
                    }
                }
                info!(user = %identity, from = from, "Ledger entry removed");
            }
            LedgerChange::Decremented { from, to } => {
                self.write(&path, identity, to).await?;
                info!(user = %identity, from = from, to = to, "Ledger entry decremented");
            }
            _ => {}
        }

        Ok(change)
    }

    /// Replaces an entry's count through a temporary file and rename.
    async fn write(
        &self,
        path: &Path,
        identity: &EncodedIdentity,
        count: i64,
    ) -> Result<(), AppError> {
        let tmp = self.dir.join(format!(".{identity}.tmp"));
        tokio::fs::write(&tmp, format!("{count}\n"))
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to write ledger entry '{}': {e}",
                    tmp.display()
                ))
            })?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::storage(format!(
                "Failed to replace ledger entry '{}': {e}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Lists every entry with its count (`None` if unreadable), sorted by
    /// identity.
    pub async fn entries(&self) -> Result<Vec<(EncodedIdentity, Option<i64>)>, AppError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read ledger directory '{}': {e}",
                    self.dir.display()
                )));
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let identity = EncodedIdentity::new(&name);
            let count = match self.read(&entry.path()).await? {
                Reading::Count(count) => Some(count),
                _ => None,
            };
            entries.push((identity, count));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
