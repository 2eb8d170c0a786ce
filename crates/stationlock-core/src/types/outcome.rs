//! Per-station reconciliation outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of reconciling one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No workstation lock existed; nothing to do.
    NoLock,
    /// The lock had no session artifact and was removed.
    CleanedHeadless,
    /// The owning process was gone (or unknown) and the lock was removed.
    CleanedDead,
    /// The owning process was alive, was signalled, and the lock was removed.
    LiveButForced,
    /// The owning process is alive; nothing was touched.
    LivePreserved,
}

impl Outcome {
    /// Returns `true` if the workstation lock is removed by this outcome.
    pub fn removes_lock(self) -> bool {
        matches!(
            self,
            Outcome::CleanedHeadless | Outcome::CleanedDead | Outcome::LiveButForced
        )
    }

    /// All outcomes in reporting order.
    pub const ALL: [Outcome; 5] = [
        Outcome::NoLock,
        Outcome::CleanedHeadless,
        Outcome::CleanedDead,
        Outcome::LiveButForced,
        Outcome::LivePreserved,
    ];
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoLock => write!(f, "no_lock"),
            Outcome::CleanedHeadless => write!(f, "cleaned_headless"),
            Outcome::CleanedDead => write!(f, "cleaned_dead"),
            Outcome::LiveButForced => write!(f, "live_but_forced"),
            Outcome::LivePreserved => write!(f, "live_preserved"),
        }
    }
}
