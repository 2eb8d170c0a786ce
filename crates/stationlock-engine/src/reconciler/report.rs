//! Audit records produced by reconciliation and inspection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stationlock_core::types::{LoginName, Outcome, Pid, StationId};

use crate::ledger::LedgerChange;

/// Everything known about one station's reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReport {
    /// Station that was reconciled.
    pub station: StationId,
    /// Display name from the admin record store, if known.
    pub name: Option<String>,
    /// Owning login name from the session artifact, if any.
    pub user: Option<LoginName>,
    /// Owning PID from the session artifact, if readable.
    pub pid: Option<Pid>,
    /// Decision taken for the station.
    pub outcome: Outcome,
    /// Effect on the owner's Counter Ledger entry.
    pub ledger: LedgerChange,
    /// Whether a termination signal was sent.
    pub signalled: bool,
    /// Best-effort steps that failed.
    pub issues: Vec<String>,
    /// Whether this was computed without touching anything.
    pub dry_run: bool,
}

impl StationReport {
    pub(crate) fn new(station: StationId, name: Option<String>, dry_run: bool) -> Self {
        Self {
            station,
            name,
            user: None,
            pid: None,
            outcome: Outcome::NoLock,
            ledger: LedgerChange::Unchanged,
            signalled: false,
            issues: Vec::new(),
            dry_run,
        }
    }

    /// Returns `true` if every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A station whose state could not be determined at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationFailure {
    /// Station that failed.
    pub station: StationId,
    /// Why it failed.
    pub error: String,
}

/// Per-station results of a batch or targeted run, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Stations that reached an outcome.
    pub reports: Vec<StationReport>,
    /// Stations whose processing stopped before an outcome.
    pub failures: Vec<StationFailure>,
}

impl BatchReport {
    pub(crate) fn start(dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            dry_run,
            reports: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Number of stations with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.reports.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Outcomes in processing order.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.reports.iter().map(|r| r.outcome).collect()
    }

    /// Number of stations whose lock was (or would be) removed.
    pub fn cleaned(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.removes_lock())
            .count()
    }

    /// One-line summary for operators.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Outcome::ALL
            .iter()
            .filter_map(|o| match self.count(*o) {
                0 => None,
                n => Some(format!("{o}={n}")),
            })
            .collect();
        if !self.failures.is_empty() {
            parts.push(format!("failed={}", self.failures.len()));
        }
        let prefix = if self.dry_run { "[dry run] " } else { "" };
        if parts.is_empty() {
            format!("{prefix}nothing to do")
        } else {
            format!(
                "{prefix}{} station(s): {}",
                self.reports.len() + self.failures.len(),
                parts.join(", ")
            )
        }
    }
}

/// Read-only view of a connected station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationState {
    /// No workstation lock.
    NoLock,
    /// Lock without a session artifact.
    Headless,
    /// Artifact without a readable PID.
    UnknownPid,
    /// Owning process is running.
    Alive,
    /// Owning process is gone.
    Dead,
    /// The station's files could not be read.
    Unreadable,
}

impl StationState {
    /// Returns `true` if reconciliation would remove this station's lock
    /// without force.
    pub fn is_orphaned(self) -> bool {
        matches!(
            self,
            StationState::Headless | StationState::UnknownPid | StationState::Dead
        )
    }
}

impl fmt::Display for StationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationState::NoLock => write!(f, "no-lock"),
            StationState::Headless => write!(f, "headless"),
            StationState::UnknownPid => write!(f, "unknown-pid"),
            StationState::Alive => write!(f, "alive"),
            StationState::Dead => write!(f, "dead"),
            StationState::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Inspection result for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationStatus {
    /// Station inspected.
    pub station: StationId,
    /// Display name from the admin record store, if known.
    pub name: Option<String>,
    /// Owning login name, if an artifact exists.
    pub user: Option<LoginName>,
    /// Owning PID, if readable.
    pub pid: Option<Pid>,
    /// Derived state.
    pub state: StationState,
    /// Why the station could not be inspected.
    pub error: Option<String>,
}

impl StationStatus {
    pub(crate) fn new(station: StationId, name: Option<String>) -> Self {
        Self {
            station,
            name,
            user: None,
            pid: None,
            state: StationState::NoLock,
            error: None,
        }
    }
}
