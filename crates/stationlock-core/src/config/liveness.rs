//! Process liveness and termination configuration.

use serde::{Deserialize, Serialize};

/// How the engine decides whether a PID is alive and how it terminates one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LivenessConfig {
    /// Liveness probe strategy.
    #[serde(default)]
    pub method: LivenessMethod,
    /// Signal sent when a live session is force-terminated.
    #[serde(default)]
    pub terminate_signal: TerminateSignal,
}

/// Strategy used to probe a PID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessMethod {
    /// Look for `<proc_dir>/<pid>`.
    #[default]
    Procfs,
    /// Probe with signal 0; a permission error still means the PID exists.
    Signal,
}

/// Termination signal used on the force path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminateSignal {
    /// `SIGTERM`.
    #[default]
    Term,
    /// `SIGKILL`.
    Kill,
}

impl std::fmt::Display for TerminateSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminateSignal::Term => write!(f, "SIGTERM"),
            TerminateSignal::Kill => write!(f, "SIGKILL"),
        }
    }
}
