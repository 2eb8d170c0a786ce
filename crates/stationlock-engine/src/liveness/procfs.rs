//! Liveness probe backed by a process table directory.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use stationlock_core::traits::LivenessOracle;
use stationlock_core::types::Pid;

/// Treats a PID as alive when `<proc_dir>/<pid>` exists.
#[derive(Debug, Clone)]
pub struct ProcfsOracle {
    /// Directory with one entry per live process.
    proc_dir: PathBuf,
}

impl ProcfsOracle {
    /// Creates an oracle over `proc_dir` (normally `/proc`).
    pub fn new(proc_dir: impl Into<PathBuf>) -> Self {
        Self {
            proc_dir: proc_dir.into(),
        }
    }
}

#[async_trait]
impl LivenessOracle for ProcfsOracle {
    async fn is_alive(&self, pid: Pid) -> bool {
        let path = self.proc_dir.join(pid.to_string());
        match tokio::fs::try_exists(&path).await {
            Ok(exists) => exists,
            Err(e) => {
                // An unreadable entry still proves the PID is in the table.
                debug!(pid = %pid, error = %e, "Process entry not accessible");
                true
            }
        }
    }
}
