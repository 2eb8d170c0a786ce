//! Filesystem locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Locations of the admin record store, lock directories, and process table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Pipe-delimited admin record file mapping station IDs to names.
    #[serde(default = "default_admin_store")]
    pub admin_store: PathBuf,
    /// Directory holding one workstation lock per connected station.
    #[serde(default = "default_lock_dir")]
    pub lock_dir: PathBuf,
    /// Directory holding `<user>.<station>` session-ID artifacts.
    ///
    /// Defaults to the parent of `lock_dir` when unset.
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
    /// Directory holding one counter file per encoded user identity.
    #[serde(default = "default_ledger_dir")]
    pub ledger_dir: PathBuf,
    /// Directory exposing one entry per live process ID.
    #[serde(default = "default_proc_dir")]
    pub proc_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            admin_store: default_admin_store(),
            lock_dir: default_lock_dir(),
            session_dir: None,
            ledger_dir: default_ledger_dir(),
            proc_dir: default_proc_dir(),
        }
    }
}

impl PathsConfig {
    /// Effective session-ID artifact directory.
    pub fn session_dir(&self) -> PathBuf {
        match &self.session_dir {
            Some(dir) => dir.clone(),
            None => self
                .lock_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.lock_dir.clone()),
        }
    }
}

fn default_admin_store() -> PathBuf {
    PathBuf::from("/var/lib/stationlock/admin/stations")
}

fn default_lock_dir() -> PathBuf {
    PathBuf::from("/var/lib/stationlock/locks/stations")
}

fn default_ledger_dir() -> PathBuf {
    PathBuf::from("/var/lib/stationlock/locks/users")
}

fn default_proc_dir() -> PathBuf {
    PathBuf::from("/proc")
}
