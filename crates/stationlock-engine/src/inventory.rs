//! Workstation locks and the Session-ID Artifacts that own them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use stationlock_core::config::AppConfig;
use stationlock_core::error::AppError;
use stationlock_core::types::{Pid, SessionArtifactName, StationId};

/// A Session-ID Artifact found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionArtifact {
    /// Parsed `<user>.<station>` filename.
    pub name: SessionArtifactName,
    /// Full path of the artifact.
    pub path: PathBuf,
}

/// Filesystem view over the lock and session-ID directories.
#[derive(Debug, Clone)]
pub struct LockInventory {
    /// Directory with one lock file per connected station.
    lock_dir: PathBuf,
    /// Directory with `<user>.<station>` artifacts.
    session_dir: PathBuf,
    /// Longest lock filename accepted by the shape filter.
    max_station_id_len: usize,
}

impl LockInventory {
    /// Creates an inventory over explicit directories.
    pub fn new(
        lock_dir: impl Into<PathBuf>,
        session_dir: impl Into<PathBuf>,
        max_station_id_len: usize,
    ) -> Self {
        Self {
            lock_dir: lock_dir.into(),
            session_dir: session_dir.into(),
            max_station_id_len,
        }
    }

    /// Creates an inventory from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.paths.lock_dir.clone(),
            config.paths.session_dir(),
            config.inventory.max_station_id_len,
        )
    }

    /// Directory holding workstation locks.
    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Path of the workstation lock for `station`.
    pub fn lock_path(&self, station: &StationId) -> PathBuf {
        self.lock_dir.join(station.as_str())
    }

    /// Lists stations that currently hold a workstation lock, in numeric
    /// order.
    ///
    /// With `shape_filter` set, filenames that are not canonical station IDs
    /// (digits only, bounded length) are skipped so that unrelated files in
    /// the directory are never touched. A missing lock directory means no
    /// station is connected.
    pub async fn list_workstation_locks(
        &self,
        shape_filter: bool,
    ) -> Result<Vec<StationId>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.lock_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(dir = %self.lock_dir.display(), "Lock directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read lock directory '{}': {e}",
                    self.lock_dir.display()
                )));
            }
        };

        let mut stations = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let station = match StationId::parse(&file_name) {
                Ok(station) => station,
                Err(e) => {
                    debug!(file = %file_name, error = %e, "Skipping non-station lock entry");
                    continue;
                }
            };
            if shape_filter && !self.is_station_shaped(&station) {
                debug!(file = %file_name, "Skipping lock entry with non-station shape");
                continue;
            }
            stations.push(station);
        }

        stations.sort_by(|a, b| a.display_cmp(b));
        Ok(stations)
    }

    /// Returns `true` if `station` is a canonical station ID: digits only,
    /// no longer than the configured maximum.
    pub fn is_station_shaped(&self, station: &StationId) -> bool {
        station.is_canonical(self.max_station_id_len)
    }

    /// Returns `true` if a workstation lock exists for `station`.
    pub async fn lock_exists(&self, station: &StationId) -> Result<bool, AppError> {
        let path = self.lock_path(station);
        tokio::fs::try_exists(&path).await.map_err(|e| {
            AppError::storage(format!("Failed to stat lock '{}': {e}", path.display()))
        })
    }

    /// Finds the Session-ID Artifact named `<user>.<station>`.
    ///
    /// `None` means the lock is headless. If several artifacts claim the
    /// same station the first in name order is used and the rest are
    /// logged.
    pub async fn find_session_artifact(
        &self,
        station: &StationId,
    ) -> Result<Option<SessionArtifact>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.session_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read session directory '{}': {e}",
                    self.session_dir.display()
                )));
            }
        };

        let suffix = format!(".{station}");
        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !file_name.ends_with(&suffix) {
                continue;
            }
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            match SessionArtifactName::parse(&file_name) {
                Ok(name) if name.is_for(station) => found.push(SessionArtifact {
                    name,
                    path: entry.path(),
                }),
                Ok(_) => {}
                Err(e) => debug!(file = %file_name, error = %e, "Skipping artifact candidate"),
            }
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));
        if found.len() > 1 {
            warn!(
                station = %station,
                count = found.len(),
                using = %found[0].name,
                "Multiple session artifacts claim one station"
            );
        }

        Ok(found.into_iter().next())
    }

    /// Reads the PID stored in a Session-ID Artifact.
    ///
    /// Unreadable, empty, or non-numeric content yields `None`.
    pub async fn read_pid(&self, artifact: &SessionArtifact) -> Option<Pid> {
        match tokio::fs::read_to_string(&artifact.path).await {
            Ok(content) => {
                let pid = Pid::from_content(&content);
                if pid.is_none() {
                    warn!(artifact = %artifact.name, "Session artifact holds no valid PID");
                }
                pid
            }
            Err(e) => {
                warn!(artifact = %artifact.name, error = %e, "Failed to read session artifact");
                None
            }
        }
    }

    /// Removes the workstation lock. Returns `false` if it was already gone.
    pub async fn remove_lock(&self, station: &StationId) -> Result<bool, AppError> {
        remove_file(&self.lock_path(station)).await
    }

    /// Removes a Session-ID Artifact. Returns `false` if it was already gone.
    pub async fn remove_artifact(&self, artifact: &SessionArtifact) -> Result<bool, AppError> {
        remove_file(&artifact.path).await
    }
}

async fn remove_file(path: &Path) -> Result<bool, AppError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AppError::with_source(
            stationlock_core::error::ErrorKind::Storage,
            format!("Failed to remove '{}': {e}", path.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, LockInventory) {
        let dir = tempfile::tempdir().unwrap();
        let locks = dir.path().join("stations");
        std::fs::create_dir_all(&locks).unwrap();
        let inventory = LockInventory::new(&locks, dir.path(), 5);
        (dir, inventory)
    }

    fn station(id: &str) -> StationId {
        StationId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_list_applies_shape_filter() {
        let (dir, inventory) = setup();
        for name in ["33", "11", "2307", "README", "123456"] {
            std::fs::write(dir.path().join("stations").join(name), "1").unwrap();
        }
        std::fs::create_dir(dir.path().join("stations").join("22")).unwrap();

        let filtered = inventory.list_workstation_locks(true).await.unwrap();
        let ids: Vec<&str> = filtered.iter().map(StationId::as_str).collect();
        assert_eq!(ids, vec!["11", "33", "2307"]);

        let all = inventory.list_workstation_locks(false).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = LockInventory::new(dir.path().join("nope"), dir.path(), 5);
        assert!(inventory.list_workstation_locks(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_session_artifact_exact_station() {
        let (dir, inventory) = setup();
        std::fs::write(dir.path().join("MEACIRC.2307"), "9999\n").unwrap();
        std::fs::write(dir.path().join("OTHER.12307"), "1\n").unwrap();

        let artifact = inventory
            .find_session_artifact(&station("2307"))
            .await
            .unwrap()
            .expect("artifact");
        assert_eq!(artifact.name.user.as_str(), "MEACIRC");
        assert_eq!(inventory.read_pid(&artifact).await, Pid::new(9999));

        assert!(
            inventory
                .find_session_artifact(&station("307"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_headless_lock_has_no_artifact() {
        let (_dir, inventory) = setup();
        assert!(
            inventory
                .find_session_artifact(&station("4010"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_read_pid_garbage() {
        let (dir, inventory) = setup();
        std::fs::write(dir.path().join("BOB.11"), "not a pid").unwrap();
        let artifact = inventory
            .find_session_artifact(&station("11"))
            .await
            .unwrap()
            .expect("artifact");
        assert_eq!(inventory.read_pid(&artifact).await, None);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (dir, inventory) = setup();
        std::fs::write(dir.path().join("stations").join("11"), "1").unwrap();
        let id = station("11");
        assert!(inventory.lock_exists(&id).await.unwrap());
        assert!(inventory.remove_lock(&id).await.unwrap());
        assert!(!inventory.remove_lock(&id).await.unwrap());
        assert!(!inventory.lock_exists(&id).await.unwrap());
    }
}
