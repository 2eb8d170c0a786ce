//! Station name → station ID lookups against the admin record store.
//!
//! The store is line-oriented with `|`-delimited fields; field 2 is the
//! station ID and field 3 the display name. A missing or empty store is the
//! one fatal environment condition of the whole tool.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use stationlock_core::error::AppError;
use stationlock_core::types::{StationId, StationRecord};

/// Read-only view of the admin record store.
#[derive(Debug, Clone)]
pub struct StationResolver {
    /// File the records were loaded from.
    source: PathBuf,
    /// Station records in file order.
    records: Vec<StationRecord>,
}

impl StationResolver {
    /// Loads the admin record store.
    ///
    /// Fails with an environment error if the file is missing, unreadable,
    /// or contains no usable station record.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                stationlock_core::error::ErrorKind::Environment,
                format!("Admin record store '{}' is unavailable: {e}", path.display()),
                e,
            )
        })?;

        let records = Self::parse(&content);
        if records.is_empty() {
            return Err(AppError::environment(format!(
                "Admin record store '{}' contains no station records",
                path.display()
            )));
        }

        debug!(
            path = %path.display(),
            records = records.len(),
            "Loaded admin record store"
        );

        Ok(Self {
            source: path.to_path_buf(),
            records,
        })
    }

    /// Builds a resolver from already-parsed records.
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<StationRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    /// Parses admin store content, skipping lines without a usable ID.
    pub fn parse(content: &str) -> Vec<StationRecord> {
        content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let line = line.trim_end_matches(['\r', '\n']);
                if line.trim().is_empty() {
                    return None;
                }
                let mut fields = line.split('|');
                let _ = fields.next();
                let id = fields.next()?;
                let name = fields.next().unwrap_or_default();
                match StationId::parse(id) {
                    Ok(id) => Some(StationRecord {
                        id,
                        name: name.trim().to_string(),
                    }),
                    Err(e) => {
                        debug!(line = index + 1, error = %e, "Skipping admin record");
                        None
                    }
                }
            })
            .collect()
    }

    /// File the records were loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All station records in file order.
    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    /// Returns every station whose name contains `pattern` (case-sensitive).
    ///
    /// Each match is logged. An empty pattern matches nothing.
    pub fn resolve(&self, pattern: &str) -> Vec<&StationRecord> {
        if pattern.is_empty() {
            warn!("Ignoring empty station name pattern");
            return Vec::new();
        }

        let mut matches: Vec<&StationRecord> = Vec::new();
        for record in &self.records {
            if record.name.contains(pattern) && !matches.iter().any(|m| m.id == record.id) {
                matches.push(record);
            }
        }

        match matches.len() {
            0 => warn!(pattern = %pattern, "No such station"),
            count => {
                for record in &matches {
                    info!(
                        pattern = %pattern,
                        station = %record.id,
                        name = %record.name,
                        "Station matched"
                    );
                }
                if count > 1 {
                    info!(pattern = %pattern, count = count, "Pattern matched multiple stations");
                }
            }
        }

        matches
    }

    /// Display name of a station, if the store lists it.
    pub fn name_of(&self, station: &StationId) -> Option<&str> {
        self.records
            .iter()
            .find(|r| &r.id == station)
            .map(|r| r.name.as_str())
    }
}
