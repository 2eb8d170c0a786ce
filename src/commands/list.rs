//! Connected station listing.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use stationlock_core::config::AppConfig;
use stationlock_core::error::AppError;
use stationlock_engine::StationState;

/// Connected station display row
#[derive(Debug, Serialize, Tabled)]
struct StationRow {
    /// Station ID
    station: String,
    /// Station name
    name: String,
    /// Owning user
    user: String,
    /// Owning PID
    pid: String,
    /// Owner state
    state: String,
    /// Why the station could not be inspected
    notes: String,
}

/// Execute the list command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let (reconciler, _resolver) = super::build_reconciler(config).await?;
    let statuses = reconciler.list_connected().await?;

    let rows: Vec<StationRow> = statuses
        .iter()
        .map(|s| StationRow {
            station: s.station.to_string(),
            name: s.name.clone().unwrap_or_else(|| "?".to_string()),
            user: s
                .user
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "-".to_string()),
            pid: s
                .pid
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            state: s.state.to_string(),
            notes: s.error.clone().unwrap_or_default(),
        })
        .collect();

    output::print_list(&rows, format);

    if format == OutputFormat::Table {
        let orphaned = statuses.iter().filter(|s| s.state.is_orphaned()).count();
        if orphaned > 0 {
            output::print_warning(&format!(
                "{} orphaned lock(s); run `stationlock clear-all` to remove them",
                orphaned
            ));
        }
        let unreadable = statuses
            .iter()
            .filter(|s| s.state == StationState::Unreadable)
            .count();
        if unreadable > 0 {
            output::print_warning(&format!("{} station(s) could not be inspected", unreadable));
        }
    }

    Ok(())
}
