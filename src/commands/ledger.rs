//! Counter Ledger listing.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use stationlock_core::config::AppConfig;
use stationlock_core::error::AppError;
use stationlock_engine::CounterLedger;

/// Ledger display row
#[derive(Debug, Serialize, Tabled)]
struct LedgerRow {
    /// Encoded user identity
    identity: String,
    /// Open sessions
    sessions: String,
}

/// Execute the ledger command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let ledger = CounterLedger::new(config.paths.ledger_dir.clone());
    let entries = ledger.entries().await?;

    let rows: Vec<LedgerRow> = entries
        .into_iter()
        .map(|(identity, count)| LedgerRow {
            identity: identity.to_string(),
            sessions: count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unreadable".to_string()),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
