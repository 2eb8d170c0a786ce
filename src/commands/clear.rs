//! Targeted and batch lock clearing commands.

use clap::Args;
use tracing::info;

use crate::output::{self, OutputFormat};
use stationlock_core::config::AppConfig;
use stationlock_core::error::AppError;
use stationlock_core::types::StationId;

use super::RunArgs;

/// Arguments for the targeted clear command
#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Station names or partial names (case-sensitive substring match)
    #[arg(required_unless_present = "ids")]
    pub names: Vec<String>,

    /// Station IDs to clear directly, bypassing the name lookup
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Shared run switches
    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the batch clear command
#[derive(Debug, Args)]
pub struct ClearAllArgs {
    /// Shared run switches
    #[command(flatten)]
    pub run: RunArgs,
}

/// Execute the targeted clear command
pub async fn execute(
    args: &ClearArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (reconciler, resolver) = super::build_reconciler(config).await?;
    let human = format == OutputFormat::Table;

    let mut stations: Vec<StationId> = Vec::new();

    for pattern in &args.names {
        let matches = resolver.resolve(pattern);
        if matches.is_empty() {
            if human {
                output::print_warning(&format!("No such station: {}", pattern));
            }
            continue;
        }
        for record in matches {
            if !reconciler.inventory().is_station_shaped(&record.id) {
                if human {
                    output::print_warning(&format!(
                        "Skipping '{}' ({}): not a station ID",
                        record.id, record.name
                    ));
                }
                continue;
            }
            if human {
                println!("  {} → {} ({})", pattern, record.id, record.name);
            }
            if !stations.contains(&record.id) {
                stations.push(record.id.clone());
            }
        }
    }

    for raw in &args.ids {
        match StationId::parse(raw) {
            Ok(id) if !reconciler.inventory().is_station_shaped(&id) => {
                if human {
                    output::print_warning(&format!("Skipping '{}': not a station ID", raw));
                }
            }
            Ok(id) => {
                if !stations.contains(&id) {
                    stations.push(id);
                }
            }
            Err(e) => {
                if human {
                    output::print_warning(&format!("Skipping '{}': {}", raw, e));
                }
            }
        }
    }

    if stations.is_empty() {
        if human {
            println!("Nothing to do.");
        }
        return Ok(());
    }

    if args.run.needs_confirmation() {
        let list = stations
            .iter()
            .map(StationId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = if args.run.kill {
            format!(
                "Terminate live sessions and clear locks for station(s) {}?",
                list
            )
        } else {
            format!("Clear orphaned locks for station(s) {}?", list)
        };
        if !super::confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    info!(count = stations.len(), "Clearing requested stations");
    let report = reconciler.reconcile_many(&stations, args.run.options()).await;
    output::print_batch(&report, format);

    Ok(())
}

/// Execute the batch clear command
pub async fn execute_all(
    args: &ClearAllArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (reconciler, _resolver) = super::build_reconciler(config).await?;

    if args.run.needs_confirmation() {
        let prompt = if args.run.kill {
            "Terminate ALL live sessions and clear every workstation lock?"
        } else {
            "Clear every orphaned workstation lock?"
        };
        if !super::confirm(prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let report = reconciler.reconcile_all(args.run.options()).await?;
    output::print_batch(&report, format);

    Ok(())
}
