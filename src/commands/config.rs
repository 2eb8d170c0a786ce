//! Configuration management CLI commands.

use std::path::Path;

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use stationlock_core::config::AppConfig;
use stationlock_core::error::AppError;
use stationlock_engine::StationResolver;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Check that every configured location is usable
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            output::print_item(config, format);
        }
        ConfigCommand::Validate => {
            output::print_success(&format!("Configuration '{}' parsed", config_path));

            let store = StationResolver::load(&config.paths.admin_store).await;
            match &store {
                Ok(resolver) => output::print_kv(
                    "Admin store",
                    &format!(
                        "{} ({} stations)",
                        config.paths.admin_store.display(),
                        resolver.records().len()
                    ),
                ),
                Err(e) => output::print_kv("Admin store", &format!("✗ {}", e)),
            }
            output::print_kv("Lock dir", &describe_dir(&config.paths.lock_dir));
            output::print_kv(
                "Session dir",
                &describe_dir(&config.paths.session_dir()),
            );
            output::print_kv("Ledger dir", &describe_dir(&config.paths.ledger_dir));
            output::print_kv("Process table", &describe_dir(&config.paths.proc_dir));
            output::print_kv(
                "Identity codec",
                if config.identity.uses_commands() {
                    "external commands"
                } else {
                    "login name"
                },
            );

            if let Err(e) = store {
                output::print_error(&format!("Configuration unusable: {}", e));
                return Err(e);
            }
        }
    }

    Ok(())
}

fn describe_dir(path: &Path) -> String {
    let state = if path.is_dir() { "✓" } else { "✗ missing" };
    format!("{} {}", path.display(), state)
}
