//! CLI command definitions and dispatch.

pub mod clear;
pub mod config;
pub mod ledger;
pub mod list;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use stationlock_core::config::AppConfig;
use stationlock_core::error::AppError;
use stationlock_engine::{ReconcileOptions, Reconciler, StationResolver};

/// Clears workstation locks left behind by dead sessions
#[derive(Debug, Parser)]
#[command(name = "stationlock", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/stationlock.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List connected stations and the state of their owners
    List,
    /// Clear the locks of specific stations
    Clear(clear::ClearArgs),
    /// Clear every orphaned workstation lock
    ClearAll(clear::ClearAllArgs),
    /// Show per-user open-session counters
    Ledger,
    /// Configuration management
    Config(config::ConfigArgs),
}

/// Switches shared by the clearing commands
#[derive(Debug, Clone, Copy, Args)]
pub struct RunArgs {
    /// Terminate live owning processes instead of preserving their locks
    #[arg(short, long)]
    pub kill: bool,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Report what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Engine options for these switches.
    pub fn options(&self) -> ReconcileOptions {
        ReconcileOptions {
            force_kill: self.kill,
            dry_run: self.dry_run,
        }
    }

    /// Whether the operator must confirm before anything changes.
    pub fn needs_confirmation(&self) -> bool {
        !self.yes && !self.dry_run
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::List => list::execute(config, self.format).await,
            Commands::Clear(args) => clear::execute(args, config, self.format).await,
            Commands::ClearAll(args) => clear::execute_all(args, config, self.format).await,
            Commands::Ledger => ledger::execute(config, self.format).await,
            Commands::Config(args) => config::execute(args, config, &self.config, self.format).await,
        }
    }
}

/// Helper: load the admin record store and build a reconciler naming
/// stations from it.
///
/// A missing or empty admin record store is fatal.
pub async fn build_reconciler(
    config: &AppConfig,
) -> Result<(Reconciler, Arc<StationResolver>), AppError> {
    let resolver = Arc::new(StationResolver::load(&config.paths.admin_store).await?);
    let reconciler = Reconciler::from_config(config).with_resolver(resolver.clone());
    Ok((reconciler, resolver))
}

/// Helper: ask the operator for a yes/no answer, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}
