//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use stationlock_engine::BatchReport;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{:#?}", item);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Reconciliation result row
#[derive(Debug, Serialize, Tabled)]
struct OutcomeRow {
    /// Station ID
    station: String,
    /// Station name
    name: String,
    /// Owning user
    user: String,
    /// Owning PID
    pid: String,
    /// Outcome
    outcome: String,
    /// Ledger change
    ledger: String,
    /// Problems encountered
    notes: String,
}

/// Print a reconciliation run: one row per station plus a summary.
pub fn print_batch(report: &BatchReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_item(report, format);
        return;
    }

    let mut rows: Vec<OutcomeRow> = report
        .reports
        .iter()
        .map(|r| OutcomeRow {
            station: r.station.to_string(),
            name: r.name.clone().unwrap_or_else(|| "-".to_string()),
            user: r
                .user
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "-".to_string()),
            pid: r
                .pid
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            outcome: r.outcome.to_string(),
            ledger: r.ledger.to_string(),
            notes: r.issues.join("; "),
        })
        .collect();

    rows.extend(report.failures.iter().map(|f| OutcomeRow {
        station: f.station.to_string(),
        name: "-".to_string(),
        user: "-".to_string(),
        pid: "-".to_string(),
        outcome: "failed".to_string(),
        ledger: "-".to_string(),
        notes: f.error.clone(),
    }));

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }

    if report.failures.is_empty() && report.reports.iter().all(|r| r.is_clean()) {
        print_success(&report.summary());
    } else {
        print_warning(&report.summary());
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}
