//! Workstation lock reconciliation.
//!
//! For each station the engine restores one invariant: a workstation lock
//! exists if and only if a live process owns it. Stations are handled
//! strictly one after another and independently; a failure on one station
//! never stops the rest of a batch.

pub mod report;

use std::sync::Arc;

use tracing::{error, info, warn};

use stationlock_core::config::AppConfig;
use stationlock_core::error::{AppError, ErrorKind};
use stationlock_core::traits::{IdentityCodec, LivenessOracle, ProcessSignaller};
use stationlock_core::types::{LoginName, Outcome, StationId};

use crate::identity::codec_from_config;
use crate::inventory::{LockInventory, SessionArtifact};
use crate::ledger::{CounterLedger, LedgerChange};
use crate::liveness::{oracle_from_config, signaller_from_config};
use crate::resolver::StationResolver;

pub use report::{BatchReport, StationFailure, StationReport, StationState, StationStatus};

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Terminate live owners instead of preserving their locks.
    pub force_kill: bool,
    /// Decide outcomes without removing, signalling, or writing anything.
    pub dry_run: bool,
}

/// Decides, per station, whether a lock is orphaned and cleans it up.
#[derive(Clone)]
pub struct Reconciler {
    /// Lock and artifact access.
    inventory: LockInventory,
    /// Per-user session counters.
    ledger: CounterLedger,
    /// Process liveness probe.
    oracle: Arc<dyn LivenessOracle>,
    /// Termination signal delivery.
    signaller: Arc<dyn ProcessSignaller>,
    /// Login name → ledger key mapping.
    codec: Arc<dyn IdentityCodec>,
    /// Station names for reports.
    resolver: Option<Arc<StationResolver>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("inventory", &self.inventory)
            .field("ledger", &self.ledger)
            .finish()
    }
}

impl Reconciler {
    /// Creates a reconciler from explicit collaborators.
    pub fn new(
        inventory: LockInventory,
        ledger: CounterLedger,
        oracle: Arc<dyn LivenessOracle>,
        signaller: Arc<dyn ProcessSignaller>,
        codec: Arc<dyn IdentityCodec>,
    ) -> Self {
        Self {
            inventory,
            ledger,
            oracle,
            signaller,
            codec,
            resolver: None,
        }
    }

    /// Creates a reconciler wired to the real filesystem and process table.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            LockInventory::from_config(config),
            CounterLedger::new(config.paths.ledger_dir.clone()),
            oracle_from_config(config),
            signaller_from_config(config),
            codec_from_config(config),
        )
    }

    /// Attaches the admin record store used to name stations in reports.
    pub fn with_resolver(mut self, resolver: Arc<StationResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// The lock inventory this reconciler works on.
    pub fn inventory(&self) -> &LockInventory {
        &self.inventory
    }

    /// The Counter Ledger this reconciler maintains.
    pub fn ledger(&self) -> &CounterLedger {
        &self.ledger
    }

    fn station_name(&self, station: &StationId) -> Option<String> {
        self.resolver
            .as_ref()
            .and_then(|r| r.name_of(station))
            .map(str::to_string)
    }

    /// Reconciles one station.
    ///
    /// Returns an error only when the station's state cannot be read at
    /// all; failed removals and ledger updates are recorded in the report's
    /// `issues` and do not stop the remaining steps.
    pub async fn reconcile(
        &self,
        station: &StationId,
        options: ReconcileOptions,
    ) -> Result<StationReport, AppError> {
        self.check_shape(station)?;

        let mut report =
            StationReport::new(station.clone(), self.station_name(station), options.dry_run);

        if !self.inventory.lock_exists(station).await? {
            report.outcome = Outcome::NoLock;
            log_report(&report);
            return Ok(report);
        }

        let Some(artifact) = self.inventory.find_session_artifact(station).await? else {
            // No owner can be determined, so there is no ledger entry to touch.
            if !options.dry_run {
                self.remove_lock(station, &mut report).await;
            }
            report.outcome = Outcome::CleanedHeadless;
            log_report(&report);
            return Ok(report);
        };

        report.user = Some(artifact.name.user.clone());
        report.pid = self.inventory.read_pid(&artifact).await;

        let Some(pid) = report.pid else {
            self.clean_owned(station, &artifact, options, &mut report)
                .await;
            report.outcome = Outcome::CleanedDead;
            log_report(&report);
            return Ok(report);
        };

        if !self.oracle.is_alive(pid).await {
            self.clean_owned(station, &artifact, options, &mut report)
                .await;
            report.outcome = Outcome::CleanedDead;
            log_report(&report);
            return Ok(report);
        }

        if !options.force_kill {
            warn!(
                station = %station,
                user = %artifact.name.user,
                pid = %pid,
                "Lock is held by a live process, preserving it"
            );
            report.outcome = Outcome::LivePreserved;
            log_report(&report);
            return Ok(report);
        }

        let mut exited = false;
        if !options.dry_run {
            match self.signaller.terminate(pid).await {
                Ok(()) => report.signalled = true,
                Err(e) if e.kind == ErrorKind::NotFound => {
                    info!(station = %station, pid = %pid, "Owner exited before termination");
                    exited = true;
                }
                Err(e) => {
                    warn!(
                        station = %station,
                        pid = %pid,
                        error = %e,
                        "Termination failed, clearing lock anyway"
                    );
                    report.issues.push(e.to_string());
                }
            }
        }

        self.clean_owned(station, &artifact, options, &mut report)
            .await;
        report.outcome = if exited {
            Outcome::CleanedDead
        } else {
            Outcome::LiveButForced
        };
        log_report(&report);
        Ok(report)
    }

    /// Reconciles the given stations in order.
    pub async fn reconcile_many(
        &self,
        stations: &[StationId],
        options: ReconcileOptions,
    ) -> BatchReport {
        let mut batch = BatchReport::start(options.dry_run);

        for station in stations {
            match self.reconcile(station, options).await {
                Ok(report) => batch.reports.push(report),
                Err(e) => {
                    error!(station = %station, error = %e, "Station reconciliation failed");
                    batch.failures.push(StationFailure {
                        station: station.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let batch = batch.finish();
        info!(summary = %batch.summary(), "Reconciliation run finished");
        batch
    }

    /// Reconciles every shape-valid workstation lock.
    pub async fn reconcile_all(&self, options: ReconcileOptions) -> Result<BatchReport, AppError> {
        let stations = self.inventory.list_workstation_locks(true).await?;
        info!(count = stations.len(), "Reconciling all workstation locks");
        Ok(self.reconcile_many(&stations, options).await)
    }

    /// Describes a station without changing anything.
    pub async fn inspect(&self, station: &StationId) -> Result<StationStatus, AppError> {
        self.check_shape(station)?;
        let mut status = StationStatus::new(station.clone(), self.station_name(station));

        if !self.inventory.lock_exists(station).await? {
            return Ok(status);
        }

        let Some(artifact) = self.inventory.find_session_artifact(station).await? else {
            status.state = StationState::Headless;
            return Ok(status);
        };

        status.user = Some(artifact.name.user.clone());
        status.pid = self.inventory.read_pid(&artifact).await;
        status.state = match status.pid {
            None => StationState::UnknownPid,
            Some(pid) if self.oracle.is_alive(pid).await => StationState::Alive,
            Some(_) => StationState::Dead,
        };

        Ok(status)
    }

    /// Inspects every shape-valid workstation lock.
    ///
    /// A station that cannot be inspected is listed as unreadable; the
    /// remaining stations are still inspected.
    pub async fn list_connected(&self) -> Result<Vec<StationStatus>, AppError> {
        let stations = self.inventory.list_workstation_locks(true).await?;
        let mut statuses = Vec::with_capacity(stations.len());
        for station in &stations {
            match self.inspect(station).await {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    warn!(station = %station, error = %e, "Station inspection failed");
                    let mut status =
                        StationStatus::new(station.clone(), self.station_name(station));
                    status.state = StationState::Unreadable;
                    status.error = Some(e.to_string());
                    statuses.push(status);
                }
            }
        }
        Ok(statuses)
    }

    /// Rejects IDs that could name an unrelated file in the lock directory.
    fn check_shape(&self, station: &StationId) -> Result<(), AppError> {
        if self.inventory.is_station_shaped(station) {
            Ok(())
        } else {
            Err(AppError::validation(format!("'{station}' is not a station ID")))
        }
    }

    /// Removes artifact and lock, then lowers the owner's ledger count.
    ///
    /// Also used when the PID is unreadable: the owner is still known from
    /// the artifact filename, so the ledger is decremented there too.
    async fn clean_owned(
        &self,
        station: &StationId,
        artifact: &SessionArtifact,
        options: ReconcileOptions,
        report: &mut StationReport,
    ) {
        if !options.dry_run {
            if let Err(e) = self.inventory.remove_artifact(artifact).await {
                warn!(station = %station, artifact = %artifact.name, error = %e, "Failed to remove session artifact");
                report.issues.push(e.to_string());
            }
            self.remove_lock(station, report).await;
        }

        report.ledger = self
            .update_ledger(&artifact.name.user, options.dry_run, report)
            .await;
    }

    async fn remove_lock(&self, station: &StationId, report: &mut StationReport) {
        match self.inventory.remove_lock(station).await {
            Ok(true) => {}
            Ok(false) => info!(station = %station, "Workstation lock already gone"),
            Err(e) => {
                warn!(station = %station, error = %e, "Failed to remove workstation lock");
                report.issues.push(e.to_string());
            }
        }
    }

    async fn update_ledger(
        &self,
        user: &LoginName,
        dry_run: bool,
        report: &mut StationReport,
    ) -> LedgerChange {
        let identity = match self.codec.ledger_key(user).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(user = %user, error = %e, "Cannot map user to a ledger entry");
                report.issues.push(e.to_string());
                return LedgerChange::Unresolved;
            }
        };

        let result = if dry_run {
            self.ledger.preview_decrement(&identity).await
        } else {
            self.ledger.decrement(&identity).await
        };

        match result {
            Ok(change) => change,
            Err(e) => {
                warn!(user = %user, identity = %identity, error = %e, "Ledger update failed");
                report.issues.push(e.to_string());
                LedgerChange::Unchanged
            }
        }
    }
}

fn log_report(report: &StationReport) {
    let name = report.name.as_deref().unwrap_or("-");
    let user = report
        .user
        .as_ref()
        .map(LoginName::as_str)
        .unwrap_or("-");
    let pid = report
        .pid
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    if report.is_clean() {
        info!(
            station = %report.station,
            name = %name,
            user = %user,
            pid = %pid,
            outcome = %report.outcome,
            ledger = %report.ledger,
            dry_run = report.dry_run,
            "Station reconciled"
        );
    } else {
        warn!(
            station = %report.station,
            name = %name,
            user = %user,
            pid = %pid,
            outcome = %report.outcome,
            ledger = %report.ledger,
            issues = ?report.issues,
            dry_run = report.dry_run,
            "Station reconciled with issues"
        );
    }
}
