//! # stationlock-engine
//!
//! Finds workstation locks whose owning process is gone and removes them,
//! keeping the per-user Counter Ledger consistent.
//!
//! - [`resolver`]: station name → station ID lookups against the admin store.
//! - [`inventory`]: workstation locks and their Session-ID Artifacts.
//! - [`liveness`]: process table probes and termination signals.
//! - [`identity`]: adapters for the external identity codec.
//! - [`ledger`]: per-user open-session counters.
//! - [`reconciler`]: the per-station reconciliation algorithm and batch mode.

pub mod identity;
pub mod inventory;
pub mod ledger;
pub mod liveness;
pub mod reconciler;
pub mod resolver;

pub use identity::{CommandIdentityCodec, PassthroughIdentityCodec, StaticIdentityCodec};
pub use inventory::{LockInventory, SessionArtifact};
pub use ledger::{CounterLedger, LedgerChange};
pub use liveness::MockProcessTable;
pub use reconciler::{
    BatchReport, ReconcileOptions, Reconciler, StationFailure, StationReport, StationState,
    StationStatus,
};
pub use resolver::StationResolver;
