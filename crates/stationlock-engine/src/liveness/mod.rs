//! Process liveness probes and termination signalling.
//!
//! Two probes are provided:
//! - [`ProcfsOracle`] looks for `<proc_dir>/<pid>`
//! - [`SignalProbeOracle`] probes with signal 0
//!
//! [`MockProcessTable`] scripts both capabilities for tests.

pub mod mock;
pub mod procfs;
pub mod signal;

use std::sync::Arc;

use stationlock_core::config::AppConfig;
use stationlock_core::config::liveness::LivenessMethod;
use stationlock_core::traits::{LivenessOracle, ProcessSignaller};

pub use mock::MockProcessTable;
pub use procfs::ProcfsOracle;
pub use signal::{LibcSignaller, SignalProbeOracle};

/// Builds the liveness oracle selected by the configuration.
pub fn oracle_from_config(config: &AppConfig) -> Arc<dyn LivenessOracle> {
    match config.liveness.method {
        LivenessMethod::Procfs => Arc::new(ProcfsOracle::new(config.paths.proc_dir.clone())),
        LivenessMethod::Signal => Arc::new(SignalProbeOracle),
    }
}

/// Builds the termination signaller selected by the configuration.
pub fn signaller_from_config(config: &AppConfig) -> Arc<dyn ProcessSignaller> {
    Arc::new(LibcSignaller::new(config.liveness.terminate_signal))
}
