//! Process table capabilities used by the reconciliation engine.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::Pid;

/// Answers whether a PID currently belongs to a running process.
///
/// A recycled PID owned by an unrelated process reads as alive; callers
/// accept that false positive.
#[async_trait]
pub trait LivenessOracle: Send + Sync + 'static {
    /// Returns `true` if a process with this PID exists.
    async fn is_alive(&self, pid: Pid) -> bool;
}

/// Delivers termination signals.
#[async_trait]
pub trait ProcessSignaller: Send + Sync + 'static {
    /// Send the configured termination signal to `pid`.
    ///
    /// Returns as soon as the signal is delivered; it does not wait for the
    /// process to exit. Fails with [`ErrorKind::NotFound`] when the process
    /// is already gone.
    ///
    /// [`ErrorKind::NotFound`]: crate::error::ErrorKind::NotFound
    async fn terminate(&self, pid: Pid) -> AppResult<()>;
}
