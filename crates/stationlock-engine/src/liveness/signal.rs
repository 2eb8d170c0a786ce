//! Signal-based liveness probe and termination.

use std::io;

use async_trait::async_trait;
use tracing::{info, warn};

use stationlock_core::config::liveness::TerminateSignal;
use stationlock_core::error::{AppError, ErrorKind};
use stationlock_core::traits::{LivenessOracle, ProcessSignaller};
use stationlock_core::types::Pid;

/// Probes a PID with signal 0.
///
/// `EPERM` means the process exists but belongs to another user, so it
/// counts as alive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalProbeOracle;

#[async_trait]
impl LivenessOracle for SignalProbeOracle {
    async fn is_alive(&self, pid: Pid) -> bool {
        process_exists(pid)
    }
}

/// Sends the configured termination signal with `kill(2)`.
///
/// A process that is already gone (`ESRCH`) yields a `NotFound` error.
#[derive(Debug, Clone, Copy)]
pub struct LibcSignaller {
    /// Signal sent on the force path.
    signal: TerminateSignal,
}

impl LibcSignaller {
    /// Creates a signaller for `signal`.
    pub fn new(signal: TerminateSignal) -> Self {
        Self { signal }
    }
}

#[async_trait]
impl ProcessSignaller for LibcSignaller {
    async fn terminate(&self, pid: Pid) -> Result<(), AppError> {
        match send_signal(pid, self.signal) {
            Ok(()) => {
                info!(pid = %pid, signal = %self.signal, "Termination signal sent");
                Ok(())
            }
            Err(e) if is_no_such_process(&e) => {
                info!(pid = %pid, "Process exited before it could be signalled");
                Err(AppError::with_source(
                    ErrorKind::NotFound,
                    format!("PID {pid} no longer exists"),
                    e,
                ))
            }
            Err(e) => {
                warn!(pid = %pid, signal = %self.signal, error = %e, "Failed to signal process");
                Err(AppError::with_source(
                    ErrorKind::Signal,
                    format!("Failed to send {} to PID {pid}: {e}", self.signal),
                    e,
                ))
            }
        }
    }
}

#[cfg(unix)]
fn raw_pid(pid: Pid) -> Option<libc::pid_t> {
    libc::pid_t::try_from(pid.as_u32()).ok().filter(|p| *p > 0)
}

#[cfg(unix)]
fn process_exists(pid: Pid) -> bool {
    let Some(raw) = raw_pid(pid) else {
        return false;
    };
    // SAFETY: kill(pid, 0) probes process existence without sending a signal.
    unsafe {
        if libc::kill(raw, 0) == 0 {
            return true;
        }
    }
    matches!(
        io::Error::last_os_error().raw_os_error(),
        Some(code) if code == libc::EPERM
    )
}

#[cfg(unix)]
fn send_signal(pid: Pid, signal: TerminateSignal) -> io::Result<()> {
    let raw = raw_pid(pid)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "PID out of range"))?;
    let signo = match signal {
        TerminateSignal::Term => libc::SIGTERM,
        TerminateSignal::Kill => libc::SIGKILL,
    };
    // SAFETY: `libc::kill` takes plain integers; errno is read immediately
    // after the call on this thread.
    let rc = unsafe { libc::kill(raw, signo) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn is_no_such_process(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn is_no_such_process(_e: &io::Error) -> bool {
    false
}

#[cfg(not(unix))]
fn process_exists(_pid: Pid) -> bool {
    true
}

#[cfg(not(unix))]
fn send_signal(_pid: Pid, _signal: TerminateSignal) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "process signals are only supported on Unix",
    ))
}
