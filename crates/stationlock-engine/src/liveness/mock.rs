//! Scripted process table for development and testing.
//!
//! Simulates liveness and termination without touching real processes.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use stationlock_core::error::AppError;
use stationlock_core::traits::{LivenessOracle, ProcessSignaller};
use stationlock_core::types::Pid;

/// In-memory process table that records every termination request.
#[derive(Debug, Default)]
pub struct MockProcessTable {
    /// PIDs reported as alive.
    alive: Mutex<HashSet<Pid>>,
    /// PIDs that were sent a termination signal, in order.
    signalled: Mutex<Vec<Pid>>,
    /// When set, termination requests fail.
    refuse_signals: Mutex<bool>,
    /// PIDs that exit on their own just before a signal reaches them.
    exiting: Mutex<HashSet<Pid>>,
}

impl MockProcessTable {
    /// Creates an empty table: every PID reads as dead.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `pid` as alive.
    pub fn spawn(&self, pid: u32) {
        if let Some(pid) = Pid::new(pid) {
            self.alive
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(pid);
        }
    }

    /// Marks a live `pid` as exiting by itself before it can be signalled.
    pub fn exit_before_signal(&self, pid: u32) {
        if let Some(pid) = Pid::new(pid) {
            self.exiting
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(pid);
        }
    }

    /// Makes subsequent termination requests fail.
    pub fn refuse_signals(&self, refuse: bool) {
        *self
            .refuse_signals
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = refuse;
    }

    /// PIDs that received a termination signal, in order.
    pub fn signalled(&self) -> Vec<Pid> {
        self.signalled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LivenessOracle for MockProcessTable {
    async fn is_alive(&self, pid: Pid) -> bool {
        self.alive
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&pid)
    }
}

#[async_trait]
impl ProcessSignaller for MockProcessTable {
    async fn terminate(&self, pid: Pid) -> Result<(), AppError> {
        if *self
            .refuse_signals
            .lock()
            .unwrap_or_else(|e| e.into_inner())
        {
            return Err(AppError::signal(format!("Signal to PID {pid} refused")));
        }

        if self
            .exiting
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&pid)
        {
            self.alive
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&pid);
            return Err(AppError::not_found(format!("PID {pid} no longer exists")));
        }

        self.signalled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(pid);
        self.alive
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&pid);
        tracing::info!("[MockProcessTable] Terminated PID {}", pid);
        Ok(())
    }
}
