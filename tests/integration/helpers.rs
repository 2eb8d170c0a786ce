//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use stationlock_core::config::AppConfig;
use stationlock_core::config::paths::PathsConfig;
use stationlock_core::types::StationId;
use stationlock_engine::{
    CounterLedger, LockInventory, MockProcessTable, Reconciler, StaticIdentityCodec,
    StationResolver,
};

/// Admin record store used by every fixture.
pub const ADMIN_STORE: &str = "\
S|11|ACCT-EAST-1|A
S|22|ACCT-EAST-2|A
S|33|ACCT-WEST-1|A
S|2307|FRONT-DESK|B
S|4010|WAREHOUSE|B
";

/// Temporary lock tree with a scripted process table.
pub struct TestEnv {
    /// Keeps the tree alive for the test's duration
    pub dir: tempfile::TempDir,
    /// Configuration pointing at the tree
    pub config: AppConfig,
    /// Scripted liveness and signals
    pub table: Arc<MockProcessTable>,
    /// Admin record store loaded from the tree
    pub resolver: Arc<StationResolver>,
    /// Reconciler wired to the tree and the scripted table
    pub reconciler: Reconciler,
}

impl TestEnv {
    /// Create a new environment
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        for sub in ["admin", "locks/stations", "ledger", "proc"] {
            std::fs::create_dir_all(root.join(sub)).expect("mkdir");
        }
        std::fs::write(root.join("admin/stations"), ADMIN_STORE).expect("admin store");

        let config = AppConfig {
            paths: PathsConfig {
                admin_store: root.join("admin/stations"),
                lock_dir: root.join("locks/stations"),
                session_dir: None,
                ledger_dir: root.join("ledger"),
                proc_dir: root.join("proc"),
            },
            ..Default::default()
        };
        config.validate().expect("valid config");

        let resolver = Arc::new(
            StationResolver::load(&config.paths.admin_store)
                .await
                .expect("resolver"),
        );

        let table = Arc::new(MockProcessTable::new());
        let codec = StaticIdentityCodec::new()
            .with_user("MEACIRC", "126", "BV")
            .with_user("JDOE", "4411", "GQK");

        let reconciler = Reconciler::new(
            LockInventory::from_config(&config),
            CounterLedger::new(config.paths.ledger_dir.clone()),
            table.clone(),
            table.clone(),
            Arc::new(codec),
        )
        .with_resolver(resolver.clone());

        Self {
            dir,
            config,
            table,
            resolver,
            reconciler,
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Create a workstation lock
    pub fn lock(&self, station: &str) {
        std::fs::write(self.path("locks/stations").join(station), "1\n").expect("lock");
    }

    /// Create a session artifact `<user>.<station>` holding `pid`
    pub fn session(&self, user: &str, station: &str, pid: &str) {
        std::fs::write(self.path("locks").join(format!("{user}.{station}")), pid)
            .expect("artifact");
    }

    /// Connect a user at a station with a live or dead PID
    pub fn connect(&self, user: &str, station: &str, pid: u32, alive: bool) {
        self.lock(station);
        self.session(user, station, &pid.to_string());
        if alive {
            self.table.spawn(pid);
        }
    }

    /// Set a ledger entry
    pub fn set_ledger(&self, identity: &str, count: u32) {
        std::fs::write(self.path("ledger").join(identity), format!("{count}\n"))
            .expect("ledger");
    }

    /// Read a ledger entry
    pub fn ledger(&self, identity: &str) -> Option<i64> {
        std::fs::read_to_string(self.path("ledger").join(identity))
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    /// Whether a workstation lock exists
    pub fn has_lock(&self, station: &str) -> bool {
        self.path("locks/stations").join(station).exists()
    }

    /// Whether a session artifact exists
    pub fn has_session(&self, user: &str, station: &str) -> bool {
        self.path("locks").join(format!("{user}.{station}")).exists()
    }

    /// Create a process table entry for the procfs oracle
    pub fn spawn_procfs(&self, pid: u32) {
        std::fs::create_dir_all(self.path("proc").join(pid.to_string())).expect("proc entry");
    }

    /// Parse a station ID
    pub fn station(id: &str) -> StationId {
        StationId::parse(id).expect("station id")
    }
}
