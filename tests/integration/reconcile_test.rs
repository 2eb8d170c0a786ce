//! Single-station reconciliation tests against a temporary lock tree.

mod helpers;

use helpers::TestEnv;
use stationlock_core::config::AppConfig;
use stationlock_core::error::ErrorKind;
use stationlock_core::types::Outcome;
use stationlock_engine::{LedgerChange, ReconcileOptions, Reconciler, StationState};

const FORCE: ReconcileOptions = ReconcileOptions {
    force_kill: true,
    dry_run: false,
};

#[tokio::test]
async fn test_dead_session_is_cleaned() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "2307", 9999, false);
    env.set_ledger("BV", 2);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("2307"), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::CleanedDead);
    assert_eq!(report.name.as_deref(), Some("FRONT-DESK"));
    assert_eq!(report.user.as_ref().map(|u| u.as_str()), Some("MEACIRC"));
    assert_eq!(report.pid.map(|p| p.as_u32()), Some(9999));
    assert_eq!(report.ledger, LedgerChange::Decremented { from: 2, to: 1 });
    assert!(report.is_clean());

    assert!(!env.has_lock("2307"));
    assert!(!env.has_session("MEACIRC", "2307"));
    assert_eq!(env.ledger("BV"), Some(1));
}

#[tokio::test]
async fn test_last_session_deletes_ledger_entry() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "2307", 9999, false);
    env.set_ledger("BV", 1);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("2307"), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.ledger, LedgerChange::Removed { from: 1 });
    assert_eq!(env.ledger("BV"), None);
}

#[tokio::test]
async fn test_missing_ledger_entry_is_not_an_error() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "2307", 9999, false);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("2307"), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::CleanedDead);
    assert_eq!(report.ledger, LedgerChange::Missing);
    assert!(report.is_clean());
    assert_eq!(env.ledger("BV"), None);
}

#[tokio::test]
async fn test_headless_lock_is_cleaned() {
    let env = TestEnv::new().await;
    env.lock("4010");
    env.set_ledger("BV", 1);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("4010"), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::CleanedHeadless);
    assert_eq!(report.user, None);
    assert!(!env.has_lock("4010"));
    assert_eq!(env.ledger("BV"), Some(1));
}

#[tokio::test]
async fn test_second_run_finds_no_lock() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "2307", 9999, false);
    env.set_ledger("BV", 2);
    let station = TestEnv::station("2307");

    let first = env
        .reconciler
        .reconcile(&station, ReconcileOptions::default())
        .await
        .unwrap();
    let second = env
        .reconciler
        .reconcile(&station, ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(first.outcome, Outcome::CleanedDead);
    assert_eq!(second.outcome, Outcome::NoLock);
    assert_eq!(second.ledger, LedgerChange::Unchanged);
    assert_eq!(env.ledger("BV"), Some(1));
}

#[tokio::test]
async fn test_live_session_is_preserved_by_default() {
    let env = TestEnv::new().await;
    env.connect("JDOE", "22", 4242, true);
    env.set_ledger("GQK", 1);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("22"), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::LivePreserved);
    assert!(!report.signalled);
    assert!(env.table.signalled().is_empty());
    assert!(env.has_lock("22"));
    assert!(env.has_session("JDOE", "22"));
    assert_eq!(env.ledger("GQK"), Some(1));
}

#[tokio::test]
async fn test_force_terminates_and_cleans() {
    let env = TestEnv::new().await;
    env.connect("JDOE", "22", 4242, true);
    env.set_ledger("GQK", 2);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("22"), FORCE)
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::LiveButForced);
    assert!(report.signalled);
    let signalled: Vec<u32> = env.table.signalled().iter().map(|p| p.as_u32()).collect();
    assert_eq!(signalled, vec![4242]);
    assert!(!env.has_lock("22"));
    assert!(!env.has_session("JDOE", "22"));
    assert_eq!(env.ledger("GQK"), Some(1));
}

#[tokio::test]
async fn test_force_on_dead_session_sends_no_signal() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "2307", 9999, false);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("2307"), FORCE)
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::CleanedDead);
    assert!(env.table.signalled().is_empty());
}

#[tokio::test]
async fn test_refused_signal_still_clears_lock() {
    let env = TestEnv::new().await;
    env.connect("JDOE", "22", 4242, true);
    env.set_ledger("GQK", 2);
    env.table.refuse_signals(true);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("22"), FORCE)
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::LiveButForced);
    assert!(!report.signalled);
    assert_eq!(report.issues.len(), 1);
    assert!(!env.has_lock("22"));
    assert!(!env.has_session("JDOE", "22"));
    assert_eq!(env.ledger("GQK"), Some(1));
}

#[tokio::test]
async fn test_owner_exiting_during_force_is_cleaned_as_dead() {
    let env = TestEnv::new().await;
    env.connect("JDOE", "22", 4242, true);
    env.set_ledger("GQK", 1);
    env.table.exit_before_signal(4242);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("22"), FORCE)
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::CleanedDead);
    assert!(report.is_clean());
    assert!(env.table.signalled().is_empty());
    assert!(!env.has_lock("22"));
    assert_eq!(env.ledger("GQK"), None);
}

#[tokio::test]
async fn test_foreign_file_is_never_targeted() {
    let env = TestEnv::new().await;
    env.lock("README");

    let err = env
        .reconciler
        .reconcile(&TestEnv::station("README"), FORCE)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(env.has_lock("README"));

    let batch = env
        .reconciler
        .reconcile_many(&[TestEnv::station("README")], ReconcileOptions::default())
        .await;
    assert!(batch.reports.is_empty());
    assert_eq!(batch.failures.len(), 1);
    assert!(env.has_lock("README"));
}

#[tokio::test]
async fn test_garbled_pid_cleans_with_decrement() {
    let env = TestEnv::new().await;
    env.lock("33");
    env.session("MEACIRC", "33", "not-a-pid\n");
    env.set_ledger("BV", 3);

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("33"), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::CleanedDead);
    assert_eq!(report.pid, None);
    assert!(!env.has_lock("33"));
    assert!(!env.has_session("MEACIRC", "33"));
    assert_eq!(env.ledger("BV"), Some(2));
}

#[tokio::test]
async fn test_artifact_for_other_station_is_ignored() {
    let env = TestEnv::new().await;
    env.lock("11");
    env.session("MEACIRC", "110", "9999");

    let report = env
        .reconciler
        .reconcile(&TestEnv::station("11"), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::CleanedHeadless);
    assert!(env.has_session("MEACIRC", "110"));
}

#[tokio::test]
async fn test_inspect_reports_without_changes() {
    let env = TestEnv::new().await;
    env.connect("JDOE", "22", 4242, true);
    env.connect("MEACIRC", "2307", 9999, false);

    let live = env
        .reconciler
        .inspect(&TestEnv::station("22"))
        .await
        .unwrap();
    let dead = env
        .reconciler
        .inspect(&TestEnv::station("2307"))
        .await
        .unwrap();
    let none = env
        .reconciler
        .inspect(&TestEnv::station("33"))
        .await
        .unwrap();

    assert_eq!(live.state, StationState::Alive);
    assert_eq!(dead.state, StationState::Dead);
    assert_eq!(none.state, StationState::NoLock);
    assert_eq!(live.name.as_deref(), Some("ACCT-EAST-2"));
    assert!(env.has_lock("2307"));
}

#[tokio::test]
async fn test_config_wiring_uses_process_table_dir() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "11", 700, false);
    env.connect("MEACIRC", "22", 800, false);
    env.spawn_procfs(800);
    env.set_ledger("MEACIRC", 2);

    let config: &AppConfig = &env.config;
    let reconciler = Reconciler::from_config(config);
    let batch = reconciler
        .reconcile_all(ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(
        batch.outcomes(),
        vec![Outcome::CleanedDead, Outcome::LivePreserved]
    );
    assert!(!env.has_lock("11"));
    assert!(env.has_lock("22"));
    // Without identity commands the login name is the ledger key.
    assert_eq!(env.ledger("MEACIRC"), Some(1));
}
