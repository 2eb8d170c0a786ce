//! Batch and name-targeted reconciliation tests.

mod helpers;

use helpers::TestEnv;
use stationlock_core::types::{Outcome, StationId};
use stationlock_engine::{LedgerChange, ReconcileOptions};

#[tokio::test]
async fn test_batch_preserves_live_station() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "11", 1001, false);
    env.connect("JDOE", "22", 1002, true);
    env.connect("MEACIRC", "33", 1003, false);
    env.set_ledger("BV", 2);
    env.set_ledger("GQK", 1);

    let batch = env
        .reconciler
        .reconcile_all(ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(
        batch.outcomes(),
        vec![
            Outcome::CleanedDead,
            Outcome::LivePreserved,
            Outcome::CleanedDead
        ]
    );
    assert_eq!(batch.cleaned(), 2);
    assert!(batch.failures.is_empty());
    assert!(!batch.dry_run);

    assert!(!env.has_lock("11"));
    assert!(env.has_lock("22"));
    assert!(!env.has_lock("33"));
    assert_eq!(env.ledger("BV"), None);
    assert_eq!(env.ledger("GQK"), Some(1));
}

#[tokio::test]
async fn test_batch_orders_stations_numerically() {
    let env = TestEnv::new().await;
    for station in ["4010", "33", "2307", "11"] {
        env.lock(station);
    }

    let batch = env
        .reconciler
        .reconcile_all(ReconcileOptions::default())
        .await
        .unwrap();

    let order: Vec<&str> = batch.reports.iter().map(|r| r.station.as_str()).collect();
    assert_eq!(order, vec!["11", "33", "2307", "4010"]);
    assert_eq!(batch.count(Outcome::CleanedHeadless), 4);
}

#[tokio::test]
async fn test_batch_skips_foreign_files() {
    let env = TestEnv::new().await;
    env.lock("11");
    env.lock("README");
    env.lock("123456");
    env.lock("12a");

    let batch = env
        .reconciler
        .reconcile_all(ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(batch.reports.len(), 1);
    assert!(!env.has_lock("11"));
    assert!(env.has_lock("README"));
    assert!(env.has_lock("123456"));
    assert!(env.has_lock("12a"));
}

#[tokio::test]
async fn test_batch_with_empty_lock_dir() {
    let env = TestEnv::new().await;

    let batch = env
        .reconciler
        .reconcile_all(ReconcileOptions::default())
        .await
        .unwrap();

    assert!(batch.reports.is_empty());
    assert_eq!(batch.summary(), "nothing to do");
}

#[tokio::test]
async fn test_batch_force_clears_everything() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "11", 1001, true);
    env.connect("JDOE", "22", 1002, true);
    env.lock("33");

    let options = ReconcileOptions {
        force_kill: true,
        dry_run: false,
    };
    let batch = env.reconciler.reconcile_all(options).await.unwrap();

    assert_eq!(
        batch.outcomes(),
        vec![
            Outcome::LiveButForced,
            Outcome::LiveButForced,
            Outcome::CleanedHeadless
        ]
    );
    let signalled: Vec<u32> = env.table.signalled().iter().map(|p| p.as_u32()).collect();
    assert_eq!(signalled, vec![1001, 1002]);
    assert!(env.reconciler.list_connected().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_dry_run_leaves_tree_untouched() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "11", 1001, false);
    env.connect("JDOE", "22", 1002, true);
    env.set_ledger("BV", 1);

    let options = ReconcileOptions {
        force_kill: true,
        dry_run: true,
    };
    let batch = env.reconciler.reconcile_all(options).await.unwrap();

    assert!(batch.dry_run);
    assert_eq!(
        batch.outcomes(),
        vec![Outcome::CleanedDead, Outcome::LiveButForced]
    );
    assert_eq!(batch.reports[0].ledger, LedgerChange::Removed { from: 1 });
    assert!(batch.summary().starts_with("[dry run]"));

    assert!(env.table.signalled().is_empty());
    assert!(env.has_lock("11"));
    assert!(env.has_session("MEACIRC", "11"));
    assert!(env.has_lock("22"));
    assert_eq!(env.ledger("BV"), Some(1));
}

#[tokio::test]
async fn test_targeted_by_partial_name() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "11", 1001, false);
    env.connect("JDOE", "22", 1002, false);
    env.connect("MEACIRC", "33", 1003, false);

    let stations: Vec<StationId> = env
        .resolver
        .resolve("ACCT-EAST")
        .into_iter()
        .map(|r| r.id.clone())
        .collect();
    assert_eq!(stations.len(), 2);

    let batch = env
        .reconciler
        .reconcile_many(&stations, ReconcileOptions::default())
        .await;

    assert_eq!(batch.cleaned(), 2);
    assert_eq!(batch.reports[0].name.as_deref(), Some("ACCT-EAST-1"));
    assert!(!env.has_lock("11"));
    assert!(!env.has_lock("22"));
    assert!(env.has_lock("33"));
}

#[tokio::test]
async fn test_unknown_name_resolves_to_nothing() {
    let env = TestEnv::new().await;

    assert!(env.resolver.resolve("acct-east").is_empty());
    assert!(env.resolver.resolve("NOWHERE").is_empty());
}

#[tokio::test]
async fn test_targeted_station_without_lock() {
    let env = TestEnv::new().await;
    env.connect("MEACIRC", "11", 1001, false);

    let stations = vec![TestEnv::station("4010"), TestEnv::station("11")];
    let batch = env
        .reconciler
        .reconcile_many(&stations, ReconcileOptions::default())
        .await;

    assert_eq!(
        batch.outcomes(),
        vec![Outcome::NoLock, Outcome::CleanedDead]
    );
}
