//! End-to-end catalog scenarios over a durable SQLite store
//!
//! These tests verify:
//! - Startup population (planets, then launches) and restart behaviour
//! - Idempotent re-runs under both synchronization policies
//! - Flight numbering after synchronized launches
//! - Abort semantics and pagination over mixed launch sources

use orbital_catalog::{
    Catalog, CsvRowSource, LaunchStore, NewLaunch, Page, Pagination, PlanetStore, ScheduleError,
    SqliteStore, SyncError, SyncOutcome,
};
use orbital_core::{RowErrorPolicy, SyncPolicy};
use std::sync::Arc;

use crate::test_utils::{
    remote_launch, remote_launches, remove_db, temp_db_path, ScriptedFeed, HABITABLE_NAMES,
    KEPLER_CSV,
};

fn kepler_rows() -> CsvRowSource<&'static [u8]> {
    CsvRowSource::from_reader(KEPLER_CSV.as_bytes()).unwrap()
}

fn new_launch(target: &str) -> NewLaunch {
    NewLaunch {
        mission: "Kepler Exploration X".to_string(),
        rocket: "Explorer IS1".to_string(),
        launch_date: chrono::DateTime::parse_from_rfc3339("2030-12-27T00:00:00+00:00").unwrap(),
        target: target.to_string(),
    }
}

async fn bootstrap(catalog: &Catalog, feed: Arc<ScriptedFeed>, policy: SyncPolicy) -> SyncOutcome {
    catalog
        .planet_loader(RowErrorPolicy::Continue)
        .load(kepler_rows())
        .await
        .unwrap();
    catalog
        .synchronizer(feed, policy)
        .synchronize()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_node_lifecycle_with_restart() {
    let db_path = temp_db_path("lifecycle");
    let feed = Arc::new(ScriptedFeed::new(200, remote_launches()));

    // Phase 1: first start populates both collections
    {
        let store = Arc::new(SqliteStore::open(&db_path).unwrap());
        let catalog = Catalog::new(store.clone());

        let outcome = bootstrap(&catalog, feed.clone(), SyncPolicy::SkipIfBootstrapped).await;
        assert_eq!(outcome, SyncOutcome::Synchronized { upserted: 5 });

        let planets: Vec<String> = catalog
            .list_planets()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.kepler_name)
            .collect();
        assert_eq!(planets, HABITABLE_NAMES);

        // flight numbers continue after the highest synchronized launch
        let launch = catalog.schedule_launch(new_launch("Kepler-442 b")).await.unwrap();
        assert_eq!(launch.flight_number, 188);
    }

    // Phase 2: restart finds the sentinel and skips the feed
    {
        let store = Arc::new(SqliteStore::open(&db_path).unwrap());
        let catalog = Catalog::new(store.clone());

        let outcome = bootstrap(&catalog, feed.clone(), SyncPolicy::SkipIfBootstrapped).await;
        assert_eq!(outcome, SyncOutcome::Skipped);
        assert_eq!(feed.calls(), 1);

        assert_eq!(store.count_planets().await.unwrap(), 3);
        assert_eq!(store.count_launches().await.unwrap(), 6);

        let scheduled = store.find_launch(188).await.unwrap().unwrap();
        assert_eq!(scheduled.target.as_deref(), Some("Kepler-442 b"));
        assert_eq!(scheduled.customers, vec!["NASA", "PPHI"]);

        let next = catalog.schedule_launch(new_launch("Kepler-62 f")).await.unwrap();
        assert_eq!(next.flight_number, 189);
    }

    remove_db(&db_path);
}

#[tokio::test]
async fn test_full_resync_picks_up_new_remote_launches() {
    let db_path = temp_db_path("resync");
    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    let catalog = Catalog::new(store.clone());
    let feed = Arc::new(ScriptedFeed::new(200, remote_launches()));

    bootstrap(&catalog, feed.clone(), SyncPolicy::FullResync).await;
    let before = store.find_launches(Page::all()).await.unwrap();

    // unchanged remote set: same documents, same count
    bootstrap(&catalog, feed.clone(), SyncPolicy::FullResync).await;
    assert_eq!(store.find_launches(Page::all()).await.unwrap(), before);
    assert_eq!(store.count_planets().await.unwrap(), 3);

    feed.push(remote_launch(188, "Crew-6", true, &["NASA (CCP)"]));
    let outcome = bootstrap(&catalog, feed.clone(), SyncPolicy::FullResync).await;
    assert_eq!(outcome, SyncOutcome::Synchronized { upserted: 6 });
    assert_eq!(store.count_launches().await.unwrap(), 6);

    remove_db(&db_path);
}

#[tokio::test]
async fn test_resync_does_not_clobber_scheduled_target() {
    let db_path = temp_db_path("clobber");
    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    let catalog = Catalog::new(store.clone());

    catalog
        .planet_loader(RowErrorPolicy::Continue)
        .load(kepler_rows())
        .await
        .unwrap();
    let scheduled = catalog.schedule_launch(new_launch("Kepler-62 f")).await.unwrap();
    assert_eq!(scheduled.flight_number, 100);

    // the remote feed later publishes its own flight 100
    let feed = Arc::new(ScriptedFeed::new(
        200,
        vec![remote_launch(100, "Remote Mission", false, &["SES"])],
    ));
    catalog
        .synchronizer(feed, SyncPolicy::FullResync)
        .synchronize()
        .await
        .unwrap();

    let stored = store.find_launch(100).await.unwrap().unwrap();
    assert_eq!(stored.mission, "Remote Mission");
    assert_eq!(stored.target.as_deref(), Some("Kepler-62 f"));

    remove_db(&db_path);
}

#[tokio::test]
async fn test_failed_feed_is_fatal_and_writes_nothing() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let catalog = Catalog::new(store.clone());
    let feed = Arc::new(ScriptedFeed::new(500, remote_launches()));

    let err = catalog
        .synchronizer(feed, SyncPolicy::SkipIfBootstrapped)
        .synchronize()
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::FailedStatus { status: 500 }));
    assert_eq!(store.count_launches().await.unwrap(), 0);
}

#[tokio::test]
async fn test_schedule_abort_and_query() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let catalog = Catalog::new(store.clone());
    catalog
        .planet_loader(RowErrorPolicy::Continue)
        .load(kepler_rows())
        .await
        .unwrap();

    let err = catalog
        .schedule_launch(new_launch("Kepler-227 b"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownTarget { .. }));
    assert_eq!(store.count_launches().await.unwrap(), 0);

    for target in HABITABLE_NAMES.iter().cycle().take(12) {
        catalog.schedule_launch(new_launch(target)).await.unwrap();
    }

    let all = catalog.list_launches(Pagination::new(1, 0)).await.unwrap();
    let numbers: Vec<i64> = all.iter().map(|l| l.flight_number).collect();
    assert_eq!(numbers, (100..112).collect::<Vec<_>>());

    let second_page = catalog.list_launches(Pagination::new(2, 10)).await.unwrap();
    let numbers: Vec<i64> = second_page.iter().map(|l| l.flight_number).collect();
    assert_eq!(numbers, vec![110, 111]);

    assert!(catalog.abort_launch(100).await.unwrap());
    let aborted = store.find_launch(100).await.unwrap().unwrap();
    assert!(!aborted.upcoming);
    assert_eq!(aborted.success, Some(false));

    assert!(!catalog.abort_launch(999).await.unwrap());
    assert!(!catalog.launch_exists(999).await.unwrap());
    assert_eq!(store.count_launches().await.unwrap(), 12);
}
