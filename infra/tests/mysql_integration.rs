//! Integration tests for the MySQL repositories and the pool benchmark
//!
//! Point `DB_ADDR`, `DB_NAME`, `DB_USER` and `DB_PASSWORD` at a scratch
//! database and run with `--ignored`.

use std::time::Duration;

use dt_core::domain::entities::doctor::{Sex, TransactionOutcome};
use dt_core::repositories::DoctorRepository;
use dt_core::services::TourService;
use dt_infra::bench::{run_scenario, run_suite, run_workers, BenchScenario, BenchSettings, Budget};
use dt_infra::database::{DatabasePool, MySqlDoctorRepository, MySqlIsbnRepository};
use dt_shared::config::{MySqlConfig, PoolConfig};

async fn setup_pool(pool_config: PoolConfig) -> DatabasePool {
    let pool = DatabasePool::connect(&MySqlConfig::from_env(), &pool_config)
        .await
        .expect("Failed to connect to MySQL");
    pool.run_migrations().await.expect("Failed to run migrations");
    pool
}

fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_doctor_crud_roundtrip() {
    let pool = setup_pool(PoolConfig::default().with_max_open(2)).await;
    let repo = MySqlDoctorRepository::new(pool.get_pool().clone());
    let name = unique_name("Dr.Lin");

    let inserted = repo.insert(&name, 40).await.unwrap();
    assert_eq!(inserted.rows_affected, 1);
    assert!(inserted.id > 0);

    let doctor = repo.get_by_id(inserted.id).await.unwrap();
    assert_eq!(doctor.name, name);
    assert_eq!(doctor.age, 40);
    assert_eq!(doctor.sex, Sex::Female);

    assert_eq!(repo.update_age(inserted.id, 20).await.unwrap(), 1);
    let doctor = repo.find_by_id(inserted.id).await.unwrap().unwrap();
    assert_eq!(doctor.age, 20);

    let older = repo.find_older_than(18).await.unwrap();
    assert!(older.iter().any(|d| d.id == inserted.id));
    assert!(older.iter().all(|d| d.age > 18));

    assert_eq!(repo.delete(inserted.id).await.unwrap(), 1);
    assert!(repo.find_by_id(inserted.id).await.unwrap().is_none());
    assert_eq!(repo.delete(inserted.id).await.unwrap(), 0);

    pool.close().await;
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_transaction_commits_and_rolls_back() {
    let pool = setup_pool(PoolConfig::default()).await;
    let repo = MySqlDoctorRepository::new(pool.get_pool().clone());
    let first = unique_name("Dr.Huang");
    let second = unique_name("Dr.Chen");

    let a = repo.insert(&first, 40).await.unwrap();
    let b = repo.insert(&second, 20).await.unwrap();

    let outcome = repo.increment_ages_atomically(&first, &second).await.unwrap();
    assert_eq!(outcome, TransactionOutcome::Committed { first: 1, second: 1 });
    assert_eq!(repo.get_by_id(a.id).await.unwrap().age, 41);
    assert_eq!(repo.get_by_id(b.id).await.unwrap().age, 21);

    // Second name matches nothing, so the first update is undone
    let missing = unique_name("Dr.Nobody");
    let outcome = repo.increment_ages_atomically(&first, &missing).await.unwrap();
    assert!(!outcome.is_committed());
    assert_eq!(repo.get_by_id(a.id).await.unwrap().age, 41);

    repo.delete(a.id).await.unwrap();
    repo.delete(b.id).await.unwrap();
    pool.close().await;
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_tour_against_mysql() {
    let pool = setup_pool(PoolConfig::default().with_max_open(10)).await;
    let repo = std::sync::Arc::new(MySqlDoctorRepository::new(pool.get_pool().clone()));

    let report = TourService::new(repo).run().await.unwrap();
    assert!(report.primary_id > 0);
    assert_eq!(report.updated_age, 20);
    assert_eq!(report.deleted_rows, 1);

    pool.close().await;
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_max_open_is_respected_under_load() {
    let config = MySqlConfig::from_env();
    setup_pool(PoolConfig::default()).await.close().await;

    let scenario = BenchScenario::new("max_open=2", PoolConfig::default().with_max_open(2));
    let settings = BenchSettings {
        workers: 8,
        budget: Budget::Iterations(200),
        ..Default::default()
    };

    let report = run_scenario(&config, &scenario, &settings).await.unwrap();
    assert_eq!(report.ops, 200);
    assert!(report.peak_connections <= 2);
    assert!(report.p99_latency >= report.p50_latency);
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_isbn_repository_count_and_clear() {
    let pool = setup_pool(PoolConfig::default()).await;
    let repo = MySqlIsbnRepository::new(pool.get_pool().clone())
        .with_statement_timeout(Duration::from_secs(3));

    // Other tests insert into the same table concurrently, so only lower bounds hold
    let before = repo.count().await.unwrap();
    assert_eq!(repo.insert("978-0-00-000000-0").await.unwrap(), 1);
    assert!(repo.count().await.unwrap() > before);

    assert!(repo.clear().await.unwrap() >= 1);

    pool.close().await;
}

/// Run the insert load on a pool with the given idle cap and return the
/// idle count once every connection has been handed back
async fn idle_after_load(max_idle: u32) -> usize {
    let pool = setup_pool(PoolConfig::default().with_max_open(8).with_max_idle(max_idle)).await;
    let settings = BenchSettings {
        workers: 8,
        budget: Budget::Iterations(400),
        ..Default::default()
    };

    let report = run_workers(&pool, "idle-cap", &settings).await.unwrap();
    assert_eq!(report.ops, 400);

    // Connections go back to the pool on a background task
    tokio::time::sleep(Duration::from_millis(500)).await;
    let idle = pool.statistics().idle_connections;
    pool.close().await;
    idle
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_max_idle_caps_idle_connections() {
    assert!(idle_after_load(1).await <= 1);
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_zero_max_idle_keeps_no_idle_connections() {
    assert_eq!(idle_after_load(0).await, 0);
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_run_suite_reports_every_scenario() {
    let config = MySqlConfig::from_env();
    setup_pool(PoolConfig::default()).await.close().await;

    let scenarios = vec![
        BenchScenario::new("max_open=1", PoolConfig::default().with_max_open(1)),
        BenchScenario::new("max_idle=0", PoolConfig::default().with_max_idle(0)),
    ];
    let settings = BenchSettings {
        workers: 4,
        budget: Budget::Iterations(50),
        ..Default::default()
    };

    let reports = run_suite(&config, &scenarios, &settings).await.unwrap();
    let labels: Vec<_> = reports.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["max_open=1", "max_idle=0"]);
    assert_eq!(reports[0].peak_connections, 1);
    assert!(reports.iter().all(|r| r.ops == 50));
}
