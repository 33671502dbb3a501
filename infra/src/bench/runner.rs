//! Worker dispatch for the pool benchmark

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use dt_shared::config::MySqlConfig;

use crate::database::mysql::isbn_repository_impl::{BENCH_ISBN, DEFAULT_INSERT_TIMEOUT};
use crate::database::{DatabasePool, MySqlIsbnRepository};
use crate::InfrastructureError;

use super::report::BenchReport;
use super::scenario::BenchScenario;

/// How much work one scenario performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    /// Fixed number of operations shared by all workers
    Iterations(u64),
    /// Keep going until the wall-clock time is used up
    Duration(Duration),
}

/// Benchmark run parameters, shared by every scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchSettings {
    /// Concurrent workers sharing the pool
    pub workers: usize,
    /// Work per scenario
    pub budget: Budget,
    /// Deadline for a single insert
    pub op_timeout: Duration,
    /// Value inserted by every operation
    pub isbn: String,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            budget: Budget::Iterations(1000),
            op_timeout: DEFAULT_INSERT_TIMEOUT,
            isbn: BENCH_ISBN.to_string(),
        }
    }
}

impl BenchSettings {
    pub fn validate(&self) -> Result<(), InfrastructureError> {
        if self.workers == 0 {
            return Err(InfrastructureError::Config(
                "benchmark needs at least one worker".to_string(),
            ));
        }
        match self.budget {
            Budget::Iterations(0) => Err(InfrastructureError::Config(
                "iteration budget must be positive".to_string(),
            )),
            Budget::Duration(d) if d.is_zero() => Err(InfrastructureError::Config(
                "duration budget must be positive".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Hands out operation slots to workers until the budget is spent
struct OpBudget {
    limit: Option<u64>,
    deadline: Option<Instant>,
    issued: AtomicU64,
}

impl OpBudget {
    fn start(budget: Budget, now: Instant) -> Self {
        match budget {
            Budget::Iterations(n) => Self {
                limit: Some(n),
                deadline: None,
                issued: AtomicU64::new(0),
            },
            Budget::Duration(d) => Self {
                limit: None,
                deadline: Some(now + d),
                issued: AtomicU64::new(0),
            },
        }
    }

    fn try_take(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }
        match self.limit {
            Some(limit) => self.issued.fetch_add(1, Ordering::Relaxed) < limit,
            None => true,
        }
    }
}

/// Open a pool for `scenario`, run the workers, close the pool
pub async fn run_scenario(
    config: &MySqlConfig,
    scenario: &BenchScenario,
    settings: &BenchSettings,
) -> Result<BenchReport, InfrastructureError> {
    settings.validate()?;

    tracing::info!(
        scenario = %scenario.label,
        workers = settings.workers,
        budget = ?settings.budget,
        "Starting benchmark scenario"
    );

    let pool = DatabasePool::connect(config, &scenario.pool).await?;
    let result = run_workers(&pool, &scenario.label, settings).await;
    pool.close().await;

    if let Ok(report) = &result {
        tracing::info!(
            scenario = %report.label,
            ops = report.ops,
            ops_per_sec = report.ops_per_sec(),
            "Benchmark scenario finished"
        );
    }
    result
}

/// Run every scenario in order, stopping at the first failure
pub async fn run_suite(
    config: &MySqlConfig,
    scenarios: &[BenchScenario],
    settings: &BenchSettings,
) -> Result<Vec<BenchReport>, InfrastructureError> {
    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        reports.push(run_scenario(config, scenario, settings).await?);
    }
    Ok(reports)
}

/// Run the insert workload on an already open pool
///
/// Any failed insert aborts the run and the remaining workers are cancelled.
pub async fn run_workers(
    pool: &DatabasePool,
    label: &str,
    settings: &BenchSettings,
) -> Result<BenchReport, InfrastructureError> {
    settings.validate()?;

    let repo = MySqlIsbnRepository::new(pool.get_pool().clone())
        .with_statement_timeout(settings.op_timeout);
    let start = Instant::now();
    let budget = Arc::new(OpBudget::start(settings.budget, start));
    let peak = Arc::new(AtomicU32::new(0));

    let mut workers = JoinSet::new();
    for worker in 0..settings.workers {
        let repo = repo.clone();
        let budget = budget.clone();
        let peak = peak.clone();
        let sqlx_pool = pool.get_pool().clone();
        let isbn = settings.isbn.clone();

        workers.spawn(async move {
            let mut latencies = Vec::new();
            while budget.try_take() {
                let op_start = Instant::now();
                repo.insert(&isbn).await.map_err(|e| {
                    InfrastructureError::Benchmark(format!("worker {} failed: {}", worker, e))
                })?;
                latencies.push(op_start.elapsed());
                peak.fetch_max(sqlx_pool.size(), Ordering::Relaxed);
            }
            Ok::<_, InfrastructureError>(latencies)
        });
    }

    let mut latencies = Vec::new();
    while let Some(joined) = workers.join_next().await {
        let worker_latencies = joined.map_err(|e| {
            InfrastructureError::Benchmark(format!("worker task failed: {}", e))
        })??;
        latencies.extend(worker_latencies);
    }
    let elapsed = start.elapsed();

    Ok(BenchReport::from_samples(
        label,
        pool.pool_config().to_string(),
        settings.workers,
        elapsed,
        latencies,
        peak.load(Ordering::Relaxed),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_budget_is_shared() {
        let budget = OpBudget::start(Budget::Iterations(3), Instant::now());
        let taken = (0..10).filter(|_| budget.try_take()).count();
        assert_eq!(taken, 3);
    }

    #[test]
    fn test_duration_budget_expires() {
        let budget = OpBudget::start(Budget::Duration(Duration::from_millis(1)), Instant::now());
        std::thread::sleep(Duration::from_millis(5));
        assert!(!budget.try_take());
    }

    #[test]
    fn test_settings_validation() {
        assert!(BenchSettings::default().validate().is_ok());

        let settings = BenchSettings {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(InfrastructureError::Config(_))));

        let settings = BenchSettings {
            budget: Budget::Iterations(0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = BenchSettings {
            budget: Budget::Duration(Duration::ZERO),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = BenchSettings::default();
        assert!(settings.workers >= 1);
        assert_eq!(settings.op_timeout, Duration::from_secs(3));
        assert_eq!(settings.isbn, "978-3-598-21500-1");
    }
}
