//! Command line arguments of both binaries

use clap::{Parser, ValueEnum};
use std::time::Duration;

use dt_infra::bench::{BenchSettings, Budget, Suite};

/// Walk through insert, update, query, delete and a transaction on `doctor_tb`
#[derive(Debug, Parser)]
#[command(name = "dt_tour", version, about)]
pub struct TourArgs {
    /// Create the tables before running
    #[arg(long)]
    pub migrate: bool,

    /// Run against an in-memory repository instead of MySQL
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Which pool knob to sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuiteArg {
    MaxOpen,
    MaxIdle,
    #[value(alias = "max-lifetime")]
    Lifetime,
    All,
}

impl SuiteArg {
    pub fn suites(self) -> Vec<Suite> {
        match self {
            SuiteArg::MaxOpen => vec![Suite::MaxOpen],
            SuiteArg::MaxIdle => vec![Suite::MaxIdle],
            SuiteArg::Lifetime => vec![Suite::MaxLifetime],
            SuiteArg::All => Suite::ALL.to_vec(),
        }
    }
}

/// Compare connection pool settings under a concurrent insert load
#[derive(Debug, Parser)]
#[command(name = "dt_bench", version, about)]
pub struct BenchArgs {
    /// Suite to run
    #[arg(value_enum, default_value_t = SuiteArg::All)]
    pub suite: SuiteArg,

    /// Concurrent workers (defaults to available parallelism)
    #[arg(short, long, env = "BENCH_WORKERS")]
    pub workers: Option<usize>,

    /// Inserts per scenario, shared by all workers
    #[arg(short = 'n', long, conflicts_with = "duration_secs")]
    pub iterations: Option<u64>,

    /// Run each scenario for this many seconds instead of a fixed count
    #[arg(short, long)]
    pub duration_secs: Option<u64>,

    /// Deadline for a single insert, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub op_timeout_ms: u64,

    /// Create the tables before running
    #[arg(long)]
    pub migrate: bool,

    /// Empty the `isbns` table before running
    #[arg(long)]
    pub clear: bool,

    /// Print all reports as one JSON array
    #[arg(long)]
    pub json: bool,
}

impl BenchArgs {
    /// Benchmark settings, with anything not given on the command line defaulted
    pub fn settings(&self) -> BenchSettings {
        let defaults = BenchSettings::default();
        let budget = match (self.iterations, self.duration_secs) {
            (_, Some(secs)) => Budget::Duration(Duration::from_secs(secs)),
            (Some(n), None) => Budget::Iterations(n),
            (None, None) => defaults.budget,
        };

        BenchSettings {
            workers: self.workers.unwrap_or(defaults.workers),
            budget,
            op_timeout: Duration::from_millis(self.op_timeout_ms),
            ..defaults
        }
    }
}
