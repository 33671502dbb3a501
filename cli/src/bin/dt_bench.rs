use anyhow::{Context, Result};
use clap::Parser;

use dt_cli::args::BenchArgs;
use dt_cli::tracing_setup::init_tracing;
use dt_infra::bench::run_suite;
use dt_infra::database::{DatabasePool, MySqlIsbnRepository};
use dt_shared::config::{AppConfig, PoolConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = dt_cli::load_env_files();
    let args = BenchArgs::parse();
    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;
    if let Some(path) = &env_file {
        tracing::debug!(file = %path.display(), "Loaded environment file");
    }

    let settings = args.settings();
    settings.validate()?;

    tracing::info!(
        dsn = %config.database.redacted_dsn(),
        workers = settings.workers,
        budget = ?settings.budget,
        "Starting dt_bench"
    );

    if args.migrate || args.clear {
        let pool = DatabasePool::connect(&config.database, &PoolConfig::default())
            .await
            .context("cannot open connection")?;
        if args.migrate {
            pool.run_migrations().await?;
        }
        if args.clear {
            MySqlIsbnRepository::new(pool.get_pool().clone()).clear().await?;
        }
        pool.close().await;
    }

    let mut reports = Vec::new();
    for suite in args.suite.suites() {
        if !args.json {
            println!("== {} ({} workers) ==", suite, settings.workers);
        }

        let suite_reports = run_suite(&config.database, &suite.scenarios(), &settings)
            .await
            .with_context(|| format!("suite {} failed", suite))?;
        if !args.json {
            for report in &suite_reports {
                println!("{}", report);
            }
        }
        reports.extend(suite_reports);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}
