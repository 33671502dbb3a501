use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use dt_cli::args::TourArgs;
use dt_cli::tracing_setup::init_tracing;
use dt_core::repositories::{DoctorRepository, MockDoctorRepository};
use dt_core::services::{TourReport, TourService};
use dt_infra::database::{DatabasePool, MySqlDoctorRepository};
use dt_shared::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = dt_cli::load_env_files();
    let args = TourArgs::parse();
    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;
    if let Some(path) = &env_file {
        tracing::debug!(file = %path.display(), "Loaded environment file");
    }

    tracing::info!(environment = %config.environment, "Starting dt_tour");

    let report = if args.dry_run {
        tracing::info!("Dry run against the in-memory repository");
        run_tour(Arc::new(MockDoctorRepository::new())).await?
    } else {
        let pool = DatabasePool::connect(&config.database, &config.pool)
            .await
            .context("cannot open connection")?;

        if args.migrate {
            pool.run_migrations().await?;
        }

        let repository = MySqlDoctorRepository::new(pool.get_pool().clone())
            .with_statement_timeout(config.database.statement_timeout());
        let result = run_tour(Arc::new(repository)).await;

        tracing::info!("{}", pool.statistics());
        pool.close().await;
        result?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("id of first doctor: {}", report.primary_id);
        println!("age after update:   {}", report.updated_age);
        println!("doctors over 18:    {}", report.older_count);
        println!("rows deleted:       {}", report.deleted_rows);
        println!("transaction:        {:?}", report.transaction);
    }

    Ok(())
}

async fn run_tour<R: DoctorRepository>(repository: Arc<R>) -> Result<TourReport> {
    TourService::new(repository)
        .run()
        .await
        .context("walkthrough failed")
}
