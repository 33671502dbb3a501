//! Walkthrough service implementation

use std::sync::Arc;

use crate::errors::DomainResult;
use crate::repositories::DoctorRepository;

use super::types::{TourPlan, TourReport};

/// Runs insert, update, single-row query, multi-row query, delete and a
/// two-statement transaction, in that order, against one repository
pub struct TourService<R: DoctorRepository> {
    repository: Arc<R>,
    plan: TourPlan,
}

impl<R: DoctorRepository> TourService<R> {
    /// Create a walkthrough with the default plan
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_plan(repository, TourPlan::default())
    }

    /// Create a walkthrough with a custom plan
    pub fn with_plan(repository: Arc<R>, plan: TourPlan) -> Self {
        Self { repository, plan }
    }

    pub fn plan(&self) -> &TourPlan {
        &self.plan
    }

    /// Run every step, stopping at the first error
    pub async fn run(&self) -> DomainResult<TourReport> {
        let plan = &self.plan;
        let repo = &self.repository;

        let (name, age) = &plan.primary;
        let inserted = repo.insert(name, *age).await?;
        tracing::info!(
            id = inserted.id,
            rows_affected = inserted.rows_affected,
            "[Insert] new record"
        );

        let updated = repo.update_age(inserted.id, plan.updated_age).await?;
        tracing::info!(rows_affected = updated, "[Update] age changed");

        let doctor = repo.get_by_id(inserted.id).await?;
        tracing::info!(doctor = %doctor, "[QueryRow] query result");
        tracing::info!(age = doctor.age, "Doctor age updated");

        let (name, age) = &plan.secondary;
        repo.insert(name, *age).await?;

        let older = repo.find_older_than(plan.older_than).await?;
        tracing::info!(
            older_than = plan.older_than,
            count = older.len(),
            "[QueryMultipleRow] query result"
        );

        let deleted = repo.delete(inserted.id).await?;
        tracing::info!(rows_affected = deleted, "[Delete] record removed");

        for (name, age) in &plan.transaction_pair {
            repo.insert(name, *age).await?;
        }

        let [(first, _), (second, _)] = &plan.transaction_pair;
        let transaction = repo.increment_ages_atomically(first, second).await?;
        if transaction.is_committed() {
            tracing::info!(?transaction, "[Transaction] commit success");
        } else {
            tracing::warn!(?transaction, "[Transaction] rollback success");
        }

        Ok(TourReport {
            primary_id: inserted.id,
            updated_age: doctor.age,
            older_count: older.len(),
            deleted_rows: deleted,
            transaction,
        })
    }
}
