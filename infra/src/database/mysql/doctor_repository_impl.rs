//! MySQL implementation of the DoctorRepository trait.
//!
//! Every method issues exactly one statement against `doctor_tb` (two for
//! the transaction) and is bounded by the configured statement timeout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use std::time::Duration;

use dt_core::domain::entities::doctor::{Doctor, InsertOutcome, Sex, TransactionOutcome};
use dt_core::errors::DomainError;
use dt_core::repositories::DoctorRepository;
use dt_shared::config::MySqlConfig;

use super::with_deadline;

const SELECT_COLUMNS: &str = "SELECT id, name, age, sex, addTime FROM doctor_tb";

/// MySQL implementation of DoctorRepository
pub struct MySqlDoctorRepository {
    /// Database connection pool
    pool: MySqlPool,
    /// Upper bound for a single statement
    statement_timeout: Duration,
}

impl MySqlDoctorRepository {
    /// Create a new MySQL doctor repository
    ///
    /// Statements are bounded by the default read + write timeout.
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            statement_timeout: MySqlConfig::default().statement_timeout(),
        }
    }

    /// Override the per-statement timeout
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Convert database row to Doctor entity
    fn row_to_doctor(row: &sqlx::mysql::MySqlRow) -> Result<Doctor, DomainError> {
        let sex_code: i8 = row.try_get("sex")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get sex: {}", e) })?;

        Ok(Doctor {
            id: row.try_get("id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?,
            name: row.try_get("name")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get name: {}", e) })?,
            age: row.try_get("age")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get age: {}", e) })?,
            sex: Sex::try_from(sex_code)?,
            add_time: row.try_get::<DateTime<Utc>, _>("addTime")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get addTime: {}", e) })?,
        })
    }
}

#[async_trait]
impl DoctorRepository for MySqlDoctorRepository {
    async fn insert(&self, name: &str, age: i32) -> Result<InsertOutcome, DomainError> {
        let query = "INSERT INTO doctor_tb (name, age, sex, addTime) VALUES (?, ?, ?, NOW())";

        let result = with_deadline(
            self.statement_timeout,
            "[Insert] insert data",
            sqlx::query(query)
                .bind(name)
                .bind(age)
                .bind(Sex::Female.code())
                .execute(&self.pool),
        )
        .await?;

        let outcome = InsertOutcome {
            id: result.last_insert_id() as i64,
            rows_affected: result.rows_affected(),
        };

        tracing::debug!(
            id = outcome.id,
            rows_affected = outcome.rows_affected,
            "[Insert] ID for new record"
        );

        Ok(outcome)
    }

    async fn update_age(&self, id: i64, age: i32) -> Result<u64, DomainError> {
        let result = with_deadline(
            self.statement_timeout,
            "[Update] update data",
            sqlx::query("UPDATE doctor_tb SET age = ? WHERE id = ?")
                .bind(age)
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        tracing::debug!(id, rows_affected = result.rows_affected(), "[Update] rows affected");
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, DomainError> {
        let result = with_deadline(
            self.statement_timeout,
            "[Delete] delete data",
            sqlx::query("DELETE FROM doctor_tb WHERE id = ?")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        tracing::debug!(id, rows_affected = result.rows_affected(), "[Delete] rows affected");
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Doctor>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = with_deadline(
            self.statement_timeout,
            "[QueryRow] query row",
            sqlx::query(&query).bind(id).fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(Self::row_to_doctor).transpose()
    }

    async fn find_older_than(&self, age: i32) -> Result<Vec<Doctor>, DomainError> {
        let query = format!("{} WHERE age > ? ORDER BY id", SELECT_COLUMNS);

        let rows = with_deadline(
            self.statement_timeout,
            "[QueryMultipleRow] query multiple rows",
            sqlx::query(&query).bind(age).fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(Self::row_to_doctor).collect()
    }

    async fn increment_ages_atomically(
        &self,
        first_name: &str,
        second_name: &str,
    ) -> Result<TransactionOutcome, DomainError> {
        let query = "UPDATE doctor_tb SET age = age + 1 WHERE name = ?";
        let limit = self.statement_timeout;

        // Dropping `tx` on an early return rolls the transaction back.
        let mut tx = with_deadline(limit, "[Transaction] begin", self.pool.begin()).await?;

        let first = with_deadline(
            limit,
            "[Transaction] first update",
            sqlx::query(query).bind(first_name).execute(&mut *tx),
        )
        .await?
        .rows_affected();

        let second = with_deadline(
            limit,
            "[Transaction] second update",
            sqlx::query(query).bind(second_name).execute(&mut *tx),
        )
        .await?
        .rows_affected();

        let outcome = TransactionOutcome::from_rows_affected(first, second);
        if outcome.is_committed() {
            with_deadline(limit, "[Transaction] commit", tx.commit()).await?;
            tracing::debug!(first, second, "[Transaction] commit success");
        } else {
            with_deadline(limit, "[Transaction] rollback", tx.rollback()).await?;
            tracing::debug!(first, second, "[Transaction] rollback success");
        }

        Ok(outcome)
    }
}
