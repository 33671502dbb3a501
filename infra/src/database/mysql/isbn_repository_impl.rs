//! MySQL repository for the `isbns` table used as the benchmark insert target.

use sqlx::MySqlPool;
use std::time::Duration;

use dt_core::errors::DomainError;

use super::with_deadline;

/// ISBN inserted by every benchmark operation
pub const BENCH_ISBN: &str = "978-3-598-21500-1";

/// Default deadline for one benchmark insert
pub const DEFAULT_INSERT_TIMEOUT: Duration = Duration::from_secs(3);

/// MySQL repository over the `isbns` table
#[derive(Clone)]
pub struct MySqlIsbnRepository {
    /// Database connection pool
    pool: MySqlPool,
    /// Upper bound for a single statement
    statement_timeout: Duration,
}

impl MySqlIsbnRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            statement_timeout: DEFAULT_INSERT_TIMEOUT,
        }
    }

    /// Override the per-statement timeout
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Insert one ISBN row, returning rows affected
    pub async fn insert(&self, isbn: &str) -> Result<u64, DomainError> {
        let result = with_deadline(
            self.statement_timeout,
            "insert isbn",
            sqlx::query("INSERT INTO isbns VALUES (?)")
                .bind(isbn)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    /// Count stored rows
    pub async fn count(&self) -> Result<i64, DomainError> {
        with_deadline(
            self.statement_timeout,
            "count isbns",
            sqlx::query_scalar("SELECT COUNT(*) FROM isbns").fetch_one(&self.pool),
        )
        .await
    }

    /// Remove every stored row, returning rows affected
    pub async fn clear(&self) -> Result<u64, DomainError> {
        let result = with_deadline(
            self.statement_timeout,
            "clear isbns",
            sqlx::query("DELETE FROM isbns").execute(&self.pool),
        )
        .await?;

        tracing::info!(rows_affected = result.rows_affected(), "Cleared benchmark table");
        Ok(result.rows_affected())
    }
}
