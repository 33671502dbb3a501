//! Doctor repository trait defining the CRUD surface over `doctor_tb`.

use async_trait::async_trait;

use crate::domain::entities::doctor::{Doctor, InsertOutcome, TransactionOutcome};
use crate::errors::DomainError;

/// Repository trait for Doctor persistence operations
///
/// Each method maps to exactly one statement (or one transaction) against
/// the backing table; implementations add no caching or retries of their own.
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Insert a new doctor with the current database time as `add_time`
    ///
    /// # Returns
    /// * `Ok(InsertOutcome)` - Generated id and rows affected
    /// * `Err(DomainError)` - Insert failed
    ///
    /// # Example
    /// ```no_run
    /// # use dt_core::repositories::DoctorRepository;
    /// # async fn example(repo: &impl DoctorRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let outcome = repo.insert("Dr.Lin", 40).await?;
    /// println!("ID for new record: {}", outcome.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn insert(&self, name: &str, age: i32) -> Result<InsertOutcome, DomainError>;

    /// Set the age of the doctor with `id`
    ///
    /// # Returns
    /// * `Ok(u64)` - Rows affected (0 when no such doctor)
    async fn update_age(&self, id: i64, age: i32) -> Result<u64, DomainError>;

    /// Delete the doctor with `id`
    ///
    /// # Returns
    /// * `Ok(u64)` - Rows affected (0 when no such doctor)
    async fn delete(&self, id: i64) -> Result<u64, DomainError>;

    /// Find a doctor by id
    ///
    /// # Returns
    /// * `Ok(Some(Doctor))` - First matching row
    /// * `Ok(None)` - No row with this id
    async fn find_by_id(&self, id: i64) -> Result<Option<Doctor>, DomainError>;

    /// Find all doctors strictly older than `age`
    async fn find_older_than(&self, age: i32) -> Result<Vec<Doctor>, DomainError>;

    /// Increment the age of two doctors (looked up by name) in one transaction
    ///
    /// Commits only when both updates touch at least one row, otherwise the
    /// transaction is rolled back and neither age changes.
    ///
    /// # Example
    /// ```no_run
    /// # use dt_core::repositories::DoctorRepository;
    /// # async fn example(repo: &impl DoctorRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let outcome = repo.increment_ages_atomically("Dr.Huang", "Dr.Chen").await?;
    /// if outcome.is_committed() {
    ///     println!("both doctors are a year older");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn increment_ages_atomically(
        &self,
        first_name: &str,
        second_name: &str,
    ) -> Result<TransactionOutcome, DomainError>;

    /// Find a doctor by id, treating a missing row as an error
    async fn get_by_id(&self, id: i64) -> Result<Doctor, DomainError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::doctor_not_found(id))
    }
}
