//! In-memory implementation of DoctorRepository for tests and dry runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::doctor::{Doctor, InsertOutcome, Sex, TransactionOutcome};
use crate::errors::DomainError;

use super::r#trait::DoctorRepository;

#[derive(Default)]
struct MockState {
    rows: BTreeMap<i64, Doctor>,
    next_id: i64,
}

/// Mock doctor repository backed by an ordered map
#[derive(Clone, Default)]
pub struct MockDoctorRepository {
    state: Arc<RwLock<MockState>>,
}

impl MockDoctorRepository {
    /// Create a new, empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Whether no rows are stored
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.rows.is_empty()
    }

    /// All rows with the given name
    pub async fn find_by_name(&self, name: &str) -> Vec<Doctor> {
        let state = self.state.read().await;
        state
            .rows
            .values()
            .filter(|d| d.name == name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DoctorRepository for MockDoctorRepository {
    async fn insert(&self, name: &str, age: i32) -> Result<InsertOutcome, DomainError> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;

        state.rows.insert(
            id,
            Doctor {
                id,
                name: name.to_string(),
                age,
                sex: Sex::Female,
                add_time: Utc::now(),
            },
        );

        Ok(InsertOutcome {
            id,
            rows_affected: 1,
        })
    }

    async fn update_age(&self, id: i64, age: i32) -> Result<u64, DomainError> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&id) {
            Some(doctor) => {
                doctor.age = age;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, DomainError> {
        let mut state = self.state.write().await;
        Ok(state.rows.remove(&id).map_or(0, |_| 1))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Doctor>, DomainError> {
        let state = self.state.read().await;
        Ok(state.rows.get(&id).cloned())
    }

    async fn find_older_than(&self, age: i32) -> Result<Vec<Doctor>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|d| d.is_older_than(age))
            .cloned()
            .collect())
    }

    async fn increment_ages_atomically(
        &self,
        first_name: &str,
        second_name: &str,
    ) -> Result<TransactionOutcome, DomainError> {
        // Holding the write lock for the whole call stands in for the transaction.
        let mut state = self.state.write().await;

        let count = |state: &MockState, name: &str| {
            state.rows.values().filter(|d| d.name == name).count() as u64
        };
        let first = count(&*state, first_name);
        let second = count(&*state, second_name);
        let outcome = TransactionOutcome::from_rows_affected(first, second);

        if outcome.is_committed() {
            for doctor in state.rows.values_mut() {
                if doctor.name == first_name {
                    doctor.age += 1;
                }
                if doctor.name == second_name {
                    doctor.age += 1;
                }
            }
        }

        Ok(outcome)
    }
}
