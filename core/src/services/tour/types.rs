//! Input and output types of the walkthrough

use serde::{Deserialize, Serialize};

use crate::domain::entities::doctor::TransactionOutcome;

/// Names and ages used by each step of the walkthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourPlan {
    /// Doctor inserted first, then updated, queried and deleted
    pub primary: (String, i32),
    /// Age the primary doctor is updated to
    pub updated_age: i32,
    /// Second doctor inserted before the multi-row query
    pub secondary: (String, i32),
    /// Lower bound (exclusive) for the multi-row query
    pub older_than: i32,
    /// The two doctors whose ages are incremented in one transaction
    pub transaction_pair: [(String, i32); 2],
}

impl Default for TourPlan {
    fn default() -> Self {
        Self {
            primary: (String::from("Dr.Lin"), 40),
            updated_age: 20,
            secondary: (String::from("Dr.Wu"), 20),
            older_than: 18,
            transaction_pair: [(String::from("Dr.Huang"), 40), (String::from("Dr.Chen"), 20)],
        }
    }
}

/// What the walkthrough observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourReport {
    /// Id generated for the primary doctor
    pub primary_id: i64,
    /// Age read back after the update
    pub updated_age: i32,
    /// Number of rows returned by the multi-row query
    pub older_count: usize,
    /// Rows removed when deleting the primary doctor
    pub deleted_rows: u64,
    /// Outcome of the two-statement transaction
    pub transaction: TransactionOutcome,
}
