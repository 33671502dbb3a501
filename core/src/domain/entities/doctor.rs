//! Doctor entity, one row of `doctor_tb`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Sex stored as a numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Code 1
    Male,
    /// Code 2
    Female,
}

impl Sex {
    /// Numeric code persisted in the `sex` column
    pub fn code(&self) -> i8 {
        match self {
            Sex::Male => 1,
            Sex::Female => 2,
        }
    }
}

impl TryFrom<i8> for Sex {
    type Error = DomainError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Sex::Male),
            2 => Ok(Sex::Female),
            other => Err(DomainError::Validation {
                message: format!("Unknown sex code: {}", other),
            }),
        }
    }
}

/// Doctor entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    /// Auto-increment primary key
    pub id: i64,

    /// Display name, e.g. `Dr.Lin`
    pub name: String,

    /// Age in years
    pub age: i32,

    /// Sex code
    pub sex: Sex,

    /// Row creation time, set by the database clock
    pub add_time: DateTime<Utc>,
}

impl Doctor {
    /// Whether this doctor is strictly older than `age`
    pub fn is_older_than(&self, age: i32) -> bool {
        self.age > age
    }
}

impl std::fmt::Display for Doctor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{} {} {} {} {}}}",
            self.id,
            self.name,
            self.age,
            self.sex.code(),
            self.add_time.to_rfc3339()
        )
    }
}

/// Result of inserting a new doctor row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOutcome {
    /// Id generated for the new row
    pub id: i64,
    /// Rows affected by the insert
    pub rows_affected: u64,
}

/// Result of the two-statement age transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionOutcome {
    /// Both updates touched at least one row and the transaction was committed
    Committed { first: u64, second: u64 },
    /// At least one update touched no rows and the transaction was rolled back
    RolledBack { first: u64, second: u64 },
}

impl TransactionOutcome {
    /// Decide the outcome from the rows affected by each update
    pub fn from_rows_affected(first: u64, second: u64) -> Self {
        if first > 0 && second > 0 {
            TransactionOutcome::Committed { first, second }
        } else {
            TransactionOutcome::RolledBack { first, second }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, TransactionOutcome::Committed { .. })
    }
}

#[cfg(test)]
#[path = "tests/doctor_tests.rs"]
mod tests;
