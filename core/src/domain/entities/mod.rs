//! Domain entities.

pub mod doctor;

// Re-export commonly used types
pub use doctor::{Doctor, InsertOutcome, Sex, TransactionOutcome};
