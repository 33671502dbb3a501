//! # dbtour core
//!
//! Domain layer for the dbtour workspace: the `Doctor` entity, the
//! repository contract for its table, and the walkthrough service that
//! exercises every basic access pattern in order.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{Doctor, InsertOutcome, Sex, TransactionOutcome};
pub use errors::{DomainError, DomainResult};
pub use repositories::{DoctorRepository, MockDoctorRepository};
pub use services::{TourPlan, TourReport, TourService};
