//! Walkthrough of the basic access patterns against a doctor repository.

mod service;
mod types;

pub use service::TourService;
pub use types::{TourPlan, TourReport};

#[cfg(test)]
mod tests;
