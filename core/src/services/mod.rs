//! Business services containing the walkthrough logic.

pub mod tour;

// Re-export commonly used types
pub use tour::{TourPlan, TourReport, TourService};
