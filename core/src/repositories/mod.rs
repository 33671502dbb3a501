pub mod doctor;

pub use doctor::{DoctorRepository, MockDoctorRepository};
