//! Doctor repository module.

mod r#trait;
pub use r#trait::DoctorRepository;

mod mock;
pub use mock::MockDoctorRepository;
