//! Student records and create-request validation.

pub mod types;
pub mod validation;

pub use types::{Age, NewStudent, Student, DEFAULT_STATUS};
pub use validation::validate;
