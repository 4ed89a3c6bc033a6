pub mod error;
pub mod types;
pub mod validation;

pub use error::ConfigError;
pub use types::{SUPER_ADMIN_GROUP, ServicePolicy};
pub use validation::{PolicyAdvisory, PolicyValidation, PolicyViolation};
