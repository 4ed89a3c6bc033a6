use std::fmt;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprovisionError {
    pub principal_id: String,
    pub message: String,
}

impl DeprovisionError {
    pub fn new(principal_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DeprovisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to deprovision {}: {}",
            self.principal_id, self.message
        )
    }
}

impl std::error::Error for DeprovisionError {}

/// Service-specific removal of a principal's access.
///
/// Returns whether an account was actually removed.
#[async_trait]
pub trait DeprovisionPort: Send + Sync {
    async fn deprovision(&self, principal_id: &str) -> Result<bool, DeprovisionError>;
}
