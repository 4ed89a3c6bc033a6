use async_trait::async_trait;

use crate::directory::{
    error::DirectoryError,
    types::{Group, Principal},
};

/// Read-only lookups against the identity directory.
///
/// A missing principal or group is reported as a `NotFound` error rather than
/// an empty record.
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    async fn fetch_principal(&self, id: &str) -> Result<Principal, DirectoryError>;

    async fn fetch_group(&self, name: &str) -> Result<Group, DirectoryError>;
}
