use async_trait::async_trait;

use crate::engine::ports::{DeprovisionError, DeprovisionPort};

/// Reports every deprovision as done without touching any service.
#[derive(Debug, Clone, Default)]
pub struct DryRunDeprovisioner;

#[async_trait]
impl DeprovisionPort for DryRunDeprovisioner {
    async fn deprovision(&self, principal_id: &str) -> Result<bool, DeprovisionError> {
        tracing::info!(
            target: "deprovision",
            principal_id = %principal_id,
            dry_run = true,
            "deprovision_requested"
        );
        Ok(true)
    }
}
