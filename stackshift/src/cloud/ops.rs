//! Fleet-membership and automation-trigger capabilities.

use async_trait::async_trait;

use super::ProviderError;

/// Capability trait for spot fleet membership queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// Lists the instance ids currently active in the given fleet request.
    async fn active_instance_ids(
        &self,
        spot_fleet_request_id: &str,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Capability trait for starting automation executions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutomationApi: Send + Sync {
    /// Starts the named automation document against an instance and
    /// returns the execution id.
    async fn start_automation(
        &self,
        document_name: &str,
        instance_id: &str,
    ) -> Result<String, ProviderError>;
}
