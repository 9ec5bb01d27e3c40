//! The instance-stop save-state workflow.
//!
//! A much simpler, structurally independent workflow: when an instance
//! stops, check whether it belongs to this stack's spot fleet and, if so,
//! fire the state-save automation. It shares the capability traits and
//! configuration surface with the promotion pipeline but none of its
//! state-transition logic.

use tracing::info;

use crate::cloud::{AutomationApi, FleetApi};
use crate::config::PromotionConfig;
use crate::errors::PromotionError;
use crate::events::InstanceStopEvent;

/// Handles an instance-stop event.
///
/// Returns the automation execution id when the state save was triggered,
/// or `None` when the instance is not part of this stack's fleet - a
/// logged no-op, since stop events arrive for every instance in the
/// account.
pub async fn handle_instance_stop(
    fleet: &dyn FleetApi,
    automation: &dyn AutomationApi,
    config: &PromotionConfig,
    event: &InstanceStopEvent,
) -> Result<Option<String>, PromotionError> {
    let instance_id = &event.detail.instance_id;
    let fleet_id = config.spot_fleet_request_id.as_deref().ok_or_else(|| {
        PromotionError::Config(
            "spot fleet request id is required for the save-state workflow"
                .to_string(),
        )
    })?;
    let document = config.save_state_document.as_deref().ok_or_else(|| {
        PromotionError::Config(
            "save-state automation document is required for the save-state \
             workflow"
                .to_string(),
        )
    })?;

    let members = fleet.active_instance_ids(fleet_id).await?;
    if !members.iter().any(|member| member == instance_id) {
        info!(
            instance_id = %instance_id,
            spot_fleet_request_id = %fleet_id,
            "instance is not part of this stack's fleet, ignoring"
        );
        return Ok(None);
    }

    let execution_id = automation.start_automation(document, instance_id).await?;
    info!(
        instance_id = %instance_id,
        execution_id = %execution_id,
        "state save automation started"
    );
    Ok(Some(execution_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CloudCall, InMemoryCloud};
    use pretty_assertions::assert_eq;

    fn config() -> PromotionConfig {
        PromotionConfig::new("gamebox")
            .with_spot_fleet_request_id("sfr-1")
            .with_save_state_document("gamebox-save-state")
    }

    #[tokio::test]
    async fn test_member_instance_triggers_automation() {
        let cloud = InMemoryCloud::new();
        cloud.seed_fleet("sfr-1", vec!["i-0abc".to_string(), "i-0def".to_string()]);

        let execution_id = handle_instance_stop(
            &cloud,
            &cloud,
            &config(),
            &InstanceStopEvent::new("i-0abc"),
        )
        .await
        .unwrap();

        assert!(execution_id.is_some());
        assert!(cloud.calls().iter().any(|call| matches!(
            call,
            CloudCall::StartAutomation { document_name, instance_id }
                if document_name == "gamebox-save-state" && instance_id == "i-0abc"
        )));
    }

    #[tokio::test]
    async fn test_non_member_instance_is_ignored() {
        let cloud = InMemoryCloud::new();
        cloud.seed_fleet("sfr-1", vec!["i-0def".to_string()]);

        let execution_id = handle_instance_stop(
            &cloud,
            &cloud,
            &config(),
            &InstanceStopEvent::new("i-0abc"),
        )
        .await
        .unwrap();

        assert_eq!(execution_id, None);
        assert!(!cloud
            .calls()
            .iter()
            .any(|call| matches!(call, CloudCall::StartAutomation { .. })));
    }

    #[tokio::test]
    async fn test_missing_fleet_configuration_is_a_config_error() {
        let cloud = InMemoryCloud::new();
        let config = PromotionConfig::new("gamebox")
            .with_save_state_document("gamebox-save-state");

        let err = handle_instance_stop(
            &cloud,
            &cloud,
            &config,
            &InstanceStopEvent::new("i-0abc"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PromotionError::Config(_)));
    }
}
