//! Invocation configuration for the promotion and save-state workflows.

use serde::{Deserialize, Serialize};

use crate::errors::PromotionError;

/// Environment key naming the owning stack.
pub const STACK_NAME_ENV: &str = "STACKSHIFT_STACK_NAME";
/// Environment key flagging additional-disk support.
pub const ADDITIONAL_DISK_ENV: &str = "STACKSHIFT_HAS_ADDITIONAL_DISK";
/// Environment key naming the spot fleet request to check membership against.
pub const SPOTFLEET_REQUEST_ID_ENV: &str = "STACKSHIFT_SPOTFLEET_REQUEST_ID";
/// Environment key naming the state-save automation document.
pub const SAVE_STATE_DOCUMENT_ENV: &str = "STACKSHIFT_SAVE_STATE_DOCUMENT";

/// Configuration read once at invocation start.
///
/// The spot fleet id and automation document are only required by the
/// save-state workflow; the promotion workflow runs without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionConfig {
    /// Name of the declarative stack owning the promoted resources.
    pub stack_name: String,
    /// Whether the deployment tracks an out-of-band additional disk snapshot.
    #[serde(default)]
    pub additional_disk: bool,
    /// Spot fleet request whose membership gates the save-state workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_fleet_request_id: Option<String>,
    /// Automation document started to capture instance state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_state_document: Option<String>,
}

impl PromotionConfig {
    /// Creates a configuration for the given stack.
    #[must_use]
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            additional_disk: false,
            spot_fleet_request_id: None,
            save_state_document: None,
        }
    }

    /// Enables or disables additional-disk tracking.
    #[must_use]
    pub fn with_additional_disk(mut self, enabled: bool) -> Self {
        self.additional_disk = enabled;
        self
    }

    /// Sets the spot fleet request id.
    #[must_use]
    pub fn with_spot_fleet_request_id(mut self, id: impl Into<String>) -> Self {
        self.spot_fleet_request_id = Some(id.into());
        self
    }

    /// Sets the state-save automation document name.
    #[must_use]
    pub fn with_save_state_document(mut self, name: impl Into<String>) -> Self {
        self.save_state_document = Some(name.into());
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// The stack name is mandatory; everything else is optional and
    /// defaults to off/absent.
    pub fn from_env() -> Result<Self, PromotionError> {
        let stack_name = std::env::var(STACK_NAME_ENV).map_err(|_| {
            PromotionError::Config(format!("{STACK_NAME_ENV} is not set"))
        })?;

        let additional_disk = std::env::var(ADDITIONAL_DISK_ENV)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);

        Ok(Self {
            stack_name,
            additional_disk,
            spot_fleet_request_id: std::env::var(SPOTFLEET_REQUEST_ID_ENV).ok(),
            save_state_document: std::env::var(SAVE_STATE_DOCUMENT_ENV).ok(),
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
