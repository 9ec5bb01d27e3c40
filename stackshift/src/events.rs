//! Inbound event payloads.
//!
//! The field names follow the wire format of the triggering runtime, so
//! these types deserialize the raw payload without a translation layer.

use serde::{Deserialize, Serialize};

use crate::errors::PromotionError;

/// Event reporting that the image-bake workflow finished creating an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCreatedEvent {
    /// The freshly baked image.
    #[serde(rename = "ImageId")]
    pub image_id: String,
    /// Correlation id of the automation execution that baked the image.
    #[serde(rename = "AutomationId", default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
}

impl ImageCreatedEvent {
    /// Creates an event for the given image.
    #[must_use]
    pub fn new(image_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            automation_id: None,
        }
    }

    /// Sets the automation execution correlation id.
    #[must_use]
    pub fn with_automation_id(mut self, id: impl Into<String>) -> Self {
        self.automation_id = Some(id.into());
        self
    }

    /// Decodes the event from a raw JSON payload.
    pub fn from_json(raw: &str) -> Result<Self, PromotionError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Event reporting that a compute instance stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStopEvent {
    /// The event detail block.
    pub detail: InstanceStopDetail,
}

/// Detail block of an instance-stop event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStopDetail {
    /// The stopped instance.
    #[serde(rename = "instance-id")]
    pub instance_id: String,
}

impl InstanceStopEvent {
    /// Creates an event for the given instance.
    #[must_use]
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            detail: InstanceStopDetail {
                instance_id: instance_id.into(),
            },
        }
    }

    /// Decodes the event from a raw JSON payload.
    pub fn from_json(raw: &str) -> Result<Self, PromotionError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_created_event_wire_format() {
        let event = ImageCreatedEvent::from_json(
            r#"{"ImageId": "img-1", "AutomationId": "exec-7"}"#,
        )
        .unwrap();
        assert_eq!(event.image_id, "img-1");
        assert_eq!(event.automation_id.as_deref(), Some("exec-7"));
    }

    #[test]
    fn test_automation_id_is_optional() {
        let event = ImageCreatedEvent::from_json(r#"{"ImageId": "img-1"}"#).unwrap();
        assert!(event.automation_id.is_none());
    }

    #[test]
    fn test_instance_stop_event_wire_format() {
        let event = InstanceStopEvent::from_json(
            r#"{"detail": {"instance-id": "i-0abc"}}"#,
        )
        .unwrap();
        assert_eq!(event.detail.instance_id, "i-0abc");
    }

    #[test]
    fn test_malformed_payload_is_a_serialization_error() {
        let err = ImageCreatedEvent::from_json("{}").unwrap_err();
        assert!(matches!(err, PromotionError::Serialization(_)));
    }
}
