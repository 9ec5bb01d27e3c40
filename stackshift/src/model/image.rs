//! Machine image descriptions as reported by the provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of a machine image.
///
/// Unrecognized provider states are preserved verbatim in [`Self::Other`];
/// anything that is not [`Self::Available`] blocks promotion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageState {
    /// The image is still being created.
    Pending,
    /// The image is ready to launch instances from.
    Available,
    /// The image bake failed.
    Failed,
    /// The image has been deregistered.
    Deregistered,
    /// Any other provider-reported state.
    Other(String),
}

impl ImageState {
    /// Returns true if the image can be promoted.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Returns the provider's wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Available => "available",
            Self::Failed => "failed",
            Self::Deregistered => "deregistered",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ImageState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "available" => Self::Available,
            "failed" => Self::Failed,
            "deregistered" => Self::Deregistered,
            _ => Self::Other(raw),
        }
    }
}

impl From<ImageState> for String {
    fn from(state: ImageState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for ImageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A block storage device attached to an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDeviceMapping {
    /// The device name (e.g. `/dev/sda1`).
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    /// The backing snapshot, if the device is snapshot-backed.
    #[serde(rename = "SnapshotId", skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
}

impl BlockDeviceMapping {
    /// Creates a snapshot-backed mapping.
    #[must_use]
    pub fn snapshot_backed(
        device_name: impl Into<String>,
        snapshot_id: impl Into<String>,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            snapshot_id: Some(snapshot_id.into()),
        }
    }

    /// Creates a mapping without a backing snapshot (e.g. ephemeral).
    #[must_use]
    pub fn ephemeral(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            snapshot_id: None,
        }
    }
}

/// A machine image description.
///
/// Images are created by the external bake pipeline and are read-only to
/// this crate until retirement deregisters them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// The image identifier.
    #[serde(rename = "ImageId")]
    pub image_id: String,
    /// The image lifecycle state.
    #[serde(rename = "State")]
    pub state: ImageState,
    /// Attached storage devices in provider order.
    #[serde(rename = "BlockDeviceMappings", default)]
    pub block_device_mappings: Vec<BlockDeviceMapping>,
}

impl Image {
    /// Creates an image description.
    #[must_use]
    pub fn new(image_id: impl Into<String>, state: ImageState) -> Self {
        Self {
            image_id: image_id.into(),
            state,
            block_device_mappings: Vec::new(),
        }
    }

    /// Adds a block device mapping.
    #[must_use]
    pub fn with_mapping(mut self, mapping: BlockDeviceMapping) -> Self {
        self.block_device_mappings.push(mapping);
        self
    }

    /// Returns the snapshot ids referenced by the device mappings,
    /// skipping mappings without a backing snapshot.
    #[must_use]
    pub fn snapshot_ids(&self) -> Vec<&str> {
        self.block_device_mappings
            .iter()
            .filter_map(|mapping| mapping.snapshot_id.as_deref())
            .collect()
    }
}
