//! Stack parameter merging.
//!
//! The merge is a pure transformation: it never mutates the input list and
//! produces entries that carry either an explicit value or the
//! "use previous value" marker, never both.

use crate::model::StackParameter;

/// Parameter key carrying the live image id.
pub const IMAGE_ID_PARAMETER: &str = "InstanceAMIId";
/// Parameter key carrying the live additional-disk snapshot id.
pub const ADDITIONAL_DISK_PARAMETER: &str = "InstanceAdditionalEBSSnapshotId";

/// The set of parameter keys receiving explicit new values in one merge
/// pass.
///
/// When the same key is set more than once, the last (most specific)
/// override wins; a key can receive at most one explicit value per pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOverrides {
    entries: Vec<(String, String)>,
}

impl ParameterOverrides {
    /// Creates an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an override.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Returns the winning override value for a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if no overrides are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the override set for a promotion: the image-id key always,
    /// the additional-disk key only when a snapshot id was found.
    #[must_use]
    pub fn for_promotion(image_id: &str, additional_snapshot_id: Option<&str>) -> Self {
        let mut overrides = Self::new().set(IMAGE_ID_PARAMETER, image_id);
        if let Some(snapshot_id) = additional_snapshot_id {
            overrides = overrides.set(ADDITIONAL_DISK_PARAMETER, snapshot_id);
        }
        overrides
    }
}

/// Computes the parameter list for a stack update.
///
/// Keys present in `overrides` receive their new explicit values; every
/// other key is converted to "use previous value" with its stale explicit
/// value dropped. Override keys absent from the current list are ignored -
/// the stack's template defines the parameter surface, and appending a key
/// the template does not declare would be rejected by the provider.
#[must_use]
pub fn merge_parameters(
    current: &[StackParameter],
    overrides: &ParameterOverrides,
) -> Vec<StackParameter> {
    current
        .iter()
        .map(|parameter| match overrides.get(parameter.key()) {
            Some(value) => StackParameter::with_value(parameter.key(), value),
            None => StackParameter::use_previous(parameter.key()),
        })
        .collect()
}
