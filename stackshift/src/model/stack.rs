//! Stack parameters and update-status classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single stack parameter entry.
///
/// An entry carries either an explicit value or the "use previous value"
/// marker, never both - the constructors only expose the two valid shapes,
/// because submitting an entry with both set is an invalid update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackParameter {
    /// The parameter key.
    #[serde(rename = "ParameterKey")]
    key: String,
    /// The explicit value, if one is being set.
    #[serde(rename = "ParameterValue", skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    /// Whether the stack should keep the parameter's previous value.
    #[serde(rename = "UsePreviousValue", default, skip_serializing_if = "is_false")]
    use_previous_value: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl StackParameter {
    /// Creates an entry carrying an explicit value.
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            use_previous_value: false,
        }
    }

    /// Creates an entry that keeps the parameter's previous value.
    #[must_use]
    pub fn use_previous(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            use_previous_value: true,
        }
    }

    /// Returns the parameter key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the explicit value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns true if the entry keeps the previous value.
    #[must_use]
    pub fn uses_previous_value(&self) -> bool {
        self.use_previous_value
    }
}

/// A stack description as returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescription {
    /// The stack name.
    #[serde(rename = "StackName")]
    pub stack_name: String,
    /// The current stack status.
    #[serde(rename = "StackStatus")]
    pub stack_status: StackStatus,
    /// The current parameter list.
    #[serde(rename = "Parameters", default)]
    pub parameters: Vec<StackParameter>,
}

impl StackDescription {
    /// Creates a stack description.
    #[must_use]
    pub fn new(stack_name: impl Into<String>, stack_status: StackStatus) -> Self {
        Self {
            stack_name: stack_name.into(),
            stack_status,
            parameters: Vec::new(),
        }
    }

    /// Adds a parameter entry.
    #[must_use]
    pub fn with_parameter(mut self, parameter: StackParameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// The provider's stack update status vocabulary.
///
/// Statuses outside the known vocabulary are preserved in [`Self::Other`]
/// and classify as terminal failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StackStatus {
    /// The update is applying changes.
    UpdateInProgress,
    /// The update finished successfully.
    UpdateComplete,
    /// The update finished and old resources are being cleaned up.
    UpdateCompleteCleanupInProgress,
    /// The update failed without rolling back.
    UpdateFailed,
    /// The update failed and is rolling back.
    UpdateRollbackInProgress,
    /// The rollback finished.
    UpdateRollbackComplete,
    /// The rollback finished and is cleaning up.
    UpdateRollbackCompleteCleanupInProgress,
    /// The rollback itself failed.
    UpdateRollbackFailed,
    /// Any other provider-reported status.
    Other(String),
}

/// Classification of a stack status for the update driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Keep polling.
    NonTerminal,
    /// The update succeeded.
    TerminalSuccess,
    /// The update failed; retirement must be skipped.
    TerminalFailure,
}

impl StackStatus {
    /// Classifies the status for the poll loop.
    ///
    /// A completed update counts as success even while the provider is
    /// still cleaning up replaced resources; waiting out the cleanup phase
    /// would only delay retirement. A rollback in flight is polled through
    /// to its terminal state. Unknown statuses are terminal failures so a
    /// widened provider vocabulary can never strand the loop or trigger
    /// retirement on an unconfirmed update.
    #[must_use]
    pub fn classify(&self) -> StatusClass {
        match self {
            Self::UpdateInProgress | Self::UpdateRollbackInProgress => {
                StatusClass::NonTerminal
            }
            Self::UpdateComplete | Self::UpdateCompleteCleanupInProgress => {
                StatusClass::TerminalSuccess
            }
            Self::UpdateFailed
            | Self::UpdateRollbackComplete
            | Self::UpdateRollbackCompleteCleanupInProgress
            | Self::UpdateRollbackFailed
            | Self::Other(_) => StatusClass::TerminalFailure,
        }
    }

    /// Returns the provider's wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::UpdateInProgress => "UPDATE_IN_PROGRESS",
            Self::UpdateComplete => "UPDATE_COMPLETE",
            Self::UpdateCompleteCleanupInProgress => {
                "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::UpdateRollbackInProgress => "UPDATE_ROLLBACK_IN_PROGRESS",
            Self::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            Self::UpdateRollbackCompleteCleanupInProgress => {
                "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            Self::UpdateRollbackFailed => "UPDATE_ROLLBACK_FAILED",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for StackStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "UPDATE_IN_PROGRESS" => Self::UpdateInProgress,
            "UPDATE_COMPLETE" => Self::UpdateComplete,
            "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS" => {
                Self::UpdateCompleteCleanupInProgress
            }
            "UPDATE_FAILED" => Self::UpdateFailed,
            "UPDATE_ROLLBACK_IN_PROGRESS" => Self::UpdateRollbackInProgress,
            "UPDATE_ROLLBACK_COMPLETE" => Self::UpdateRollbackComplete,
            "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS" => {
                Self::UpdateRollbackCompleteCleanupInProgress
            }
            "UPDATE_ROLLBACK_FAILED" => Self::UpdateRollbackFailed,
            _ => Self::Other(raw),
        }
    }
}

impl From<StackStatus> for String {
    fn from(status: StackStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
