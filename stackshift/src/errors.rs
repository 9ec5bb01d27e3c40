//! Error types for the stackshift promotion workflows.
//!
//! Every failure aborts the remaining pipeline steps and propagates to the
//! invoking runtime; the core never catches and suppresses an error.

use std::fmt;
use thiserror::Error;

use crate::cloud::ProviderError;
use crate::model::{ImageState, StackStatus};

/// The main error type for promotion operations.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// The image exists but is not in a promotable state.
    #[error("{0}")]
    ImageNotReady(#[from] ImageNotReadyError),

    /// The stack update reached a terminal non-success status.
    #[error("{0}")]
    StackUpdateFailed(#[from] StackUpdateFailedError),

    /// A resource the workflow depends on does not exist.
    #[error("{kind} '{id}' was not found")]
    NotFound {
        /// The kind of missing resource.
        kind: ResourceKind,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// A cloud control-plane call failed.
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// The run was cancelled between poll intervals.
    #[error("promotion cancelled: {0}")]
    Cancelled(String),

    /// Invocation configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An inbound event payload could not be decoded.
    #[error("malformed event payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PromotionError {
    /// Creates a not-found error for an image identifier.
    #[must_use]
    pub fn image_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: ResourceKind::Image,
            id: id.into(),
        }
    }

    /// Creates a not-found error for a stack name.
    #[must_use]
    pub fn stack_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: ResourceKind::Stack,
            id: name.into(),
        }
    }

    /// Returns true if the invoking runtime may retry the whole run.
    ///
    /// Only transient provider failures qualify. Everything else in the
    /// taxonomy is a terminal abort: retrying an unavailable image or a
    /// failed stack update would repeat the same outcome.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_transient())
    }
}

/// The kind of resource named by a [`PromotionError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A machine image.
    Image,
    /// A declarative infrastructure stack.
    Stack,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Stack => write!(f, "stack"),
        }
    }
}

/// Error raised when a freshly baked image is not `available`.
///
/// This is a terminal abort, not a retryable condition: an image that is
/// still pending or has failed its bake must never be promoted.
#[derive(Debug, Clone, Error)]
#[error("image '{image_id}' is not ready for promotion (state = {state})")]
pub struct ImageNotReadyError {
    /// The inspected image identifier.
    pub image_id: String,
    /// The state the image was observed in.
    pub state: ImageState,
}

impl ImageNotReadyError {
    /// Creates a new image-not-ready error.
    #[must_use]
    pub fn new(image_id: impl Into<String>, state: ImageState) -> Self {
        Self {
            image_id: image_id.into(),
            state,
        }
    }
}

/// Error raised when the stack update reaches a terminal non-success status.
///
/// Raising this error skips resource retirement: superseded images and
/// snapshots are deliberately preserved so the stack can be inspected and
/// recovered.
#[derive(Debug, Clone, Error)]
#[error("stack '{stack_name}' update failed (status = {status}); superseded resources were preserved")]
pub struct StackUpdateFailedError {
    /// The stack whose update failed.
    pub stack_name: String,
    /// The terminal status observed while polling.
    pub status: StackStatus,
}

impl StackUpdateFailedError {
    /// Creates a new stack-update-failed error.
    #[must_use]
    pub fn new(stack_name: impl Into<String>, status: StackStatus) -> Self {
        Self {
            stack_name: stack_name.into(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = PromotionError::image_not_found("img-404");
        assert_eq!(err.to_string(), "image 'img-404' was not found");

        let err = PromotionError::stack_not_found("gamebox");
        assert_eq!(err.to_string(), "stack 'gamebox' was not found");
    }

    #[test]
    fn test_image_not_ready_display() {
        let err = ImageNotReadyError::new("img-1", ImageState::Pending);
        assert!(err.to_string().contains("img-1"));
        assert!(err.to_string().contains("pending"));
    }

    #[test]
    fn test_stack_update_failed_display() {
        let err = StackUpdateFailedError::new("gamebox", StackStatus::UpdateFailed);
        assert!(err.to_string().contains("UPDATE_FAILED"));
        assert!(err.to_string().contains("preserved"));
    }

    #[test]
    fn test_only_transient_provider_errors_are_retryable() {
        let transient = PromotionError::Provider(ProviderError::Transient(
            "throttled".to_string(),
        ));
        assert!(transient.is_retryable());

        let api = PromotionError::Provider(ProviderError::Api("denied".to_string()));
        assert!(!api.is_retryable());

        let not_ready: PromotionError =
            ImageNotReadyError::new("img-1", ImageState::Failed).into();
        assert!(!not_ready.is_retryable());
    }
}
