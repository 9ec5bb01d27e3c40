//! Declarative-stack query/mutation capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProviderError;
use crate::model::{StackDescription, StackParameter};

/// Capability acknowledgement required for stacks containing resources
/// with elevated permissions.
pub const IAM_CAPABILITY: &str = "CAPABILITY_IAM";

/// A stack update submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackUpdateRequest {
    /// The stack to update.
    pub stack_name: String,
    /// Reuse the stack's current template instead of supplying a new one.
    pub use_previous_template: bool,
    /// The merged parameter list.
    pub parameters: Vec<StackParameter>,
    /// Acknowledged capabilities.
    pub capabilities: Vec<String>,
}

impl StackUpdateRequest {
    /// Creates the promotion-shaped request: previous template, merged
    /// parameters, IAM capability acknowledged.
    #[must_use]
    pub fn reuse_template(
        stack_name: impl Into<String>,
        parameters: Vec<StackParameter>,
    ) -> Self {
        Self {
            stack_name: stack_name.into(),
            use_previous_template: true,
            parameters,
            capabilities: vec![IAM_CAPABILITY.to_string()],
        }
    }
}

/// Capability trait covering declarative-stack calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Fetches a stack description by name, `None` if it does not exist.
    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> Result<Option<StackDescription>, ProviderError>;

    /// Submits a stack update. Returns as soon as the update is accepted;
    /// completion is observed by polling [`Self::describe_stack`].
    async fn update_stack(
        &self,
        request: &StackUpdateRequest,
    ) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuse_template_request_shape() {
        let request = StackUpdateRequest::reuse_template(
            "gamebox",
            vec![StackParameter::use_previous("Foo")],
        );
        assert!(request.use_previous_template);
        assert_eq!(request.capabilities, vec![IAM_CAPABILITY.to_string()]);
        assert_eq!(request.parameters.len(), 1);
    }
}
