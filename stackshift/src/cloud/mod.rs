//! Cloud control-plane capability traits.
//!
//! The workflows never talk to the provider directly; they receive these
//! collaborator handles from the caller. Production embeds real SDK
//! clients behind them, tests substitute fakes or mocks.

use thiserror::Error;

pub mod compute;
pub mod ops;
pub mod stack;

pub use compute::ImageApi;
pub use ops::{AutomationApi, FleetApi};
pub use stack::{StackApi, StackUpdateRequest, IAM_CAPABILITY};

/// Error returned by capability trait implementations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider reports the named resource does not exist.
    #[error("provider reports no such resource: {0}")]
    NotFound(String),

    /// A transient failure (throttling, timeouts). The invoking runtime
    /// may retry the whole run; this core never retries internally.
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// Any other provider-side failure.
    #[error("provider call failed: {0}")]
    Api(String),
}

impl ProviderError {
    /// Returns true if the failure is worth retrying at the caller level.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
