//! Stack update submission and polling.

use std::time::Duration;
use tracing::{debug, info};

use crate::cancellation::CancellationToken;
use crate::cloud::{StackApi, StackUpdateRequest};
use crate::errors::{PromotionError, StackUpdateFailedError};
use crate::model::{StackParameter, StackStatus, StatusClass};

/// The fixed interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Drives a submitted stack update to a terminal status.
///
/// The driver is a blocking wait with no upper bound on poll duration;
/// deadlines are the caller's concern and arrive through the cancellation
/// token, which is honored between sleep intervals.
#[derive(Debug, Clone)]
pub struct UpdateDriver {
    poll_interval: Duration,
}

impl Default for UpdateDriver {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl UpdateDriver {
    /// Creates a driver polling at the given interval.
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Submits the update and polls until the stack reaches a terminal
    /// status.
    ///
    /// Returns the terminal-success status, or
    /// [`StackUpdateFailedError`] carrying the observed status on terminal
    /// failure - which aborts the promotion and deliberately preserves the
    /// superseded resources.
    pub async fn drive(
        &self,
        stacks: &dyn StackApi,
        stack_name: &str,
        parameters: Vec<StackParameter>,
        cancel: &CancellationToken,
    ) -> Result<StackStatus, PromotionError> {
        cancel.ensure_active()?;

        let request = StackUpdateRequest::reuse_template(stack_name, parameters);
        stacks.update_stack(&request).await?;
        info!(
            stack_name = %stack_name,
            "stack update submitted, waiting for a terminal status"
        );

        loop {
            let description = stacks
                .describe_stack(stack_name)
                .await?
                .ok_or_else(|| PromotionError::stack_not_found(stack_name))?;

            let status = description.stack_status;
            match status.classify() {
                StatusClass::TerminalSuccess => {
                    info!(
                        stack_name = %stack_name,
                        status = %status,
                        "stack update complete"
                    );
                    return Ok(status);
                }
                StatusClass::TerminalFailure => {
                    return Err(
                        StackUpdateFailedError::new(stack_name, status).into()
                    );
                }
                StatusClass::NonTerminal => {
                    debug!(
                        stack_name = %stack_name,
                        status = %status,
                        "stack update still in progress"
                    );
                    tokio::time::sleep(self.poll_interval).await;
                    cancel.ensure_active()?;
                }
            }
        }
    }
}
