//! Cancellation token for cooperative cancellation of blocking waits.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::PromotionError;

/// A token for cooperative cancellation.
///
/// The stack update driver checks the token between poll sleeps, so an
/// external deadline or watchdog can abort a promotion while the stack
/// update is still in flight. Cancellation is idempotent - only the first
/// cancellation reason is kept.
#[derive(Default)]
pub struct CancellationToken {
    /// Whether cancellation has been requested.
    cancelled: AtomicBool,
    /// The reason for cancellation (first one wins).
    reason: RwLock<Option<String>>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation with a reason.
    ///
    /// This is idempotent - only the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.write() = Some(reason.into());
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Returns an error if cancellation has been requested.
    pub fn ensure_active(&self) -> Result<(), PromotionError> {
        if self.is_cancelled() {
            let reason = self
                .reason()
                .unwrap_or_else(|| "cancelled by caller".to_string());
            return Err(PromotionError::Cancelled(reason));
        }
        Ok(())
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_default_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());
        assert!(token.ensure_active().is_ok());
    }

    #[test]
    fn test_token_cancel() {
        let token = CancellationToken::new();
        token.cancel("deadline exceeded");

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some("deadline exceeded".to_string()));
    }

    #[test]
    fn test_token_cancel_idempotent() {
        let token = CancellationToken::new();
        token.cancel("first reason");
        token.cancel("second reason");

        // First reason wins
        assert_eq!(token.reason(), Some("first reason".to_string()));
    }

    #[test]
    fn test_ensure_active_carries_reason() {
        let token = CancellationToken::new();
        token.cancel("watchdog fired");

        let err = token.ensure_active().unwrap_err();
        match err {
            PromotionError::Cancelled(reason) => {
                assert_eq!(reason, "watchdog fired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
