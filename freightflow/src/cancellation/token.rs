//! Cancellation token with an optional deadline.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const DEADLINE_EXCEEDED: &str = "deadline exceeded";

/// A token for cooperative cancellation.
///
/// A token is cancelled either explicitly or by its deadline passing.
/// Cancellation is idempotent: only the first reason is kept. Work that has
/// already started is never interrupted; callers check the token before
/// starting each unit of work.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: RwLock<Option<String>>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Creates a token that is only cancelled explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that cancels itself at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// Creates a token that cancels itself after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Requests cancellation with a reason.
    pub fn cancel(&self, reason: impl Into<String>) {
        // The reason is stored before the flag is published.
        let mut slot = self.reason.write();
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }
        *slot = Some(reason.into());
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation has been requested or the deadline passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.cancel(DEADLINE_EXCEEDED);
            return true;
        }
        false
    }

    /// Returns the cancellation reason, if cancelled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        if self.is_cancelled() {
            self.reason.read().clone()
        } else {
            None
        }
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .field("deadline", &self.deadline)
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
        assert!(token.deadline().is_none());
    }

    #[test]
    fn test_token_cancel_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel("client went away");
        token.cancel("shutdown");

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some("client went away".to_string()));
    }

    #[test]
    fn test_reason_visible_whenever_cancelled() {
        for _ in 0..200 {
            let token = CancellationToken::new();
            std::thread::scope(|scope| {
                scope.spawn(|| token.cancel("shutdown"));
                scope.spawn(|| loop {
                    if token.is_cancelled() {
                        assert_eq!(token.reason(), Some("shutdown".to_string()));
                        break;
                    }
                    std::hint::spin_loop();
                });
            });
        }
    }

    #[test]
    fn test_token_deadline_in_past() {
        let token = CancellationToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some(DEADLINE_EXCEEDED.to_string()));
    }

    #[test]
    fn test_token_deadline_in_future() {
        let token = CancellationToken::with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_explicit_cancel_before_deadline_keeps_reason() {
        let token = CancellationToken::with_timeout(Duration::ZERO);
        token.cancel("shutdown");
        assert_eq!(token.reason(), Some("shutdown".to_string()));
    }
}
