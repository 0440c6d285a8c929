/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Cancellation and deadline for one resolution run.
 */

//! Cooperative cancellation for resolution.
//!
//! A [`ResolveContext`] is passed by reference through the resolver and into
//! every provider call. It carries a `tokio_util` cancellation token (shared
//! by clones) and an optional deadline. The resolver checks it before every
//! subtree and every fetch, and races in-flight fetches against it.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;

#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing token, e.g. one tied to Ctrl+C handling.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Request cancellation. Every clone of this context observes it.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// `Err` once cancellation was requested or the deadline has passed.
    pub fn check(&self) -> Result<(), ResolveError> {
        if self.cancellation.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ResolveError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Completes when the context is cancelled or its deadline passes.
    ///
    /// Never completes for a context without a deadline that is never
    /// cancelled; meant to be raced against real work with `select!`.
    pub async fn interrupted(&self) -> ResolveError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.cancellation.cancelled() => ResolveError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ResolveError::DeadlineExceeded,
                }
            }
            None => {
                self.cancellation.cancelled().await;
                ResolveError::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_live() {
        let ctx = ResolveContext::new();
        assert!(!ctx.is_cancelled());
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_clone_shares_cancellation() {
        let ctx = ResolveContext::new();
        let clone = ctx.clone();
        ctx.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(clone.check(), Err(ResolveError::Cancelled)));
    }

    #[test]
    fn test_external_token() {
        let token = CancellationToken::new();
        let ctx = ResolveContext::new().with_cancellation(token.child_token());
        token.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_deadline_in_the_past() {
        let ctx = ResolveContext::new().with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(ResolveError::DeadlineExceeded)));
        assert!(matches!(ctx.interrupted().await, ResolveError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_deadline() {
        let ctx = ResolveContext::new().with_timeout(Duration::from_secs(60));
        ctx.cancel();
        assert!(matches!(ctx.check(), Err(ResolveError::Cancelled)));
        assert!(matches!(ctx.interrupted().await, ResolveError::Cancelled));
    }
}
