//! Deadline and cancellation propagation
//!
//! An [`ExecutionContext`] travels with every request. Each operation that can block
//! runs through [`ExecutionContext::run`], so it returns early once the deadline passes
//! or the caller goes away. Children never extend their parent's deadline.

use crate::utils::error::{GatewayError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Stand-in for "never" when a timeout does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `timeout` from now, saturating at a far-future instant
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or(now + FAR_FUTURE)
}

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    deadline: Instant,
    cancel: CancellationToken,
}

impl ExecutionContext {
    /// Root context expiring `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: deadline_after(timeout),
            cancel: CancellationToken::new(),
        }
    }

    /// Child context: expires at the earlier of the parent deadline and `timeout` from
    /// now, and is cancelled whenever the parent is
    pub fn child(&self, timeout: Duration) -> Self {
        Self {
            deadline: self.deadline.min(deadline_after(timeout)),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolves once the context is cancelled
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Cancels the context when dropped; hold it for the lifetime of a request handler
    pub fn drop_guard(&self) -> DropGuard {
        self.cancel.clone().drop_guard()
    }

    /// Fail early if the context is already done
    pub fn check(&self, what: &str) -> Result<()> {
        if self.is_cancelled() {
            return Err(GatewayError::cancelled(format!("{what} cancelled")));
        }
        if self.is_expired() {
            return Err(GatewayError::deadline_exceeded(format!(
                "{what} exceeded its deadline"
            )));
        }
        Ok(())
    }

    /// Drive `fut` until it completes, the deadline passes, or the context is cancelled
    pub async fn run<F, T>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check(what)?;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(GatewayError::cancelled(format!("{what} cancelled")))
            }
            outcome = tokio::time::timeout_at(self.deadline, fut) => {
                outcome.map_err(|_| {
                    GatewayError::deadline_exceeded(format!("{what} exceeded its deadline"))
                })?
            }
        }
    }
}
