//! Per-call cancellation and deadlines.
//!
//! Every repository operation takes a [`QueryContext`]. The context is checked
//! before a connection is requested, and the in-flight future is raced against
//! the cancellation token and the deadline. Losing the race drops the future;
//! the repository then closes the connection the future was using.

use crate::error::{CatalogError, CatalogResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// A context with no deadline that is never cancelled unless asked to.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().bounded(timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Attach an externally owned cancellation token (e.g. a shutdown signal).
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Same token, with the deadline tightened to at most `timeout` from now.
    ///
    /// A `timeout` too large to represent as an instant adds no bound.
    pub fn bounded(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(existing), Some(candidate)) => Some(existing.min(candidate)),
            (existing, candidate) => existing.or(candidate),
        };
        Self {
            token: self.token.clone(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context is already cancelled or past its deadline.
    pub fn check(&self, operation: &str) -> CatalogResult<()> {
        if self.token.is_cancelled() {
            return Err(CatalogError::cancelled(operation));
        }
        if let Some(deadline) = self.deadline {
            let now = Instant::now();
            if deadline <= now {
                return Err(CatalogError::timeout(operation, Duration::ZERO));
            }
        }
        Ok(())
    }

    /// Run `fut` under this context.
    ///
    /// `fut` is never polled when the context is already done.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> CatalogResult<T>
    where
        F: Future<Output = CatalogResult<T>>,
    {
        self.check(operation)?;
        let started = Instant::now();

        let bounded = async {
            match self.deadline {
                Some(deadline) => match timeout_at(deadline, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(CatalogError::timeout(operation, started.elapsed())),
                },
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CatalogError::cancelled(operation)),
            result = bounded => result,
        }
    }
}
