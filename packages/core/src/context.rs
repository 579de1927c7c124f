//! Cancellation and deadlines for datastore operations.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Operation, Result};

/// Carries a caller's cancellation signal and optional deadline into an
/// operation.
///
/// Cloning a context shares its cancellation; [`Context::child`] derives a
/// context that is canceled with its parent but can also be canceled on its
/// own.
///
/// ```rust
/// use std::time::Duration;
/// use datastore_core::Context;
///
/// let ctx = Context::background().with_timeout(Duration::from_secs(5));
/// assert!(ctx.deadline().is_some());
/// assert!(!ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a context canceled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a child context that expires after `timeout`.
    ///
    /// A timeout too large to represent as an instant adds no deadline; any
    /// inherited deadline still applies.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a child context that expires at `deadline`.
    ///
    /// An earlier deadline inherited from this context wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.child();
        child.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        child
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

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail fast if the context is already done.
    pub fn check(&self, op: Operation) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Canceled { op });
        }
        if self.deadline.is_some_and(|at| Instant::now() >= at) {
            return Err(Error::DeadlineExceeded { op });
        }
        Ok(())
    }

    /// Drive `fut` until it completes or the context is done.
    ///
    /// `fut` is not polled at all when the context is already done. When the
    /// context finishes first, `fut` is dropped, which aborts whatever it was
    /// doing.
    pub async fn run<F>(&self, op: Operation, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        self.check(op)?;

        let expired = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Canceled { op }),
            _ = expired => Err(Error::DeadlineExceeded { op }),
            output = fut => Ok(output),
        }
    }
}
