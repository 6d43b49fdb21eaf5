//! Per-request cancellation and deadlines.
//!
//! A [`RequestContext`] travels with every call that may suspend on an
//! external collaborator. Once the context is done, resolvers stop issuing
//! new provider calls and in-flight HTTP requests are abandoned.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Cancellation token plus an optional absolute deadline.
///
/// Cloning a context shares its token, so cancelling any clone cancels all
/// of them.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use wayfarer_core::RequestContext;
///
/// let ctx = RequestContext::new().with_timeout(Duration::from_secs(30));
/// assert!(!ctx.is_done());
///
/// ctx.cancel();
/// assert!(ctx.is_done());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an existing cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Set an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Token observed by async call sites.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Configured deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel the context and every clone sharing its token.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether the context was cancelled or its deadline has passed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cancellation.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Time left before the deadline; `None` means unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Clamp `timeout` to the time left before the deadline.
    #[must_use]
    pub fn clamp_timeout(&self, timeout: Duration) -> Duration {
        self.remaining()
            .map_or(timeout, |remaining| remaining.min(timeout))
    }
}
