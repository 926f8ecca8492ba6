//! Per-client rate-limit bookkeeping.
//!
//! The provider's `X-RateLimit-Reset` header is relative to an unspecified first call and
//! lags behind the local clock by a few seconds, so it cannot be trusted. Instead the window
//! is tracked locally: the first response seen after the previous window expired starts a
//! new one of fixed length. A `429` closes the [`Gate`] until that window is over, which
//! holds back every other call made through the same client.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep};

/// Whether calls on a client may send requests right now.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Requests proceed immediately.
    Open,
    /// A call hit a rate limit and is waiting it out; everyone else waits too.
    Closed {
        /// When the waiting call will reopen the gate.
        reopen_at: Instant,
    },
}

impl Gate {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

#[derive(Debug)]
pub(crate) struct RateLimiter {
    window: Duration,
    gate: watch::Sender<Gate>,
    reset_deadline: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub(crate) fn new(window: Duration) -> Self {
        let (gate, _) = watch::channel(Gate::Open);

        Self {
            window,
            gate,
            reset_deadline: Mutex::new(None),
        }
    }

    pub(crate) fn gate(&self) -> Gate {
        *self.gate.borrow()
    }

    pub(crate) fn reset_deadline(&self) -> Option<Instant> {
        *self
            .reset_deadline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Suspends until the gate is open. The state is re-checked after every change, so a
    /// waiter woken by a reopen that was immediately followed by another close keeps waiting.
    pub(crate) async fn wait_until_open(&self) {
        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        _ = gate.wait_for(Gate::is_open).await;
    }

    /// Records a response received at `now` and returns the deadline of the current window.
    ///
    /// A tracked deadline is only replaced once it lies in the past; it is never pushed back
    /// while still valid.
    pub(crate) fn observe(&self, now: Instant) -> Instant {
        let mut deadline = self
            .reset_deadline
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match *deadline {
            Some(at) if at >= now => at,
            _ => {
                let at = now + self.window;
                *deadline = Some(at);
                at
            }
        }
    }

    /// Closes the gate, sleeps until `deadline` (measured from `now`) and reopens it.
    ///
    /// The gate is reopened even if the calling future is dropped mid-sleep.
    pub(crate) async fn wait_out(&self, now: Instant, deadline: Instant) {
        let wait = deadline.saturating_duration_since(now);
        let _reopen = self.close(deadline);

        sleep(wait).await;
    }

    fn close(&self, reopen_at: Instant) -> ReopenOnDrop<'_> {
        self.gate.send_replace(Gate::Closed { reopen_at });
        ReopenOnDrop(&self.gate)
    }
}

struct ReopenOnDrop<'gate>(&'gate watch::Sender<Gate>);

impl Drop for ReopenOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(Gate::Open);
    }
}
