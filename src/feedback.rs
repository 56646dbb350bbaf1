//! User-visible feedback around gateway calls: the in-flight indicator and
//! the error notifier.
//!
//! DESIGN
//! ======
//! The indicator itself is a dumb `show`/`hide` collaborator. [`InFlight`]
//! wraps it with a counter so overlapping calls keep it visible until the
//! last one finishes. [`InFlightGuard`] releases on drop, covering every
//! exit path including early returns and cancelled futures.

#[cfg(test)]
#[path = "feedback_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, PoisonError};

/// Visual "request in flight" signal. Both calls must be idempotent.
pub trait InFlightIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Surfaces a failure message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

// =============================================================================
// REFERENCE-COUNTED INDICATOR
// =============================================================================

struct InFlightInner {
    count: Mutex<usize>,
    indicator: Arc<dyn InFlightIndicator>,
}

/// Reference-counted front for an [`InFlightIndicator`].
#[derive(Clone)]
pub struct InFlight {
    inner: Arc<InFlightInner>,
}

impl InFlight {
    #[must_use]
    pub fn new(indicator: Arc<dyn InFlightIndicator>) -> Self {
        Self { inner: Arc::new(InFlightInner { count: Mutex::new(0), indicator }) }
    }

    /// Mark one call as started. The indicator is shown on the first concurrent call.
    #[must_use = "dropping the guard ends the call immediately"]
    pub fn begin(&self) -> InFlightGuard {
        let mut count = self.inner.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        if *count == 1 {
            self.inner.indicator.show();
        }
        InFlightGuard { inner: Arc::clone(&self.inner) }
    }

    /// Number of calls currently in flight.
    #[must_use]
    pub fn active(&self) -> usize {
        *self.inner.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ends one in-flight call when dropped.
pub struct InFlightGuard {
    inner: Arc<InFlightInner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut count = self.inner.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.inner.indicator.hide();
        }
    }
}

// =============================================================================
// STOCK COLLABORATORS
// =============================================================================

/// Indicator that emits tracing events instead of drawing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingIndicator;

impl InFlightIndicator for TracingIndicator {
    fn show(&self) {
        tracing::debug!("gateway request in flight");
    }

    fn hide(&self) {
        tracing::debug!("gateway idle");
    }
}

/// Notifier that writes `Error: <message>` to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(%message, "user notified of gateway failure");
    }
}
