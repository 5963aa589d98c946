//! Debounce gate for live reload.
//!
//! Editors often emit several write events per save. The gate accepts a
//! change only when it arrives more than the quiet interval after the
//! previously accepted one; everything in between is dropped, not queued.
//! The signal therefore fires on the event that breaks the quiet window,
//! not on the last event of a burst.

use std::time::{Duration, Instant};

/// Default quiet interval in milliseconds.
pub(crate) const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Timestamp gate owned by the watcher loop.
#[derive(Debug)]
pub(crate) struct DebounceGate {
    quiet: Duration,
    last_accepted: Option<Instant>,
}

impl DebounceGate {
    /// Create a gate with the given quiet interval.
    pub(crate) fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_accepted: None,
        }
    }

    /// Decide whether a change observed now should be propagated.
    pub(crate) fn accept(&mut self) -> bool {
        self.accept_at(Instant::now())
    }

    /// Decide whether a change observed at `now` should be propagated.
    ///
    /// Accepting records `now` as the new reference point; rejecting leaves
    /// the state untouched.
    pub(crate) fn accept_at(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.saturating_duration_since(last) <= self.quiet => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}
