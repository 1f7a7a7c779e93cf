//! Debounce gate coordinating the synchronous poll path with the
//! asynchronous refresh path.
//!
//! The atomic in-flight flag is the only synchronization between the host
//! thread reading values and the background task replacing them: the thread
//! that wins the compare-and-swap owns the refresh until it calls one of the
//! `complete_*` methods.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::config::{MAX_UPDATE_INTERVAL_MINUTES, MIN_UPDATE_INTERVAL_MINUTES};

/// Tracks when cached values were last accepted and whether a refresh is
/// currently in flight
#[derive(Debug)]
pub struct RefreshGate {
    interval: Duration,
    last_update: RwLock<Option<DateTime<Utc>>>,
    in_flight: AtomicBool,
}

impl RefreshGate {
    /// Create a gate that fires every `minutes`, clamped into [1, 60]
    pub fn new(minutes: u32) -> Self {
        let minutes = minutes.clamp(MIN_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES);
        Self {
            interval: Duration::minutes(minutes as i64),
            last_update: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Refresh interval this gate was built with
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Timestamp of the last accepted update, if any
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read().unwrap()
    }

    /// Whether a refresh is currently in flight
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Decide whether a refresh is due at `now` and, if so, claim the
    /// in-flight slot. Returns true at most once per due window; a caller
    /// that gets true must eventually call [`complete_success`] or
    /// [`complete_failure`].
    ///
    /// [`complete_success`]: RefreshGate::complete_success
    /// [`complete_failure`]: RefreshGate::complete_failure
    pub fn try_begin(&self, now: DateTime<Utc>) -> bool {
        let due = match self.last_update() {
            None => true,
            Some(last) => now - last >= self.interval,
        };
        if !due {
            return false;
        }
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Record a successful refresh triggered by the poll at `trigger_ts` and
    /// release the in-flight slot
    pub fn complete_success(&self, trigger_ts: DateTime<Utc>) {
        *self.last_update.write().unwrap() = Some(trigger_ts);
        self.in_flight.store(false, Ordering::SeqCst);
    }

    /// Release the in-flight slot without touching `last_update`; the next
    /// poll past the interval is the natural retry
    pub fn complete_failure(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}
