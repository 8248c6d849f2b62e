//! Non-blocking single-flight guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Fetch progress of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InFlight,
}

/// Allows at most one fetch in flight.
///
/// This is a guard, not a queue: a caller that cannot acquire skips its
/// fetch instead of waiting.
///
/// # Example
///
/// ```
/// use photogrid::search::{FetchGate, FetchState};
///
/// let gate = FetchGate::new();
/// let permit = gate.try_acquire().unwrap();
/// assert!(gate.try_acquire().is_none());
/// assert_eq!(gate.state(), FetchState::InFlight);
///
/// permit.release();
/// assert_eq!(gate.state(), FetchState::Idle);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FetchGate {
    in_flight: Arc<AtomicBool>,
}

impl FetchGate {
    /// Create an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move Idle→InFlight, returning the permit that will move it back.
    ///
    /// Returns `None` without side effects when a fetch is already in flight.
    pub fn try_acquire(&self) -> Option<FetchPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    /// Current state.
    pub fn state(&self) -> FetchState {
        if self.is_in_flight() {
            FetchState::InFlight
        } else {
            FetchState::Idle
        }
    }

    /// Whether a permit is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Proof of an acquired [`FetchGate`].
///
/// Releasing is tied to the permit's lifetime, so every exit path of a
/// fetch (applied, failed, stale, or a dropped task) returns the gate to
/// Idle exactly once.
#[derive(Debug)]
#[must_use = "dropping the permit releases the gate immediately"]
pub struct FetchPermit {
    in_flight: Arc<AtomicBool>,
}

impl FetchPermit {
    /// Release the gate explicitly.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
