//! Reconciles fetched-count changes with what is on screen.
//!
//! Count deltas that arrive while the viewport is moving are coalesced and
//! applied once motion stops, so cells are never redrawn mid-gesture.

use crate::search::{PaginationCoordinator, PendingFetch, SessionHandle};

use super::surface::RenderSurface;
use super::viewport::ViewportSnapshot;

/// Default lookahead for [`ViewportReconciler::should_prefetch`].
pub const DEFAULT_PREFETCH_DISTANCE: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Idle,
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDelta {
    old: usize,
    new: usize,
    reset: bool,
}

impl PendingDelta {
    const fn merge(self, other: Self) -> Self {
        Self {
            old: if other.old < self.old { other.old } else { self.old },
            new: if other.new > self.new { other.new } else { self.new },
            reset: self.reset || other.reset,
        }
    }
}

/// Turns `(old, new)` fetched-count deltas into minimal surface updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportReconciler {
    state: ReconcileState,
    pending: Option<PendingDelta>,
    prefetch_distance: usize,
}

impl Default for ViewportReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_PREFETCH_DISTANCE)
    }
}

impl ViewportReconciler {
    /// Create a reconciler that prefetches once the viewport needs an index
    /// within `prefetch_distance` of the fetched boundary.
    pub const fn new(prefetch_distance: usize) -> Self {
        Self {
            state: ReconcileState::Idle,
            pending: None,
            prefetch_distance,
        }
    }

    pub const fn state(&self) -> ReconcileState {
        self.state
    }

    pub const fn prefetch_distance(&self) -> usize {
        self.prefetch_distance
    }

    /// The fetched count went from `old` to `new`.
    pub fn counts_changed(
        &mut self,
        old: usize,
        new: usize,
        snapshot: &ViewportSnapshot,
        surface: &mut impl RenderSurface,
    ) {
        self.receive(
            PendingDelta {
                old,
                new,
                reset: false,
            },
            snapshot,
            surface,
        );
    }

    /// The coordinator switched to a new session; the grid must be rebuilt.
    pub fn session_replaced(&mut self, snapshot: &ViewportSnapshot, surface: &mut impl RenderSurface) {
        // Deltas of the replaced session no longer describe the grid.
        self.pending = None;
        self.receive(
            PendingDelta {
                old: 0,
                new: 0,
                reset: true,
            },
            snapshot,
            surface,
        );
    }

    /// Motion stopped: apply whatever was deferred.
    ///
    /// Returns true if a deferred reconciliation ran.
    pub fn motion_ended(&mut self, snapshot: &ViewportSnapshot, surface: &mut impl RenderSurface) -> bool {
        self.state = ReconcileState::Idle;
        let Some(delta) = self.pending.take() else {
            return false;
        };
        tracing::debug!(old = delta.old, new = delta.new, reset = delta.reset, "applying deferred reconciliation");
        Self::apply(delta, snapshot, surface);
        true
    }

    /// Whether a viewport needing `max_index` should trigger the next page.
    pub const fn should_prefetch(&self, max_index: usize, fetched_count: usize) -> bool {
        max_index.saturating_add(self.prefetch_distance) >= fetched_count
    }

    /// Ask `coordinator` for more if the viewport needs `max_index`.
    pub fn prefetch(
        &self,
        max_index: Option<usize>,
        coordinator: &PaginationCoordinator,
        handle: SessionHandle,
    ) -> Option<PendingFetch> {
        let max_index = max_index?;
        if !self.should_prefetch(max_index, coordinator.fetched_count()) {
            return None;
        }
        coordinator.begin_fetch(handle)
    }

    fn receive(&mut self, delta: PendingDelta, snapshot: &ViewportSnapshot, surface: &mut impl RenderSurface) {
        if snapshot.is_moving {
            let merged = self.pending.map_or(delta, |pending| pending.merge(delta));
            tracing::debug!(old = merged.old, new = merged.new, reset = merged.reset, "deferring reconciliation while moving");
            self.pending = Some(merged);
            self.state = ReconcileState::Deferred;
            return;
        }
        Self::apply(delta, snapshot, surface);
    }

    fn apply(delta: PendingDelta, snapshot: &ViewportSnapshot, surface: &mut impl RenderSurface) {
        if delta.reset || (delta.old == 0 && delta.new > 0) {
            surface.full_reload();
            return;
        }
        if delta.old >= delta.new {
            return;
        }
        let refreshed = snapshot.intersect(delta.old, delta.new);
        if refreshed.is_empty() {
            tracing::debug!(old = delta.old, new = delta.new, "no visible cells in range");
            return;
        }
        surface.counts_changed(delta.old, delta.new, &refreshed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{PhotoPage, RawPhoto};
    use crate::ui::surface::SurfaceEvent;

    fn counts(old: usize, new: usize, refreshed: std::ops::Range<usize>) -> SurfaceEvent {
        SurfaceEvent::CountsChanged {
            old,
            new,
            refreshed: refreshed.collect(),
        }
    }

    #[test]
    fn test_first_page_triggers_full_reload() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        reconciler.counts_changed(0, 25, &ViewportSnapshot::still(0..20), &mut events);
        assert_eq!(events, vec![SurfaceEvent::FullReload]);
    }

    #[test]
    fn test_still_delta_refreshes_visible_intersection_only() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        reconciler.counts_changed(25, 50, &ViewportSnapshot::still(15..35), &mut events);
        assert_eq!(events, vec![counts(25, 50, 25..35)]);
        assert_eq!(reconciler.state(), ReconcileState::Idle);
    }

    #[test]
    fn test_delta_outside_viewport_emits_nothing() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        reconciler.counts_changed(25, 50, &ViewportSnapshot::still(0..20), &mut events);
        reconciler.counts_changed(50, 50, &ViewportSnapshot::still(40..60), &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_moving_defers_until_motion_ends() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        reconciler.counts_changed(25, 50, &ViewportSnapshot::moving(20..40), &mut events);
        assert!(events.is_empty());
        assert_eq!(reconciler.state(), ReconcileState::Deferred);

        assert!(reconciler.motion_ended(&ViewportSnapshot::still(20..40), &mut events));
        assert_eq!(events, vec![counts(25, 50, 25..40)]);
        assert_eq!(reconciler.state(), ReconcileState::Idle);
    }

    #[test]
    fn test_deltas_during_motion_coalesce_into_union() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        let moving = ViewportSnapshot::moving(30..90);
        reconciler.counts_changed(25, 50, &moving, &mut events);
        reconciler.counts_changed(50, 75, &moving, &mut events);
        assert!(events.is_empty());

        reconciler.motion_ended(&ViewportSnapshot::still(40..60), &mut events);
        assert_eq!(events, vec![counts(25, 75, 40..60)]);
    }

    #[test]
    fn test_motion_end_without_pending_is_noop() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        assert!(!reconciler.motion_ended(&ViewportSnapshot::still(0..20), &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn test_session_replaced_while_still_reloads() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        reconciler.session_replaced(&ViewportSnapshot::still(0..0), &mut events);
        assert_eq!(events, vec![SurfaceEvent::FullReload]);
    }

    #[test]
    fn test_reset_during_motion_wins_over_partial_patch() {
        let mut reconciler = ViewportReconciler::default();
        let mut events = Vec::new();
        let moving = ViewportSnapshot::moving(0..20);
        reconciler.counts_changed(25, 50, &moving, &mut events);
        reconciler.session_replaced(&moving, &mut events);
        reconciler.counts_changed(0, 25, &moving, &mut events);
        assert!(events.is_empty());

        reconciler.motion_ended(&ViewportSnapshot::still(0..20), &mut events);
        assert_eq!(events, vec![SurfaceEvent::FullReload]);
    }

    #[test]
    fn test_should_prefetch_threshold() {
        let strict = ViewportReconciler::new(0);
        assert!(!strict.should_prefetch(24, 25));
        assert!(strict.should_prefetch(25, 25));

        let lookahead = ViewportReconciler::default();
        assert!(lookahead.should_prefetch(24, 25));
        assert!(!lookahead.should_prefetch(23, 25));
    }

    #[test]
    fn test_prefetch_begins_fetch_on_coordinator() {
        let reconciler = ViewportReconciler::default();
        let mut coordinator = PaginationCoordinator::new();
        let handle = coordinator.start_new_search("cat");
        let pending = coordinator.begin_fetch(handle).unwrap();
        let page = PhotoPage {
            items: (0..25).map(|i| RawPhoto::new(format!("{i}"), Some("file:///a.png"))).collect(),
            total_count: 100,
        };
        coordinator.complete_fetch(pending, Ok(page));

        assert!(reconciler.prefetch(Some(10), &coordinator, handle).is_none());
        assert!(reconciler.prefetch(None, &coordinator, handle).is_none());
        let pending = reconciler.prefetch(Some(24), &coordinator, handle).unwrap();
        assert_eq!(pending.page(), 2);
        assert!(reconciler.prefetch(Some(24), &coordinator, handle).is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn no_events_while_moving(
                deltas in proptest::collection::vec((1..500usize, 0..200usize), 1..20),
                start in 0..500usize,
                len in 1..60usize,
            ) {
                let mut reconciler = ViewportReconciler::default();
                let mut events = Vec::new();
                let moving = ViewportSnapshot::moving(start..start + len);
                let mut min_old = usize::MAX;
                let mut max_new = 0;
                for (old, grow) in deltas {
                    reconciler.counts_changed(old, old + grow, &moving, &mut events);
                    min_old = min_old.min(old);
                    max_new = max_new.max(old + grow);
                }
                prop_assert!(events.is_empty());

                let still = ViewportSnapshot::still(start..start + len);
                reconciler.motion_ended(&still, &mut events);
                prop_assert!(events.len() <= 1);
                if let Some(SurfaceEvent::CountsChanged { old, new, refreshed }) = events.first() {
                    prop_assert_eq!(*old, min_old);
                    prop_assert_eq!(*new, max_new);
                    prop_assert_eq!(refreshed.clone(), still.intersect(min_old, max_new));
                }
            }
        }
    }
}
