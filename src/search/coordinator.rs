//! Paginated fetch coordination.
//!
//! A fetch is split in two halves so the network wait never holds the
//! coordinator: [`PaginationCoordinator::begin_fetch`] checks the session and
//! acquires its gate, and [`PaginationCoordinator::complete_fetch`] applies the
//! result only if the session that issued it is still current. Both halves
//! run on the event-loop thread; only the source call in between is
//! asynchronous.

use std::cell::RefCell;

use anyhow::Result;

use super::SearchError;
use super::gate::{FetchGate, FetchPermit};
use super::session::{Photo, PhotoPage, SearchSession, SessionHandle};
use super::source::PhotoSource;

/// What happened to a `request_more` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No fetch was issued: stale handle, fetch already in flight, or no
    /// more pages.
    NotStarted,
    /// The page was appended; the fetched count went from `old` to `new`.
    Applied { old: usize, new: usize },
    /// The session was superseded while the fetch was in flight.
    Discarded,
    /// The source failed. The session is unchanged, so a retry is possible.
    Failed(String),
}

/// A fetch that has been issued but not resolved.
///
/// Owns the session's [`FetchPermit`]; the gate is released when this value
/// is completed or dropped.
#[derive(Debug)]
pub struct PendingFetch {
    handle: SessionHandle,
    term: String,
    page: u32,
    permit: FetchPermit,
}

impl PendingFetch {
    pub const fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub const fn page(&self) -> u32 {
        self.page
    }
}

/// Owns the current [`SearchSession`] and its [`FetchGate`].
#[derive(Debug)]
pub struct PaginationCoordinator {
    session: SearchSession,
    gate: FetchGate,
    current: SessionHandle,
    next_id: u64,
}

impl Default for PaginationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationCoordinator {
    /// Create a coordinator holding an empty session for the empty term.
    pub fn new() -> Self {
        Self {
            session: SearchSession::new(""),
            gate: FetchGate::new(),
            current: SessionHandle::new(0),
            next_id: 1,
        }
    }

    /// Replace the current session with a fresh one for `term`.
    ///
    /// Every previously returned handle is superseded for good.
    pub fn start_new_search(&mut self, term: impl Into<String>) -> SessionHandle {
        let handle = SessionHandle::new(self.next_id);
        self.next_id += 1;
        self.session = SearchSession::new(term);
        self.gate = FetchGate::new();
        self.current = handle;
        tracing::info!(session = handle.id(), term = %self.session.search_term(), "search started");
        handle
    }

    /// Whether `handle` identifies the current session.
    pub fn is_current(&self, handle: SessionHandle) -> bool {
        self.current == handle
    }

    /// Handle of the current session.
    pub const fn current_handle(&self) -> SessionHandle {
        self.current
    }

    /// Issue the next page fetch for `handle`.
    ///
    /// Returns `None` if `handle` is stale, a fetch is already in flight, or
    /// the session has no more pages.
    pub fn begin_fetch(&self, handle: SessionHandle) -> Option<PendingFetch> {
        if !self.is_current(handle) {
            tracing::debug!(session = handle.id(), "fetch not started: {}", SearchError::StaleResult);
            return None;
        }
        if !self.session.has_more() {
            tracing::debug!(session = handle.id(), "fetch not started: no more pages");
            return None;
        }
        let Some(permit) = self.gate.try_acquire() else {
            tracing::debug!(session = handle.id(), "fetch not started: already in flight");
            return None;
        };
        let page = self.session.page_number();
        tracing::debug!(session = handle.id(), page, "fetch started");
        Some(PendingFetch {
            handle,
            term: self.session.search_term().to_string(),
            page,
            permit,
        })
    }

    /// Resolve a fetch issued by [`begin_fetch`](Self::begin_fetch).
    pub fn complete_fetch(&mut self, pending: PendingFetch, result: Result<PhotoPage>) -> FetchOutcome {
        let PendingFetch {
            handle,
            term,
            page,
            permit,
        } = pending;

        if !self.is_current(handle) {
            permit.release();
            tracing::debug!(session = handle.id(), %term, page, "discarding: {}", SearchError::StaleResult);
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(photos) => {
                let (old, new) = self.session.append_page(photos);
                permit.release();
                tracing::info!(
                    session = handle.id(),
                    page,
                    old,
                    new,
                    total = self.session.total_count(),
                    "page applied"
                );
                FetchOutcome::Applied { old, new }
            }
            Err(err) => {
                permit.release();
                let message = format!("{err:#}");
                tracing::warn!(
                    session = handle.id(),
                    %term,
                    page,
                    "{}",
                    SearchError::FetchFailed(message.clone())
                );
                FetchOutcome::Failed(message)
            }
        }
    }

    pub fn current_search_term(&self) -> &str {
        self.session.search_term()
    }

    pub fn is_fetch_in_progress(&self) -> bool {
        self.gate.is_in_flight()
    }

    pub fn fetched_count(&self) -> usize {
        self.session.items().len()
    }

    pub const fn total_count(&self) -> usize {
        self.session.total_count()
    }

    pub const fn has_more(&self) -> bool {
        self.session.has_more()
    }

    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Photo at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= fetched_count()`; callers must only ask for
    /// fetched indices.
    pub fn photo_at(&self, index: usize) -> &Photo {
        let fetched = self.fetched_count();
        assert!(index < fetched, "photo index {index} out of range (fetched {fetched})");
        &self.session.items()[index]
    }

    /// Photo at `index`, if it has been fetched.
    pub fn get(&self, index: usize) -> Option<&Photo> {
        self.session.items().get(index)
    }
}

/// Fetch the next page for `handle` and apply it if still current.
///
/// No borrow of `coordinator` is held while the source runs, so the caller
/// may start a new search (or issue another request, which will not start)
/// while this future is pending.
pub async fn request_more<S: PhotoSource>(
    coordinator: &RefCell<PaginationCoordinator>,
    source: &S,
    handle: SessionHandle,
) -> FetchOutcome {
    let Some(pending) = coordinator.borrow().begin_fetch(handle) else {
        return FetchOutcome::NotStarted;
    };
    let result = source.fetch(pending.term(), pending.page()).await;
    coordinator.borrow_mut().complete_fetch(pending, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::RawPhoto;

    fn page(count: usize, total: usize) -> PhotoPage {
        PhotoPage {
            items: (0..count)
                .map(|i| RawPhoto::new(format!("photo {i}"), Some("file:///p.png")))
                .collect(),
            total_count: total,
        }
    }

    #[test]
    fn test_start_new_search_resets_session() {
        let mut coordinator = PaginationCoordinator::new();
        let first = coordinator.start_new_search("cat");
        let pending = coordinator.begin_fetch(first).unwrap();
        coordinator.complete_fetch(pending, Ok(page(5, 10)));

        let second = coordinator.start_new_search("dog");
        assert_ne!(first, second);
        assert_eq!(coordinator.current_search_term(), "dog");
        assert_eq!(coordinator.fetched_count(), 0);
        assert_eq!(coordinator.total_count(), 0);
        assert!(coordinator.is_current(second));
        assert!(!coordinator.is_current(first));
    }

    #[test]
    fn test_begin_fetch_requests_next_page() {
        let mut coordinator = PaginationCoordinator::new();
        let handle = coordinator.start_new_search("cat");
        let pending = coordinator.begin_fetch(handle).unwrap();
        assert_eq!(pending.page(), 1);
        assert_eq!(pending.term(), "cat");
        assert!(coordinator.is_fetch_in_progress());

        let outcome = coordinator.complete_fetch(pending, Ok(page(25, 100)));
        assert_eq!(outcome, FetchOutcome::Applied { old: 0, new: 25 });
        assert!(!coordinator.is_fetch_in_progress());

        let pending = coordinator.begin_fetch(handle).unwrap();
        assert_eq!(pending.page(), 2);
    }

    #[test]
    fn test_second_begin_while_in_flight_is_refused() {
        let mut coordinator = PaginationCoordinator::new();
        let handle = coordinator.start_new_search("cat");
        let _pending = coordinator.begin_fetch(handle).unwrap();
        assert!(coordinator.begin_fetch(handle).is_none());
    }

    #[test]
    fn test_stale_handle_does_not_start() {
        let mut coordinator = PaginationCoordinator::new();
        let old = coordinator.start_new_search("cat");
        coordinator.start_new_search("dog");
        assert!(coordinator.begin_fetch(old).is_none());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut coordinator = PaginationCoordinator::new();
        let cat = coordinator.start_new_search("cat");
        let pending = coordinator.begin_fetch(cat).unwrap();

        let dog = coordinator.start_new_search("dog");
        let outcome = coordinator.complete_fetch(pending, Ok(page(25, 100)));
        assert_eq!(outcome, FetchOutcome::Discarded);
        assert_eq!(coordinator.fetched_count(), 0);
        assert_eq!(coordinator.current_search_term(), "dog");
        assert!(coordinator.begin_fetch(dog).is_some());
    }

    #[test]
    fn test_new_session_gate_is_independent_of_old_fetch() {
        let mut coordinator = PaginationCoordinator::new();
        let cat = coordinator.start_new_search("cat");
        let stale = coordinator.begin_fetch(cat).unwrap();

        let dog = coordinator.start_new_search("dog");
        let current = coordinator.begin_fetch(dog).unwrap();
        assert_eq!(coordinator.complete_fetch(stale, Ok(page(3, 3))), FetchOutcome::Discarded);
        assert!(coordinator.is_fetch_in_progress());
        assert_eq!(
            coordinator.complete_fetch(current, Ok(page(2, 2))),
            FetchOutcome::Applied { old: 0, new: 2 }
        );
    }

    #[test]
    fn test_failure_leaves_session_for_retry() {
        let mut coordinator = PaginationCoordinator::new();
        let handle = coordinator.start_new_search("cat");
        let pending = coordinator.begin_fetch(handle).unwrap();
        let outcome = coordinator.complete_fetch(pending, Err(anyhow::anyhow!("offline")));
        assert_eq!(outcome, FetchOutcome::Failed("offline".to_string()));
        assert!(!coordinator.is_fetch_in_progress());
        assert_eq!(coordinator.fetched_count(), 0);

        let retry = coordinator.begin_fetch(handle).unwrap();
        assert_eq!(retry.page(), 1);
    }

    #[test]
    fn test_exhausted_session_does_not_fetch() {
        let mut coordinator = PaginationCoordinator::new();
        let handle = coordinator.start_new_search("cat");
        let pending = coordinator.begin_fetch(handle).unwrap();
        coordinator.complete_fetch(pending, Ok(page(10, 10)));
        assert!(!coordinator.has_more());
        assert!(coordinator.begin_fetch(handle).is_none());
        assert!(!coordinator.is_fetch_in_progress());
    }

    #[test]
    fn test_dropped_pending_releases_gate() {
        let mut coordinator = PaginationCoordinator::new();
        let handle = coordinator.start_new_search("cat");
        drop(coordinator.begin_fetch(handle));
        assert!(!coordinator.is_fetch_in_progress());
    }

    #[test]
    fn test_photo_accessors() {
        let mut coordinator = PaginationCoordinator::new();
        let handle = coordinator.start_new_search("cat");
        let pending = coordinator.begin_fetch(handle).unwrap();
        coordinator.complete_fetch(pending, Ok(page(2, 4)));
        assert_eq!(coordinator.photo_at(1).title(), "photo 1");
        assert!(coordinator.get(2).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_photo_at_past_fetched_panics() {
        let coordinator = PaginationCoordinator::new();
        let _ = coordinator.photo_at(0);
    }
}
