//! Keyword search sessions and incremental page fetching.
//!
//! - [`SearchSession`]: accumulated results of one search
//! - [`FetchGate`]: at most one fetch in flight per session
//! - [`PaginationCoordinator`]: owns the current session and applies
//!   completed fetches only while they still belong to it
//! - [`PhotoSource`]: the injected fetch function

mod coordinator;
mod gate;
mod session;
mod source;

pub use coordinator::{FetchOutcome, PaginationCoordinator, PendingFetch, request_more};
pub use gate::{FetchGate, FetchPermit, FetchState};
pub use session::{Photo, PhotoPage, RawPhoto, SearchSession, SessionHandle};
pub use source::{CatalogEntry, CatalogSource, PhotoSource};

use thiserror::Error;

/// Conditions raised while fetching and applying search results.
///
/// Only [`SearchError::FetchFailed`] is meant to reach the user; the other
/// variants are absorbed by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A completion or selection referenced a superseded session.
    #[error("result belongs to a superseded search")]
    StaleResult,
    /// A result item had no usable image URL.
    #[error("photo has no usable source url")]
    NoUrl,
    /// The source failed to produce a page.
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}
