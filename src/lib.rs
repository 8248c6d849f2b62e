// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. search::SearchSession)
    clippy::module_name_repetitions
)]

//! # Photogrid
//!
//! Keyword photo search with incremental, viewport-driven page fetching.
//!
//! Photogrid keeps a grid of search results in step with a paged photo
//! source:
//! - Exactly one fetch in flight per search
//! - Results of a replaced search are discarded when they arrive
//! - Redraws are limited to visible cells and held back while scrolling
//! - Recent searches are remembered across runs
//!
//! ## Architecture
//!
//! Photogrid uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Commands and fetch completions
//! - **Update**: Pure state transitions
//! - **View**: Surface events printed to the terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`search`]: Sessions, the fetch gate and the pagination coordinator
//! - [`ui`]: Viewport, reconciler and render surfaces
//! - [`image`]: Thumbnail loading and caching
//! - [`history`]: Recent search terms
//! - [`config`]: Flag files and defaults

pub mod app;
pub mod config;
pub mod history;
pub mod image;
pub mod perf;
pub mod search;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::search::{PaginationCoordinator, PhotoSource, SearchSession};
    pub use crate::ui::{Viewport, ViewportReconciler};
}
