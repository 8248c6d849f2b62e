//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop, running effects and printing the grid

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Effect, Model, Preview, ToastLevel};
pub use update::{HELP_TEXT, Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::history::SearchHistory;
use crate::image::{DEFAULT_CACHE_SIZE, ImageCache, ImageFetcher, THUMBNAIL_EDGE, ThumbnailLoader};
use crate::search::PhotoSource;
use crate::ui::reconciler::DEFAULT_PREFETCH_DISTANCE;

/// Longest edge of a decoded preview, in pixels.
const PREVIEW_EDGE: u32 = 2048;

/// Main application struct that owns the photo source and image loaders.
pub struct App<S, F> {
    source: Arc<S>,
    thumbnails: ThumbnailLoader<F>,
    previews: ThumbnailLoader<F>,
    columns: usize,
    rows: usize,
    prefetch_distance: usize,
    thumbnails_enabled: bool,
    history: SearchHistory,
    history_path: Option<PathBuf>,
    initial_search: Option<String>,
}

impl<S, F> App<S, F>
where
    S: PhotoSource + 'static,
    F: ImageFetcher + Clone + 'static,
{
    /// Create a new application searching `source`.
    pub fn new(source: S, fetcher: F) -> Self {
        Self {
            source: Arc::new(source),
            thumbnails: ThumbnailLoader::new(
                fetcher.clone(),
                ImageCache::new(DEFAULT_CACHE_SIZE),
                THUMBNAIL_EDGE,
            ),
            previews: ThumbnailLoader::new(fetcher, ImageCache::new(8), PREVIEW_EDGE),
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
            thumbnails_enabled: true,
            history: SearchHistory::default(),
            history_path: None,
            initial_search: None,
        }
    }

    /// Set the visible grid size.
    #[must_use]
    pub const fn with_grid(mut self, columns: usize, rows: usize) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    /// Set how close to the end of the fetched items a prefetch starts.
    #[must_use]
    pub const fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    /// Enable or disable thumbnail and preview loading.
    #[must_use]
    pub const fn with_thumbnails_enabled(mut self, enabled: bool) -> Self {
        self.thumbnails_enabled = enabled;
        self
    }

    /// Start with `history`, saving it back to `path` after each search.
    #[must_use]
    pub fn with_history(mut self, history: SearchHistory, path: Option<PathBuf>) -> Self {
        self.history = history;
        self.history_path = path;
        self
    }

    /// Run this search as soon as the loop starts.
    #[must_use]
    pub fn with_initial_search(mut self, term: Option<String>) -> Self {
        self.initial_search = term;
        self
    }

    fn initial_model(&self) -> Model {
        Model::new(self.columns, self.rows, self.prefetch_distance)
            .with_history(self.history.clone())
            .with_thumbnails_enabled(self.thumbnails_enabled)
    }
}
