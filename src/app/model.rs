use std::collections::HashMap;

use anyhow::Result;

use crate::history::SearchHistory;
use crate::image::{DEFAULT_SCREEN_SCALE, SlotBindings};
use crate::search::{FetchOutcome, PaginationCoordinator, PendingFetch, PhotoPage};
use crate::ui::{RenderSurface, SurfaceEvent, Viewport, ViewportReconciler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

/// Side effects requested by [`update`](super::update), run by the App.
#[derive(Debug)]
pub enum Effect {
    /// Run a page fetch and report back with `FetchCompleted`.
    Fetch(PendingFetch),
    LoadThumbnail {
        index: usize,
        url: String,
    },
    LoadPreview {
        index: usize,
        url: String,
    },
    SaveHistory,
}

/// State of the photo opened with `open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub index: usize,
    pub url: String,
    /// Decoded summary once loaded.
    pub summary: Option<String>,
}

/// Complete application state.
#[derive(Debug)]
pub struct Model {
    pub coordinator: PaginationCoordinator,
    pub reconciler: ViewportReconciler,
    pub viewport: Viewport,
    pub history: SearchHistory,
    pub thumbnails_enabled: bool,
    pub screen_scale: f32,
    /// Summaries of thumbnails that finished loading, by cell index.
    pub thumbnails: HashMap<usize, String>,
    pub preview: Option<Preview>,
    pub should_quit: bool,
    pub(super) slots: SlotBindings,
    events: Vec<SurfaceEvent>,
    effects: Vec<Effect>,
    toasts: Vec<(ToastLevel, String)>,
    needs_redraw: bool,
}

impl Model {
    pub fn new(columns: usize, rows: usize, prefetch_distance: usize) -> Self {
        Self {
            coordinator: PaginationCoordinator::new(),
            reconciler: ViewportReconciler::new(prefetch_distance),
            viewport: Viewport::new(columns, rows, 0),
            history: SearchHistory::default(),
            thumbnails_enabled: true,
            screen_scale: DEFAULT_SCREEN_SCALE,
            thumbnails: HashMap::new(),
            preview: None,
            should_quit: false,
            slots: SlotBindings::new(),
            events: Vec::new(),
            effects: Vec::new(),
            toasts: Vec::new(),
            needs_redraw: false,
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: SearchHistory) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub const fn with_thumbnails_enabled(mut self, enabled: bool) -> Self {
        self.thumbnails_enabled = enabled;
        self
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toasts.push((level, message.into()));
    }

    pub fn take_toasts(&mut self) -> Vec<(ToastLevel, String)> {
        std::mem::take(&mut self.toasts)
    }

    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Whether the visible cells should be drawn again after scrolling.
    pub const fn take_redraw(&mut self) -> bool {
        let redraw = self.needs_redraw;
        self.needs_redraw = false;
        redraw
    }

    pub(super) fn start_search(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.show_toast(ToastLevel::Warning, "Enter a search term");
            return;
        }
        self.history.add(term);
        self.effects.push(Effect::SaveHistory);

        let handle = self.coordinator.start_new_search(term);
        self.slots.clear();
        self.thumbnails.clear();
        self.preview = None;
        self.viewport.go_to_top();
        self.viewport.set_total_items(0);
        let snapshot = self.viewport.snapshot();
        self.reconciler.session_replaced(&snapshot, &mut self.events);

        if let Some(pending) = self.coordinator.begin_fetch(handle) {
            self.issue(pending);
        }
    }

    /// Explicit request for the next page, bypassing the viewport check.
    pub(super) fn retry(&mut self) {
        if self.coordinator.current_search_term().is_empty() {
            self.show_toast(ToastLevel::Info, "Nothing to retry");
            return;
        }
        match self.coordinator.begin_fetch(self.coordinator.current_handle()) {
            Some(pending) => self.issue(pending),
            None if self.coordinator.is_fetch_in_progress() => {
                self.show_toast(ToastLevel::Info, "Already loading");
            }
            None => self.show_toast(ToastLevel::Info, "No more results"),
        }
    }

    pub(super) fn fetch_completed(&mut self, pending: PendingFetch, result: Result<PhotoPage>) {
        let outcome = self.coordinator.complete_fetch(pending, result);
        if !self.coordinator.is_fetch_in_progress() {
            self.events.fetch_state_changed(false);
        }
        match outcome {
            FetchOutcome::Applied { old, new } => {
                self.viewport.set_total_items(self.coordinator.total_count());
                let snapshot = self.viewport.snapshot();
                self.reconciler
                    .counts_changed(old, new, &snapshot, &mut self.events);
                if !snapshot.is_moving {
                    self.queue_visible_thumbnails();
                }
                self.check_prefetch();
            }
            FetchOutcome::Failed(message) => {
                self.show_toast(ToastLevel::Error, format!("Search failed: {message}"));
            }
            FetchOutcome::Discarded | FetchOutcome::NotStarted => {}
        }
    }

    pub(super) fn after_scroll(&mut self) {
        self.needs_redraw = true;
        self.queue_visible_thumbnails();
        self.check_prefetch();
    }

    pub(super) fn motion_ended(&mut self) {
        let snapshot = self.viewport.snapshot();
        if !self.reconciler.motion_ended(&snapshot, &mut self.events) {
            self.needs_redraw = true;
        }
        self.queue_visible_thumbnails();
        self.check_prefetch();
    }

    pub(super) fn select(&mut self, index: usize) {
        let Some(photo) = self.coordinator.get(index) else {
            self.show_toast(ToastLevel::Warning, format!("No photo at {index}"));
            return;
        };
        let url = photo.source_url().to_string();
        self.events.selection(index);
        if self.thumbnails_enabled {
            self.preview = Some(Preview {
                index,
                url: url.clone(),
                summary: None,
            });
            self.effects.push(Effect::LoadPreview { index, url });
        }
    }

    pub(super) fn close_preview(&mut self) {
        if self.preview.take().is_none() {
            self.show_toast(ToastLevel::Info, "No photo open");
        }
    }

    pub(super) fn thumbnail_loaded(&mut self, index: usize, url: &str, result: Result<String, String>) {
        if !self.slots.accepts(index, url) {
            tracing::debug!(index, url, "dropping thumbnail for rebound slot");
            return;
        }
        match result {
            Ok(summary) => {
                self.thumbnails.insert(index, summary);
            }
            Err(err) => {
                tracing::warn!(index, url, "thumbnail failed: {err}");
                self.slots.unbind(index);
            }
        }
    }

    pub(super) fn preview_loaded(&mut self, index: usize, url: &str, result: Result<String, String>) {
        let Some(preview) = self
            .preview
            .as_mut()
            .filter(|preview| preview.index == index && preview.url == url)
        else {
            tracing::debug!(index, url, "dropping preview for closed selection");
            return;
        };
        match result {
            Ok(summary) => {
                preview.summary = Some(summary.clone());
                self.show_toast(ToastLevel::Info, format!("Preview [{index}]: {summary}"));
            }
            Err(err) => {
                self.preview = None;
                self.show_toast(ToastLevel::Warning, format!("Preview unavailable: {err}"));
            }
        }
    }

    pub(super) fn show_history(&mut self) {
        if self.history.is_empty() {
            self.show_toast(ToastLevel::Info, "No recent searches");
            return;
        }
        let listing = self
            .history
            .all()
            .iter()
            .enumerate()
            .map(|(i, term)| format!("{}. {term}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        self.show_toast(ToastLevel::Info, format!("Recent searches:\n{listing}"));
    }

    /// Search again for the entry listed at `position` by `history`.
    pub(super) fn rerun_history(&mut self, position: usize) {
        let Some(term) = position
            .checked_sub(1)
            .and_then(|i| self.history.all().get(i))
            .cloned()
        else {
            self.show_toast(
                ToastLevel::Warning,
                format!("No recent search #{position} (have {})", self.history.len()),
            );
            return;
        };
        self.start_search(&term);
    }

    fn check_prefetch(&mut self) {
        let pending = self.reconciler.prefetch(
            self.viewport.prefetch_max_index(),
            &self.coordinator,
            self.coordinator.current_handle(),
        );
        if let Some(pending) = pending {
            self.issue(pending);
        }
    }

    fn issue(&mut self, pending: PendingFetch) {
        self.events.fetch_state_changed(true);
        self.effects.push(Effect::Fetch(pending));
    }

    fn queue_visible_thumbnails(&mut self) {
        if !self.thumbnails_enabled {
            return;
        }
        let fetched = self.coordinator.fetched_count();
        let range = self.viewport.visible_range();
        for index in range.start..range.end.min(fetched) {
            let url = self.coordinator.photo_at(index).thumbnail_url(self.screen_scale);
            if self.slots.bind(index, &url) {
                self.thumbnails.remove(&index);
                self.effects.push(Effect::LoadThumbnail { index, url });
            }
        }
    }
}
