//! Line-oriented rendering of surface events.

use std::fmt;
use std::io::{self, Write};
use std::ops::Range;

use crate::search::PaginationCoordinator;

use super::surface::RenderSurface;

/// Writes grid updates as plain text lines.
///
/// Surface callbacks cannot fail, so the first write error is kept and
/// reported by [`finish`](Self::finish). Nothing more is written after it.
pub struct TextSurface<'a, W: Write> {
    out: W,
    coordinator: &'a PaginationCoordinator,
    visible: Range<usize>,
    error: Option<io::Error>,
}

impl<'a, W: Write> TextSurface<'a, W> {
    pub const fn new(out: W, coordinator: &'a PaginationCoordinator, visible: Range<usize>) -> Self {
        Self {
            out,
            coordinator,
            visible,
            error: None,
        }
    }

    /// Hand back the writer, or the first error hit while writing.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error any callback ran into.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_fmt(args).and_then(|()| self.out.write_all(b"\n")) {
            self.error = Some(err);
        }
    }

    /// Print the visible cells, e.g. after scrolling.
    pub fn draw_visible(&mut self) {
        let (start, end) = (self.visible.start, self.visible.end);
        let total = self.coordinator.total_count();
        self.line(format_args!("-- {start}..{end} of {total} --"));
        for index in self.visible.clone() {
            self.cell(index);
        }
    }

    fn cell(&mut self, index: usize) {
        let line = self.coordinator.get(index).map_or_else(
            || format!("  [{index:>4}] ..."),
            |photo| format!("  [{index:>4}] {}", photo.title()),
        );
        self.line(format_args!("{line}"));
    }
}

impl<W: Write> RenderSurface for TextSurface<'_, W> {
    fn counts_changed(&mut self, old: usize, new: usize, refreshed: &[usize]) {
        let total = self.coordinator.total_count();
        self.line(format_args!("+ results {old}..{new} of {total}"));
        for &index in refreshed {
            self.cell(index);
        }
    }

    fn full_reload(&mut self) {
        let coordinator = self.coordinator;
        let term = coordinator.current_search_term();
        let (fetched, total) = (coordinator.fetched_count(), coordinator.total_count());
        self.line(format_args!("== \"{term}\": {fetched} of {total} results =="));
        for index in self.visible.clone() {
            self.cell(index);
        }
    }

    fn fetch_state_changed(&mut self, in_progress: bool) {
        if in_progress {
            self.line(format_args!("  loading..."));
        }
    }

    fn selection(&mut self, index: usize) {
        let line = self.coordinator.get(index).map_or_else(
            || format!("> [{index}]"),
            |photo| format!("> [{index}] {} <{}>", photo.title(), photo.source_url()),
        );
        self.line(format_args!("{line}"));
    }
}
