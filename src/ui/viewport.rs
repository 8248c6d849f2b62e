//! Viewport management for the result grid.
//!
//! The [`Viewport`] tracks which cells of the grid are on screen and
//! whether the user is currently moving it.

use std::ops::Range;

/// How the viewport is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Still,
    Dragging,
    Decelerating,
}

/// What is on screen right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportSnapshot {
    /// Indices of the cells currently displayed.
    pub visible: Range<usize>,
    /// True while dragging or decelerating.
    pub is_moving: bool,
}

impl ViewportSnapshot {
    /// A snapshot of a viewport at rest.
    pub const fn still(visible: Range<usize>) -> Self {
        Self {
            visible,
            is_moving: false,
        }
    }

    /// A snapshot of a viewport in motion.
    pub const fn moving(visible: Range<usize>) -> Self {
        Self {
            visible,
            is_moving: true,
        }
    }

    /// Visible indices inside `[start, end)`.
    pub fn intersect(&self, start: usize, end: usize) -> Vec<usize> {
        (self.visible.start.max(start)..self.visible.end.min(end)).collect()
    }
}

/// A scrolling window of `columns × rows` cells over the result grid.
///
/// The grid holds `total_items` cells; cells past the fetched count are
/// placeholders until their page arrives.
///
/// # Example
///
/// ```
/// use photogrid::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(4, 5, 100);
/// assert_eq!(vp.visible_range(), 0..20);
///
/// vp.scroll_down(2);
/// assert_eq!(vp.visible_range(), 8..28);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    columns: usize,
    rows: usize,
    offset_row: usize,
    total_items: usize,
    motion: Motion,
}

impl Viewport {
    /// Create a new viewport.
    ///
    /// # Arguments
    ///
    /// * `columns` - Cells per grid row (at least 1)
    /// * `rows` - Grid rows on screen (at least 1)
    /// * `total_items` - Cells in the grid
    pub fn new(columns: usize, rows: usize, total_items: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
            offset_row: 0,
            total_items,
            motion: Motion::Still,
        }
    }

    /// First visible grid row.
    pub const fn offset_row(&self) -> usize {
        self.offset_row
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn total_items(&self) -> usize {
        self.total_items
    }

    pub const fn motion(&self) -> Motion {
        self.motion
    }

    pub const fn is_moving(&self) -> bool {
        !matches!(self.motion, Motion::Still)
    }

    /// Get the range of visible cell indices, clamped to the grid.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset_row.saturating_mul(self.columns).min(self.total_items);
        let end = self
            .offset_row
            .saturating_add(self.rows)
            .saturating_mul(self.columns)
            .min(self.total_items);
        start..end
    }

    /// Highest index the grid is about to need: the last visible cell plus
    /// one row of overscan.
    ///
    /// `None` for an empty grid.
    pub fn prefetch_max_index(&self) -> Option<usize> {
        let end = self
            .offset_row
            .saturating_add(self.rows)
            .saturating_add(1)
            .saturating_mul(self.columns)
            .min(self.total_items);
        end.checked_sub(1)
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            visible: self.visible_range(),
            is_moving: self.is_moving(),
        }
    }

    /// Check if we can scroll up.
    pub const fn can_scroll_up(&self) -> bool {
        self.offset_row > 0
    }

    /// Check if we can scroll down.
    pub fn can_scroll_down(&self) -> bool {
        self.offset_row < self.max_offset_row()
    }

    /// Scroll up by n rows.
    pub const fn scroll_up(&mut self, n: usize) {
        self.offset_row = self.offset_row.saturating_sub(n);
    }

    /// Scroll down by n rows.
    pub fn scroll_down(&mut self, n: usize) {
        self.offset_row = self.offset_row.saturating_add(n).min(self.max_offset_row());
    }

    /// Scroll down one screen.
    pub fn page_down(&mut self) {
        self.scroll_down(self.rows);
    }

    /// Scroll up one screen.
    pub const fn page_up(&mut self) {
        self.scroll_up(self.rows);
    }

    /// Go to the first row.
    pub const fn go_to_top(&mut self) {
        self.offset_row = 0;
    }

    /// The user put a finger down.
    pub const fn begin_drag(&mut self) {
        self.motion = Motion::Dragging;
    }

    /// The user lifted the finger. Returns true if motion stopped.
    pub const fn end_drag(&mut self, decelerate: bool) -> bool {
        if decelerate {
            self.motion = Motion::Decelerating;
            false
        } else {
            self.motion = Motion::Still;
            true
        }
    }

    /// Deceleration finished. Returns true if the viewport was decelerating.
    ///
    /// Ignored while dragging: only `end_drag` stops a drag.
    pub const fn end_decelerating(&mut self) -> bool {
        if matches!(self.motion, Motion::Decelerating) {
            self.motion = Motion::Still;
            true
        } else {
            false
        }
    }

    /// Update the grid size (e.g., a new total count arrived).
    pub fn set_total_items(&mut self, total: usize) {
        self.total_items = total;
        self.offset_row = self.offset_row.min(self.max_offset_row());
    }

    /// Resize the viewport.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        self.columns = columns.max(1);
        self.rows = rows.max(1);
        self.offset_row = self.offset_row.min(self.max_offset_row());
    }

    fn total_rows(&self) -> usize {
        self.total_items.div_ceil(self.columns)
    }

    fn max_offset_row(&self) -> usize {
        self.total_rows().saturating_sub(self.rows)
    }
}
