//! Outputs toward the presentation layer.

/// Callbacks the core drives on whatever draws the grid.
pub trait RenderSurface {
    /// Fetched count went from `old` to `new`; `refreshed` lists the
    /// visible cells in `[old, new)` that must be redrawn.
    fn counts_changed(&mut self, old: usize, new: usize, refreshed: &[usize]);
    /// Redraw the whole grid.
    fn full_reload(&mut self);
    /// Show or hide the loading indicator.
    fn fetch_state_changed(&mut self, in_progress: bool);
    /// A fetched cell was selected.
    fn selection(&mut self, index: usize);
}

/// A recorded [`RenderSurface`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    CountsChanged {
        old: usize,
        new: usize,
        refreshed: Vec<usize>,
    },
    FullReload,
    FetchStateChanged(bool),
    Selection(usize),
}

impl SurfaceEvent {
    /// Replay this event onto `surface`.
    pub fn dispatch(&self, surface: &mut impl RenderSurface) {
        match self {
            Self::CountsChanged {
                old,
                new,
                refreshed,
            } => surface.counts_changed(*old, *new, refreshed),
            Self::FullReload => surface.full_reload(),
            Self::FetchStateChanged(in_progress) => surface.fetch_state_changed(*in_progress),
            Self::Selection(index) => surface.selection(*index),
        }
    }
}

/// Recording surface: collects calls for later dispatch.
impl RenderSurface for Vec<SurfaceEvent> {
    fn counts_changed(&mut self, old: usize, new: usize, refreshed: &[usize]) {
        self.push(SurfaceEvent::CountsChanged {
            old,
            new,
            refreshed: refreshed.to_vec(),
        });
    }

    fn full_reload(&mut self) {
        self.push(SurfaceEvent::FullReload);
    }

    fn fetch_state_changed(&mut self, in_progress: bool) {
        self.push(SurfaceEvent::FetchStateChanged(in_progress));
    }

    fn selection(&mut self, index: usize) {
        self.push(SurfaceEvent::Selection(index));
    }
}
