//! Presentation-side components of the result grid.
//!
//! - [`viewport`]: Scroll position, visible cells and motion state
//! - [`reconciler`]: Turns fetched-count changes into minimal redraws
//! - [`surface`]: The callbacks the core drives on the presentation layer
//! - [`text`]: A line-oriented surface for the terminal front end

pub mod reconciler;
pub mod surface;
pub mod text;
pub mod viewport;

pub use reconciler::{ReconcileState, ViewportReconciler};
pub use surface::{RenderSurface, SurfaceEvent};
pub use text::TextSurface;
pub use viewport::{Motion, Viewport, ViewportSnapshot};
