use std::io::{Write, stdout};

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::app::input::spawn_input_reader;
use crate::app::{App, HELP_TEXT, Message, Model, ToastLevel, update};
use crate::image::ImageFetcher;
use crate::search::PhotoSource;
use crate::ui::TextSurface;

impl<S, F> App<S, F>
where
    S: PhotoSource + 'static,
    F: ImageFetcher + Clone + 'static,
{
    /// Run the main event loop until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot start or stdout cannot be
    /// written.
    pub fn run(&self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("Failed to start async runtime")?;
        runtime.block_on(self.event_loop())
    }

    async fn event_loop(&self) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut model = self.initial_model();

        {
            let mut out = stdout().lock();
            writeln!(out, "{HELP_TEXT}")?;
            out.flush()?;
        }

        if let Some(term) = &self.initial_search {
            tx.send(Message::Search(term.clone()))
                .context("Event channel closed")?;
        }
        spawn_input_reader(tx.clone());

        while let Some(msg) = rx.recv().await {
            model = update(model, msg);
            self.run_effects(&mut model, &tx);
            present(&mut model, &mut stdout().lock()).context("Failed to write output")?;
            if model.should_quit {
                break;
            }
        }
        tracing::debug!(fetched = model.coordinator.fetched_count(), "event loop finished");
        Ok(())
    }
}

/// Write out everything the last update produced: surface events, a redraw
/// of the visible cells after scrolling, and toasts.
pub(super) fn present(model: &mut Model, out: &mut impl Write) -> std::io::Result<()> {
    let events = model.take_events();
    let redraw = model.take_redraw();
    let toasts = model.take_toasts();

    let mut surface = TextSurface::new(&mut *out, &model.coordinator, model.viewport.visible_range());
    for event in &events {
        event.dispatch(&mut surface);
    }
    if redraw {
        surface.draw_visible();
    }
    surface.finish()?;

    for (level, message) in toasts {
        let tag = match level {
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warn",
            ToastLevel::Error => "error",
        };
        writeln!(out, "[{tag}] {message}")?;
    }
    out.flush()
}
