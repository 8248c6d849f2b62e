use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::app::{App, Effect, Message, Model, ToastLevel};
use crate::history::save_history;
use crate::image::{ImageFetcher, ThumbnailLoader, describe};
use crate::search::{PendingFetch, PhotoSource};

impl<S, F> App<S, F>
where
    S: PhotoSource + 'static,
    F: ImageFetcher + Clone + 'static,
{
    /// Run the effects queued by the last update.
    ///
    /// Fetches and image loads are spawned on the runtime and report back
    /// through `tx`; history is written in place.
    pub(super) fn run_effects(&self, model: &mut Model, tx: &UnboundedSender<Message>) {
        for effect in model.take_effects() {
            match effect {
                Effect::Fetch(pending) => self.spawn_fetch(pending, tx.clone()),
                Effect::LoadThumbnail { index, url } => {
                    spawn_image_load(self.thumbnails.clone(), index, url, tx.clone(), |index, url, result| {
                        Message::ThumbnailLoaded { index, url, result }
                    });
                }
                Effect::LoadPreview { index, url } => {
                    spawn_image_load(self.previews.clone(), index, url, tx.clone(), |index, url, result| {
                        Message::PreviewLoaded { index, url, result }
                    });
                }
                Effect::SaveHistory => self.persist_history(model),
            }
        }
    }

    fn spawn_fetch(&self, pending: PendingFetch, tx: UnboundedSender<Message>) {
        let source = Arc::clone(&self.source);
        let term = pending.term().to_string();
        let page = pending.page();
        tokio::spawn(async move {
            let result = {
                let _fetch = crate::perf::scope("search.fetch");
                source.fetch(&term, page).await
            };
            let _ = tx.send(Message::FetchCompleted(pending, result));
        });
    }

    fn persist_history(&self, model: &mut Model) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Err(err) = save_history(path, &model.history) {
            tracing::warn!(path = %path.display(), "history not saved: {err:#}");
            model.show_toast(ToastLevel::Warning, format!("History not saved: {err}"));
        }
    }
}

fn spawn_image_load<F>(
    loader: ThumbnailLoader<F>,
    index: usize,
    url: String,
    tx: UnboundedSender<Message>,
    wrap: fn(usize, String, Result<String, String>) -> Message,
) where
    F: ImageFetcher + 'static,
{
    tokio::spawn(async move {
        let result = loader
            .load(&url)
            .await
            .map(|image| describe(&image))
            .map_err(|err| format!("{err:#}"));
        let _ = tx.send(wrap(index, url, result));
    });
}
