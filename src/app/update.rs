use crate::app::Model;
use crate::app::model::ToastLevel;
use crate::search::{PendingFetch, PhotoPage};

/// All possible events and actions in the application.
///
/// User commands arrive from the input reader; completions arrive from
/// spawned effect tasks.
#[derive(Debug)]
pub enum Message {
    // Search
    /// Start a new search for the term
    Search(String),
    /// Ask for the next page regardless of the viewport
    Retry,

    // Navigation
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Go to the first row
    GoToTop,
    /// Change the grid to columns x rows
    Resize(usize, usize),

    // Motion
    /// User started dragging the grid
    BeginDrag,
    /// User lifted their finger; `decelerate` if the grid keeps coasting
    EndDrag { decelerate: bool },
    /// Coasting stopped
    EndDecelerating,

    // Selection
    /// Open the photo at index
    Select(usize),
    /// Dismiss the open photo
    ClosePreview,

    // Completions
    /// A page fetch resolved
    FetchCompleted(PendingFetch, anyhow::Result<PhotoPage>),
    /// A thumbnail load resolved with a summary or an error message
    ThumbnailLoaded {
        index: usize,
        url: String,
        result: Result<String, String>,
    },
    /// A preview load resolved
    PreviewLoaded {
        index: usize,
        url: String,
        result: Result<String, String>,
    },

    // Application
    ShowHistory,
    /// Run the nth recent search again (1-based, as listed)
    RerunHistory(usize),
    ShowHelp,
    /// Input line that did not parse
    Unknown(String),
    Quit,
}

pub const HELP_TEXT: &str = "\
commands:
  search <term> | /<term>   start a new search
  down [n] | j              scroll down n rows
  up [n] | k                scroll up n rows
  pgdn | pgup | top         page navigation
  resize <cols> <rows>      change the grid size
  drag | release | fling    begin or end a drag
  settle                    end deceleration
  open <index>              open a photo
  close                     dismiss the open photo
  retry                     request the next page
  history [n]               show recent searches, or rerun the nth
  help | ?                  show this help
  quit | q                  exit";

/// Pure state transition.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::Search(term) => model.start_search(&term),
        Message::Retry => model.retry(),

        Message::ScrollUp(n) => {
            model.viewport.scroll_up(n);
            model.after_scroll();
        }
        Message::ScrollDown(n) => {
            model.viewport.scroll_down(n);
            model.after_scroll();
        }
        Message::PageUp => {
            model.viewport.page_up();
            model.after_scroll();
        }
        Message::PageDown => {
            model.viewport.page_down();
            model.after_scroll();
        }
        Message::GoToTop => {
            model.viewport.go_to_top();
            model.after_scroll();
        }
        Message::Resize(columns, rows) => {
            model.viewport.resize(columns, rows);
            model.after_scroll();
        }

        Message::BeginDrag => model.viewport.begin_drag(),
        Message::EndDrag { decelerate } => {
            if model.viewport.end_drag(decelerate) {
                model.motion_ended();
            }
        }
        Message::EndDecelerating => {
            if model.viewport.end_decelerating() {
                model.motion_ended();
            }
        }

        Message::Select(index) => model.select(index),
        Message::ClosePreview => model.close_preview(),

        Message::FetchCompleted(pending, result) => model.fetch_completed(pending, result),
        Message::ThumbnailLoaded { index, url, result } => {
            model.thumbnail_loaded(index, &url, result);
        }
        Message::PreviewLoaded { index, url, result } => {
            model.preview_loaded(index, &url, result);
        }

        Message::ShowHistory => model.show_history(),
        Message::RerunHistory(position) => model.rerun_history(position),
        Message::ShowHelp => model.show_toast(ToastLevel::Info, HELP_TEXT),
        Message::Unknown(line) => {
            model.show_toast(ToastLevel::Warning, format!("Unknown command: {line} (try help)"));
        }
        Message::Quit => model.should_quit = true,
    }
    model
}
