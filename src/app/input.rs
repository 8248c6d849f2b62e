use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc::UnboundedSender;

use crate::app::Message;

/// Translate one input line into a message.
///
/// Blank lines yield `None`; anything unrecognised becomes
/// [`Message::Unknown`].
pub(super) fn parse_command(line: &str) -> Option<Message> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(term) = line.strip_prefix('/') {
        return Some(Message::Search(term.trim().to_string()));
    }
    if let Some(position) = line.strip_prefix('!') {
        return Some(match position.trim().parse() {
            Ok(position) => Message::RerunHistory(position),
            Err(_) => Message::Unknown(line.to_string()),
        });
    }

    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(command, rest)| (command, rest.trim()));
    let count = || rest.parse::<usize>().unwrap_or(1).max(1);

    let msg = match command.to_lowercase().as_str() {
        "search" | "s" if !rest.is_empty() => Message::Search(rest.to_string()),
        "down" | "j" => Message::ScrollDown(count()),
        "up" | "k" => Message::ScrollUp(count()),
        "pgdn" | "pagedown" => Message::PageDown,
        "pgup" | "pageup" => Message::PageUp,
        "top" | "g" => Message::GoToTop,
        "resize" => match parse_pair(rest) {
            Some((columns, rows)) => Message::Resize(columns, rows),
            None => Message::Unknown(line.to_string()),
        },
        "drag" => Message::BeginDrag,
        "release" => Message::EndDrag { decelerate: false },
        "fling" => Message::EndDrag { decelerate: true },
        "settle" => Message::EndDecelerating,
        "open" | "o" => match rest.parse() {
            Ok(index) => Message::Select(index),
            Err(_) => Message::Unknown(line.to_string()),
        },
        "retry" | "more" => Message::Retry,
        "history" | "h" if rest.is_empty() => Message::ShowHistory,
        "history" | "h" => match rest.parse() {
            Ok(position) => Message::RerunHistory(position),
            Err(_) => Message::Unknown(line.to_string()),
        },
        "close" | "c" => Message::ClosePreview,
        "help" | "?" => Message::ShowHelp,
        "quit" | "q" | "exit" => Message::Quit,
        _ => Message::Unknown(line.to_string()),
    };
    Some(msg)
}

fn parse_pair(rest: &str) -> Option<(usize, usize)> {
    let mut parts = rest.split_whitespace().map(str::parse::<usize>);
    let columns = parts.next()?.ok()?;
    let rows = parts.next()?.ok()?;
    parts.next().is_none().then_some((columns, rows))
}

/// Read stdin on a dedicated thread, forwarding parsed commands.
///
/// End of input is reported as [`Message::Quit`].
pub(super) fn spawn_input_reader(tx: UnboundedSender<Message>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if let Some(msg) = parse_command(&line) {
                if tx.send(msg).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(Message::Quit);
    });
}
