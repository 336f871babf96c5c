//! Terminal rendering for the chat widget.

use crossterm::cursor::MoveToPreviousLine;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use deskchat_engine::{MessageHandle, MessageSink, Origin, ShowOptions};
use std::io::{IsTerminal, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

const PREFIX_WIDTH: usize = 5;
const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Default)]
struct Cursor {
    next_id: u64,
    /// Id of the placeholder on the last printed line, if any.
    trailing_placeholder: Option<u64>,
}

/// [`MessageSink`] that prints to stdout.
///
/// A loading placeholder can only be erased while it is still the last
/// printed line; once anything follows it, `remove` leaves it in place.
#[derive(Debug)]
pub struct TerminalSink {
    cursor: Mutex<Cursor>,
    interactive: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            cursor: Mutex::new(Cursor::default()),
            interactive: std::io::stdin().is_terminal() && std::io::stdout().is_terminal(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Print the widget header and the input hint.
    pub fn header(&self, title: &str, hint: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", title.bold());
        let _ = writeln!(out, "{}", format!("{hint} (/quit to exit)").dim());
        let _ = writeln!(out);
        let _ = out.flush();
        self.lock().trailing_placeholder = None;
    }

    /// Print the input hint after a state change.
    pub fn hint(&self, hint: &str) {
        let mut cursor = self.lock();
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", format!("{:<PREFIX_WIDTH$}{hint}", "").dim());
        let _ = out.flush();
        cursor.trailing_placeholder = None;
    }

    fn width() -> usize {
        crossterm::terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .unwrap_or(FALLBACK_WIDTH)
            .max(PREFIX_WIDTH + 20)
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSink for TerminalSink {
    fn show(&self, text: &str, origin: Origin, opts: ShowOptions) -> MessageHandle {
        let mut cursor = self.lock();
        cursor.next_id += 1;
        let id = cursor.next_id;

        let mut out = std::io::stdout().lock();

        // The typed line is already on screen; replace it with the styled echo.
        if origin == Origin::User && self.interactive {
            let _ = out.queue(MoveToPreviousLine(1));
            let _ = out.queue(Clear(ClearType::CurrentLine));
        }

        let prefix = match origin {
            Origin::User => format!("{:<PREFIX_WIDTH$}", "you").green().bold(),
            Origin::Bot => format!("{:<PREFIX_WIDTH$}", "bot").cyan().bold(),
        };

        if opts.loading {
            let _ = out.queue(Print(prefix));
            let _ = out.queue(Print("...".dim()));
            let _ = out.queue(Print("\n"));
            cursor.trailing_placeholder = Some(id);
        } else {
            let indent = " ".repeat(PREFIX_WIDTH);
            let lines = textwrap::wrap(text, Self::width() - PREFIX_WIDTH);
            for (i, line) in lines.iter().enumerate() {
                if i == 0 {
                    let _ = out.queue(Print(prefix.clone()));
                } else {
                    let _ = out.queue(Print(&indent));
                }
                let _ = out.queue(Print(line));
                let _ = out.queue(Print("\n"));
            }
            cursor.trailing_placeholder = None;
        }

        let _ = out.flush();
        MessageHandle::new(id)
    }

    fn remove(&self, handle: MessageHandle) {
        let mut cursor = self.lock();
        if cursor.trailing_placeholder != Some(handle.id()) {
            return;
        }

        let mut out = std::io::stdout().lock();
        let _ = out.queue(MoveToPreviousLine(1));
        let _ = out.queue(Clear(ClearType::CurrentLine));
        let _ = out.flush();
        cursor.trailing_placeholder = None;
    }
}
