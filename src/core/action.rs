//! # Actions
//!
//! Everything that can happen in the chat becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The tailer delivers new log lines? That's `Action::LinesArrived(lines)`.
//!
//! The `update()` function applies an action to the state and returns the
//! `Effect` the adapter must carry out. No side effects here: writing to the
//! log, drawing and killing the session happen elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::debug;

use crate::core::message::LogEntry;
use crate::core::state::App;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    InsertChar(char),
    Paste(String),
    Backspace,
    DeleteForward,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    ClearBuffer,
    Submit,
    ClearScreen,
    Resize,
    /// Ctrl-D: leave and tear down the agent session (if enabled).
    Exit,
    /// Ctrl-C: leave, agents keep running.
    ForceExit,
    /// New complete lines from the log tailer.
    LinesArrived(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Repaint what changed.
    Redraw,
    /// Clear the terminal and repaint everything.
    FullRedraw,
    /// Append this text to the log under the operator identity.
    Commit(String),
    Quit { teardown: bool },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    let edited = |changed: bool| if changed { Effect::Redraw } else { Effect::None };

    match action {
        Action::InsertChar(c) => edited(app.input.insert(c)),
        Action::Paste(text) => edited(app.input.insert_str(&text)),
        Action::Backspace => edited(app.input.backspace()),
        Action::DeleteForward => edited(app.input.delete_forward()),
        Action::CursorLeft => edited(app.input.move_left()),
        Action::CursorRight => edited(app.input.move_right()),
        Action::CursorHome => edited(app.input.home()),
        Action::CursorEnd => edited(app.input.end()),
        Action::ClearBuffer => {
            app.input.clear();
            Effect::Redraw
        }
        Action::Submit => match app.input.take_submission() {
            Some(text) => Effect::Commit(text),
            None => {
                debug!("Ignoring blank submission");
                Effect::Redraw
            }
        },
        Action::ClearScreen | Action::Resize => Effect::FullRedraw,
        Action::Exit => Effect::Quit {
            teardown: app.teardown_on_exit,
        },
        Action::ForceExit => Effect::Quit { teardown: false },
        Action::LinesArrived(lines) => {
            if lines.is_empty() {
                return Effect::None;
            }
            debug!("Received {} new log lines", lines.len());
            for line in &lines {
                app.push_entry(LogEntry::parse(line));
            }
            Effect::Redraw
        }
    }
}
