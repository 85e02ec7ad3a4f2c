//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, runs the event loop, draws
//! the screen and turns `Effect`s from `core::action::update` into I/O.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ redraw if flagged or the status interval elapsed (one draw)  │
//! │ poll keys for up to poll_interval, then drain pending keys   │
//! │ drain tailed lines from the channel → LinesArrived           │
//! │ update() each action, apply its Effect                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each `Terminal::draw` builds the full frame in a back buffer and flushes
//! the diff once, so a new message, a resize or a clock tick never tears.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::fmt;
use std::io::{self, IsTerminal, stdout};
use std::time::Instant;

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::log_store::{LogStore, Snapshot};
use crate::core::message::{LogEntry, Message, current_timestamp};
use crate::core::session::SessionController;
use crate::core::state::App;
use crate::core::tailer::{self, StopSignal, TailOptions};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};

#[derive(Debug)]
pub enum ChatError {
    /// The terminal can't host the UI (not a TTY, or raw mode failed).
    TerminalCapability(String),
    Io(io::Error),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::TerminalCapability(reason) => {
                write!(f, "cannot start chat UI: {reason}")
            }
            ChatError::Io(e) => write!(f, "chat log I/O error: {e}"),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::TerminalCapability(_) => None,
            ChatError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for ChatError {
    fn from(e: io::Error) -> Self {
        ChatError::Io(e)
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock  // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
        info!("Terminal modes restored");
    }
}

/// What the loop does after applying an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Idle,
    Redraw,
    FullRedraw,
    Quit,
}

/// Build the initial state: the startup snapshot plus a local notice with
/// the exit shortcuts.
fn startup_app(config: &ResolvedConfig, snapshot: &Snapshot, teardown_on_exit: bool) -> App {
    let mut app = App::from_config(config, teardown_on_exit);
    for line in &snapshot.lines {
        app.push_entry(LogEntry::parse(line));
    }
    let help = app.exit_help();
    app.push_local_notice(format!("Chat UI started. {help}"));
    app
}

/// Perform the I/O an effect asks for.
fn apply_effect(
    effect: Effect,
    app: &mut App,
    store: &LogStore,
    controller: &mut dyn SessionController,
    stop: &StopSignal,
) -> Flow {
    match effect {
        Effect::None => Flow::Idle,
        Effect::Redraw => Flow::Redraw,
        Effect::FullRedraw => Flow::FullRedraw,
        Effect::Commit(text) => {
            let message = Message::now(app.operator.as_str(), text);
            // The line shows up in history when the tailer reads it back.
            if let Err(e) = store.append(&message) {
                warn!("Failed to append to {}: {}", store.path().display(), e);
                app.push_local_notice(format!("Message not sent: {e}"));
            }
            Flow::Redraw
        }
        Effect::Quit { teardown } => {
            stop.stop();
            if teardown {
                info!("Exiting with session teardown");
                if let Err(e) = controller.kill() {
                    warn!("Failed to kill agent session: {}", e);
                }
            } else {
                info!("Exiting, agent session left running");
            }
            Flow::Quit
        }
    }
}

fn drain_lines(rx: &mut mpsc::Receiver<String>) -> Option<Action> {
    let lines: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    (!lines.is_empty()).then_some(Action::LinesArrived(lines))
}

/// Run the chat UI until the user exits.
///
/// `controller` is only used for teardown on Ctrl-D when
/// `teardown_on_exit` is set.
pub fn run(
    config: &ResolvedConfig,
    controller: &mut dyn SessionController,
    teardown_on_exit: bool,
) -> Result<(), ChatError> {
    if !stdout().is_terminal() || !io::stdin().is_terminal() {
        return Err(ChatError::TerminalCapability(
            "stdin and stdout must be an interactive terminal".to_string(),
        ));
    }

    let store = LogStore::new(&config.log_path);
    store.ensure()?;
    let snapshot = store.load_recent(config.history_lines)?;
    let mut app = startup_app(config, &snapshot, teardown_on_exit);

    let stop = StopSignal::new();
    let (mut lines_rx, _tailer) = tailer::spawn(
        TailOptions {
            path: config.log_path.clone(),
            start_offset: snapshot.end_offset,
            poll_interval: config.poll_interval,
        },
        stop.clone(),
    );

    let mut terminal = match ratatui::try_init() {
        Ok(terminal) => terminal,
        Err(e) => {
            stop.stop();
            return Err(ChatError::TerminalCapability(e.to_string()));
        }
    };
    let terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to set terminal modes: {}", e))
        .ok();

    event_loop(
        &mut terminal,
        &mut app,
        &store,
        controller,
        &stop,
        &mut lines_rx,
        config,
    );

    stop.stop();
    drop(terminal_mode_guard);
    ratatui::restore();
    Ok(())
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    store: &LogStore,
    controller: &mut dyn SessionController,
    stop: &StopSignal,
    lines_rx: &mut mpsc::Receiver<String>,
    config: &ResolvedConfig,
) {
    let mut needs_redraw = true; // Force first frame
    let mut needs_clear = false;
    let mut last_draw = Instant::now();

    loop {
        // The clock in the status bar moves even when nothing else does.
        if last_draw.elapsed() >= config.status_interval {
            needs_redraw = true;
        }

        if needs_redraw {
            if needs_clear {
                if let Err(e) = terminal.clear() {
                    warn!("Failed to clear terminal: {}", e);
                }
                needs_clear = false;
            }
            let clock = current_timestamp();
            if let Err(e) = terminal.draw(|f| ui::draw_ui(f, app, &clock)) {
                // Usually a resize racing the draw; the next frame fixes it.
                warn!("Skipping frame: {}", e);
            }
            last_draw = Instant::now();
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(config.poll_interval);
        let actions = first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
            .chain(drain_lines(lines_rx));

        for action in actions {
            debug!("Action: {:?}", action);
            let effect = update(app, action);
            match apply_effect(effect, app, store, controller, stop) {
                Flow::Idle => {}
                Flow::Redraw => needs_redraw = true,
                Flow::FullRedraw => {
                    needs_redraw = true;
                    needs_clear = true;
                }
                Flow::Quit => return,
            }
        }
    }
}
