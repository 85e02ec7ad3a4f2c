//! # Application State
//!
//! Core chat state. No terminal types live here; presentation is derived from
//! it on every frame by the `tui` module.
//!
//! ```text
//! App
//! ├── history: VecDeque<LogEntry>   // bounded, oldest dropped first
//! ├── input: InputState             // edit buffer + cursor
//! ├── operator: String              // identity used for committed messages
//! ├── session_name: String          // shown in the status bar
//! └── teardown_on_exit: bool        // whether Ctrl-D kills the session
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::VecDeque;

use crate::core::config::ResolvedConfig;
use crate::core::input::InputState;
use crate::core::message::{LogEntry, Message};

pub struct App {
    pub history: VecDeque<LogEntry>,
    pub history_limit: usize,
    pub input: InputState,
    pub operator: String,
    pub session_name: String,
    pub teardown_on_exit: bool,
}

impl App {
    pub fn new(operator: impl Into<String>, session_name: impl Into<String>) -> Self {
        Self {
            history: VecDeque::new(),
            history_limit: crate::core::config::DEFAULT_HISTORY_LIMIT,
            input: InputState::new(),
            operator: operator.into(),
            session_name: session_name.into(),
            teardown_on_exit: true,
        }
    }

    pub fn from_config(config: &ResolvedConfig, teardown_on_exit: bool) -> Self {
        Self {
            history_limit: config.history_limit,
            teardown_on_exit,
            ..Self::new(config.operator.clone(), config.session_name.clone())
        }
    }

    /// Add one entry to the end of the history, dropping the oldest past the limit.
    pub fn push_entry(&mut self, entry: LogEntry) {
        self.history.push_back(entry);
        while self.history.len() > self.history_limit.max(1) {
            self.history.pop_front();
        }
    }

    /// Add a message that exists only on this screen (never written to the log).
    pub fn push_local_notice(&mut self, body: impl Into<String>) {
        self.push_entry(LogEntry::Message(Message::now("system", body)));
    }

    /// Exit help shown at startup and in the local notice.
    pub fn exit_help(&self) -> String {
        if self.teardown_on_exit {
            "Ctrl-D to exit and kill session, Ctrl-C to just exit".to_string()
        } else {
            "Ctrl-D to exit, Ctrl-C to just exit".to_string()
        }
    }
}
