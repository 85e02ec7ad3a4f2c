//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::session::{SessionController, SessionError};
use crate::core::state::App;

/// A session controller that records calls instead of running tmux.
#[derive(Debug, Default)]
pub struct RecordingSession {
    pub running: bool,
    pub spawned: Vec<(String, String)>,
    pub kills: usize,
}

impl SessionController for RecordingSession {
    fn spawn(&mut self, identity: &str, command: &str) -> Result<(), SessionError> {
        self.running = true;
        self.spawned.push((identity.to_string(), command.to_string()));
        Ok(())
    }

    fn session_exists(&self) -> bool {
        self.running
    }

    fn kill(&mut self) -> Result<(), SessionError> {
        if self.running {
            self.running = false;
            self.kills += 1;
        }
        Ok(())
    }
}

/// Creates a test App for operator "human" in session "test-session".
pub fn test_app() -> App {
    App::new("human", "test-session")
}
