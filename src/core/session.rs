//! # Agent Session
//!
//! The agents run side by side in the panes of one tmux session. The chat
//! only needs three things from it, captured by `SessionController`:
//! start a participant, ask whether the session is up, and tear it down.
//!
//! `TmuxSession` is the real implementation; tests use a recording fake.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Output};

use log::{debug, info, warn};

use crate::core::config::{ENV_LOG_FILE, ENV_PANE_ID, ENV_USER, ResolvedConfig};
use crate::core::message::Message;

#[derive(Debug)]
pub enum SessionError {
    /// The multiplexer binary could not be run at all.
    Spawn(io::Error),
    /// The multiplexer ran and reported failure.
    Command { command: String, stderr: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Spawn(e) => write!(f, "failed to run tmux: {e}"),
            SessionError::Command { command, stderr } => {
                write!(f, "`{command}` failed: {}", stderr.trim())
            }
        }
    }
}

impl std::error::Error for SessionError {}

pub trait SessionController {
    /// Start one participant writing to the chat as `identity`.
    fn spawn(&mut self, identity: &str, command: &str) -> Result<(), SessionError>;

    fn session_exists(&self) -> bool;

    /// Tear the session down. Does nothing when no session is running.
    fn kill(&mut self) -> Result<(), SessionError>;
}

/// A named tmux session holding one pane per agent.
///
/// Every command targets the session as `=<name>`, so tmux matches the name
/// exactly instead of falling back to a prefix or pattern match.
pub struct TmuxSession {
    name: String,
    program: String,
    socket: Option<String>,
}

impl TmuxSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_program(name, "tmux")
    }

    /// Use a different tmux binary (path or name).
    pub fn with_program(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            socket: None,
        }
    }

    /// Talk to the tmux server on a named socket (`tmux -L <socket>`).
    pub fn on_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact-match session target.
    fn session_target(&self) -> String {
        format!("={}", self.name)
    }

    /// Exact-match target for the session's current window.
    fn window_target(&self) -> String {
        format!("={}:", self.name)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(socket) = &self.socket {
            command.args(["-L", socket]);
        }
        command.args(args);
        command
    }

    fn run(&self, args: &[&str]) -> Result<Output, SessionError> {
        debug!("Running {} {}", self.program, args.join(" "));
        self.command(args).output().map_err(SessionError::Spawn)
    }

    fn run_checked(&self, args: &[&str]) -> Result<(), SessionError> {
        let output = self.run(args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(SessionError::Command {
                command: format!("{} {}", self.program, args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    /// Replace the current process with `tmux attach` (returns only on error).
    #[cfg(unix)]
    pub fn attach(&self) -> Result<(), SessionError> {
        use std::os::unix::process::CommandExt;
        info!("Attaching to tmux session '{}'", self.name);
        let err = self.command(&["attach", "-t", &self.session_target()]).exec();
        Err(SessionError::Spawn(err))
    }

    /// Run `tmux attach` until the user detaches.
    #[cfg(not(unix))]
    pub fn attach(&self) -> Result<(), SessionError> {
        info!("Attaching to tmux session '{}'", self.name);
        let target = self.session_target();
        let status = self
            .command(&["attach", "-t", &target])
            .status()
            .map_err(SessionError::Spawn)?;
        if status.success() {
            Ok(())
        } else {
            Err(SessionError::Command {
                command: format!("{} attach -t {}", self.program, target),
                stderr: format!("exited with {status}"),
            })
        }
    }
}

impl SessionController for TmuxSession {
    fn spawn(&mut self, identity: &str, command: &str) -> Result<(), SessionError> {
        let shell_line = format!("{ENV_USER}={} {command}", shell_quote(identity));

        if self.session_exists() {
            let window = self.window_target();
            self.run_checked(&["split-window", "-t", &window, "-h", &shell_line])?;
            self.run_checked(&["select-layout", "-t", &window, "tiled"])?;
        } else {
            self.run_checked(&["new-session", "-d", "-s", &self.name, "-n", "main", &shell_line])?;
        }
        info!("Spawned {} in tmux session '{}'", identity, self.name);
        Ok(())
    }

    fn session_exists(&self) -> bool {
        match self.run(&["has-session", "-t", &self.session_target()]) {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("tmux unavailable: {}", e);
                false
            }
        }
    }

    fn kill(&mut self) -> Result<(), SessionError> {
        if !self.session_exists() {
            debug!("No tmux session '{}' to kill", self.name);
            return Ok(());
        }
        info!("Killing tmux session '{}'", self.name);
        self.run_checked(&["kill-session", "-t", &self.session_target()])
    }
}

/// Sender identity for the agent in pane `pane` (1-based).
pub fn agent_identity(pane: usize) -> String {
    format!("agent{pane}")
}

/// Shell command that launches the agent for pane `pane`.
///
/// The sender identity is added by `SessionController::spawn`; this sets the
/// pane id and log location the agent needs to join the chat.
pub fn agent_command(config: &ResolvedConfig, pane: usize, prompt: Option<&str>) -> String {
    let prompt = prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(config.default_prompt.as_str());
    format!(
        "{ENV_PANE_ID}={pane} {ENV_LOG_FILE}={} {} {}",
        shell_quote_path(&config.log_path),
        config.agent_command,
        shell_quote(prompt)
    )
}

/// Start `count` agents in a fresh session, replacing any running one.
///
/// Returns the `system` announcement to append to the chat log.
pub fn launch_agents(
    controller: &mut dyn SessionController,
    config: &ResolvedConfig,
    count: usize,
    prompt: Option<&str>,
) -> Result<Message, SessionError> {
    if controller.session_exists() {
        info!("Replacing existing session '{}'", config.session_name);
        controller.kill()?;
    }

    for pane in 1..=count {
        let command = agent_command(config, pane, prompt);
        controller.spawn(&agent_identity(pane), &command)?;
    }

    let body = match prompt.filter(|p| !p.trim().is_empty()) {
        Some(prompt) => format!("Starting {count} agents with prompt: {prompt}"),
        None => format!("Starting {count} agents (awaiting instructions)"),
    };
    Ok(Message::now("system", body))
}

/// Quote a value for a POSIX shell using single quotes.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn shell_quote_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.contains('\u{FFFD}') {
        warn!("Log path {} is not valid UTF-8", path.display());
    }
    shell_quote(&text)
}
