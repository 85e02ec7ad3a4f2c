//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.huddle/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The result is one immutable `ResolvedConfig`, built once in `main` and
//! handed to each component. Nothing re-reads the environment afterwards.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HuddleConfig {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub session_name: Option<String>,
    pub log_file: Option<String>,
    pub user: Option<String>,
    pub status_interval_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub history_lines: Option<usize>,
    pub history_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AgentsConfig {
    pub command: Option<String>,
    pub default_prompt: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SESSION_NAME: &str = "multi-agent";
pub const DEFAULT_LOG_FILE: &str = ".claude/chat.log";
pub const DEFAULT_OPERATOR: &str = "human";
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_HISTORY_LINES: usize = 100;
pub const DEFAULT_HISTORY_LIMIT: usize = 2000;
pub const DEFAULT_AGENT_COMMAND: &str = "claude --dangerously-skip-permissions";
pub const DEFAULT_AGENT_PROMPT: &str =
    "Invoke the multi-agent skill and await instructions in chat.";

/// Floor for the tailer/input poll interval.
const MIN_POLL_INTERVAL_MS: u64 = 10;

// Environment shared with the agent processes.
pub const ENV_SESSION: &str = "CC_TMUX_SESSION";
pub const ENV_LOG_FILE: &str = "CC_CHAT_LOG";
pub const ENV_USER: &str = "CC_CHAT_USER";
pub const ENV_PANE_ID: &str = "CC_PANE_ID";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub session_name: String,
    pub log_path: PathBuf,
    pub operator: String,
    pub status_interval: Duration,
    pub poll_interval: Duration,
    pub history_lines: usize,
    pub history_limit: usize,
    pub agent_command: String,
    pub default_prompt: String,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub session_name: Option<String>,
    pub log_file: Option<PathBuf>,
    pub user: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.huddle`, where config and the debug log live.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".huddle"))
}

/// Returns the path to `~/.huddle/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.huddle/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `HuddleConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<HuddleConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(HuddleConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<HuddleConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(HuddleConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: HuddleConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Huddle Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [chat]
# session_name = "multi-agent"        # Or set CC_TMUX_SESSION
# log_file = ".claude/chat.log"       # Or set CC_CHAT_LOG
# user = "human"                      # Or set CC_CHAT_USER
# status_interval_secs = 5            # Status bar clock refresh
# poll_interval_ms = 100              # Log tail / key poll cadence
# history_lines = 100                 # Lines loaded from the log at startup
# history_limit = 2000                # Entries kept in memory

# [agents]
# command = "claude --dangerously-skip-permissions"
# default_prompt = "Invoke the multi-agent skill and await instructions in chat."
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &HuddleConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// `resolve` with an injectable environment lookup.
pub fn resolve_with_env(
    config: &HuddleConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let chat = &config.chat;

    // Session name: CLI → env → config → default
    let session_name = cli
        .session_name
        .clone()
        .or_else(|| env(ENV_SESSION))
        .or_else(|| chat.session_name.clone())
        .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string());

    // Log file: CLI → env → config → default
    let log_path = cli
        .log_file
        .clone()
        .or_else(|| env(ENV_LOG_FILE).map(PathBuf::from))
        .or_else(|| chat.log_file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    // Operator identity: CLI → env → config → default
    let operator = cli
        .user
        .clone()
        .or_else(|| env(ENV_USER))
        .or_else(|| chat.user.clone())
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OPERATOR.to_string());

    let status_secs = chat
        .status_interval_secs
        .unwrap_or(DEFAULT_STATUS_INTERVAL_SECS)
        .max(1);
    let poll_ms = chat
        .poll_interval_ms
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
        .max(MIN_POLL_INTERVAL_MS);

    ResolvedConfig {
        session_name,
        log_path,
        operator,
        status_interval: Duration::from_secs(status_secs),
        poll_interval: Duration::from_millis(poll_ms),
        history_lines: chat.history_lines.unwrap_or(DEFAULT_HISTORY_LINES),
        history_limit: chat.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1),
        agent_command: config
            .agents
            .command
            .clone()
            .unwrap_or_else(|| DEFAULT_AGENT_COMMAND.to_string()),
        default_prompt: config
            .agents
            .default_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_AGENT_PROMPT.to_string()),
    }
}
