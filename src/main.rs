use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use huddle::core::config::{self, CliOverrides, ResolvedConfig};
use huddle::core::log_store::LogStore;
use huddle::core::session::{self, SessionController, TmuxSession};
use huddle::tui;

#[derive(Parser)]
#[command(name = "huddle", about = "Shared chat room for a team of terminal agents")]
struct Args {
    /// tmux session holding the agents
    #[arg(long, global = true)]
    session: Option<String>,

    /// Chat log shared by every participant
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Identity your messages are sent under
    #[arg(long, global = true)]
    user: Option<String>,

    /// Write debug-level detail to the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Launch agents in a fresh tmux session and open the chat
    Start {
        /// How many agents to start
        num_agents: usize,
        /// Instruction given to every agent
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Open the chat for an existing log
    Chat {
        /// Leave the agent session running on Ctrl-D
        #[arg(long)]
        no_kill: bool,
    },
    /// Attach to the agents' tmux session
    Attach,
}

fn init_logging(verbose: bool) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // The terminal belongs to the TUI, so logs only ever go to a file.
    let Some(dir) = config::config_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(log_file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("huddle.log"))
    {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

fn ensure_log(config: &ResolvedConfig) -> Result<LogStore, String> {
    let store = LogStore::new(&config.log_path);
    store
        .ensure()
        .map_err(|e| format!("cannot create chat log {}: {e}", config.log_path.display()))?;
    Ok(store)
}

fn start(config: &ResolvedConfig, num_agents: usize, prompt: Vec<String>) -> Result<(), String> {
    if num_agents < 1 {
        return Err("number of agents must be at least 1".to_string());
    }
    let store = ensure_log(config)?;

    let mut tmux = TmuxSession::new(&config.session_name);
    if tmux.session_exists() {
        println!("Killing existing session '{}'", tmux.name());
    }

    let prompt = prompt.join(" ");
    let prompt = (!prompt.trim().is_empty()).then_some(prompt.as_str());
    let announcement =
        session::launch_agents(&mut tmux, config, num_agents, prompt).map_err(|e| e.to_string())?;
    if let Err(e) = store.append(&announcement) {
        log::warn!("Failed to announce start: {}", e);
    }

    println!("Started {num_agents} agents in tmux session '{}'", tmux.name());
    println!("Watch them with: huddle attach");

    tui::run(config, &mut tmux, true).map_err(|e| e.to_string())
}

fn chat(config: &ResolvedConfig, no_kill: bool) -> Result<(), String> {
    ensure_log(config)?;
    let mut tmux = TmuxSession::new(&config.session_name);
    tui::run(config, &mut tmux, !no_kill).map_err(|e| e.to_string())
}

fn attach(config: &ResolvedConfig) -> Result<(), String> {
    let tmux = TmuxSession::new(&config.session_name);
    if !tmux.session_exists() {
        return Err(format!(
            "no session '{}' (start one with: huddle start <num-agents>)",
            tmux.name()
        ));
    }
    tmux.attach().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging(args.verbose);

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let cli = CliOverrides {
        session_name: args.session,
        log_file: args.log_file,
        user: args.user,
    };
    let config = config::resolve(&file_config, &cli);
    log::info!(
        "Huddle starting: session '{}', log {}, user '{}'",
        config.session_name,
        config.log_path.display(),
        config.operator
    );

    let result = match args.command {
        Command::Start { num_agents, prompt } => start(&config, num_agents, prompt),
        Command::Chat { no_kill } => chat(&config, no_kill),
        Command::Attach => attach(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
