//! # Core Chat Logic
//!
//! Everything the chat does that isn't drawing to a terminal.
//!
//! ```text
//!   agents ──append──▶ ┌──────────────┐ ◀──append── commit (Effect::Commit)
//!                      │  chat.log    │
//!                      └──────┬───────┘
//!                             │ tailer (tokio task)
//!                             ▼
//!                 Action::LinesArrived ──▶ update() ──▶ App
//!                                                       │
//!                                       transcript::visible_tail()
//!                                                       ▼
//!                                               tui (ratatui)
//! ```
//!
//! ## Modules
//!
//! - [`message`]: log line format, parser, `Message` / `LogEntry`
//! - [`log_store`]: append-only chat log on disk
//! - [`tailer`]: background task following the log
//! - [`input`]: edit buffer and cursor
//! - [`action`]: the `Action` enum and `update()` reducer
//! - [`state`]: the `App` struct
//! - [`transcript`]: wrapping and tail-pinned layout
//! - [`session`]: tmux session controller
//! - [`config`]: layered configuration

pub mod action;
pub mod config;
pub mod input;
pub mod log_store;
pub mod message;
pub mod session;
pub mod state;
pub mod tailer;
pub mod transcript;
