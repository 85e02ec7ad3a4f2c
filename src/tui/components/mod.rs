//! # TUI Components
//!
//! Stateless, props-based widgets for the chat screen. Each one is built
//! fresh from `App` every frame, renders into the `Rect` it is given and
//! keeps nothing between frames.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── message_pane.rs  (tail-pinned history, sender coloring)
//! ├── status_bar.rs    (session name, clock, shortcut help)
//! └── input_line/      (prompt + horizontally scrolled buffer)
//! ```
//!
//! Layout math lives in `core::transcript`; components only style and draw.

pub mod input_line;
pub mod message_pane;
pub mod status_bar;

pub use input_line::InputLine;
pub use message_pane::MessagePane;
pub use status_bar::StatusBar;
