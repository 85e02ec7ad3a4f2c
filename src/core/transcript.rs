//! # Transcript Layout
//!
//! Pure half of rendering: history + pane geometry → the display lines that
//! fit, pinned to the newest content. The `tui` module only styles and draws
//! what this produces, so everything here is testable without a terminal.
//!
//! ```text
//! [12:00:01] [agent1] a long message that does
//!                     not fit on one line        ← continuation, indented
//! raw text that did not parse is wrapped at
//! full width
//! ```
//!
//! The last column of the pane is never written to, so "full width" means
//! `width - 1`.

use unicode_width::UnicodeWidthStr;

use crate::core::message::LogEntry;

/// Narrowest body column worth indenting under the prefix.
pub const MIN_BODY_WIDTH: usize = 20;

/// One physical row of the message pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayLine<'a> {
    /// First row of a message: `[timestamp] [sender] text`.
    Lead {
        timestamp: &'a str,
        sender: &'a str,
        text: String,
    },
    /// Following rows of a message, shifted right by `indent` columns.
    Continuation { indent: usize, text: String },
    /// A row of a line that did not parse.
    Raw(String),
}

impl DisplayLine<'_> {
    pub fn text(&self) -> &str {
        match self {
            DisplayLine::Lead { text, .. }
            | DisplayLine::Continuation { text, .. }
            | DisplayLine::Raw(text) => text,
        }
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self, DisplayLine::Continuation { .. })
    }
}

/// Row layout of the whole screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneGeometry {
    pub messages: u16,
    pub status_row: u16,
    pub separator_row: u16,
    pub input_row: u16,
}

/// Rows taken by status bar, separator and input line.
pub const CHROME_ROWS: u16 = 3;

impl PaneGeometry {
    /// Split a terminal of `height` rows. Rows that don't exist on a tiny
    /// terminal are pushed past the bottom and clipped by the renderer.
    pub fn for_height(height: u16) -> Self {
        let messages = height.saturating_sub(CHROME_ROWS);
        Self {
            messages,
            status_row: messages,
            separator_row: messages.saturating_add(1),
            input_row: messages.saturating_add(2),
        }
    }
}

/// Width available for text in a pane of `width` columns.
pub fn usable_width(width: u16) -> usize {
    (width as usize).saturating_sub(1)
}

/// Display width of the `[timestamp] [sender] ` prefix.
pub fn prefix_width(timestamp: &str, sender: &str) -> usize {
    timestamp.width() + sender.width() + "[] [] ".len()
}

/// Body wrap width for a message, or `None` when the prefix leaves less than
/// `MIN_BODY_WIDTH` columns and the body should use the full width instead.
pub fn body_width(width: u16, prefix_width: usize) -> Option<usize> {
    let available = usable_width(width).saturating_sub(prefix_width);
    (available >= MIN_BODY_WIDTH).then_some(available)
}

fn wrap_options(width: usize) -> textwrap::Options<'static> {
    textwrap::Options::new(width.max(1))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
        .word_splitter(textwrap::WordSplitter::NoHyphenation)
}

/// Wrap text into rows of at most `width` columns. Always yields at least one row.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let rows: Vec<String> = textwrap::wrap(text, wrap_options(width))
        .into_iter()
        .map(|row| row.into_owned())
        .collect();
    if rows.is_empty() {
        vec![String::new()]
    } else {
        rows
    }
}

/// All display rows for one history entry.
pub fn entry_lines(entry: &LogEntry, width: u16) -> Vec<DisplayLine<'_>> {
    match entry {
        LogEntry::Raw(text) => wrap(text, usable_width(width))
            .into_iter()
            .map(DisplayLine::Raw)
            .collect(),
        LogEntry::Message(message) => {
            let timestamp = message.timestamp.as_str();
            let sender = message.sender.as_str();
            let prefix = prefix_width(timestamp, sender);

            match body_width(width, prefix) {
                Some(body) => {
                    let mut rows = wrap(&message.body, body).into_iter();
                    let first = rows.next().unwrap_or_default();
                    std::iter::once(DisplayLine::Lead {
                        timestamp,
                        sender,
                        text: first,
                    })
                    .chain(rows.map(|text| DisplayLine::Continuation {
                        indent: prefix,
                        text,
                    }))
                    .collect()
                }
                None => {
                    // Too narrow to indent: header on its own row, body at full width.
                    std::iter::once(DisplayLine::Lead {
                        timestamp,
                        sender,
                        text: String::new(),
                    })
                    .chain(
                        wrap(&message.body, usable_width(width))
                            .into_iter()
                            .map(|text| DisplayLine::Continuation { indent: 0, text }),
                    )
                    .collect()
                }
            }
        }
    }
}

/// The display rows that fill a pane of `width` x `height`, newest at the bottom.
///
/// Entries are wrapped from the newest backwards and wrapping stops once the
/// pane is full, so older history costs nothing.
pub fn visible_tail<'a, I>(history: I, width: u16, height: u16) -> Vec<DisplayLine<'a>>
where
    I: IntoIterator<Item = &'a LogEntry>,
    I::IntoIter: DoubleEndedIterator,
{
    let height = height as usize;
    if height == 0 {
        return Vec::new();
    }

    let mut blocks: Vec<Vec<DisplayLine<'a>>> = Vec::new();
    let mut rows = 0;
    for entry in history.into_iter().rev() {
        let lines = entry_lines(entry, width);
        rows += lines.len();
        blocks.push(lines);
        if rows >= height {
            break;
        }
    }

    let mut tail: Vec<DisplayLine<'a>> = blocks.into_iter().rev().flatten().collect();
    let excess = tail.len().saturating_sub(height);
    tail.drain(..excess);
    tail
}
