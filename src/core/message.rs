//! # Messages
//!
//! One chat message is one line of the log:
//!
//! ```text
//! [HH:MM:SS] [<sender>] <body>
//! ```
//!
//! Anything else in the log is kept verbatim as a raw line. Parsing is total:
//! every input produces a `ParsedLine`, nothing here can fail or panic.

use std::fmt;

use chrono::Local;

/// Format used for the timestamp field of every message.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// A structured chat message. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub timestamp: String,
    pub sender: String,
    pub body: String,
}

impl Message {
    /// Build a message, normalizing fields so it always formats to exactly one
    /// parseable log line: newlines become spaces everywhere and `]` in the
    /// timestamp or sender becomes `)`.
    pub fn new(
        timestamp: impl Into<String>,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: sanitize_header_field(&timestamp.into()),
            sender: sanitize_header_field(&sender.into()),
            body: flatten_body(&body.into()),
        }
    }

    /// Build a message stamped with the current local wall-clock time.
    pub fn now(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(current_timestamp(), sender, body)
    }

    /// Render the log line for this message (without trailing newline).
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.timestamp, self.sender, self.body)
    }
}

/// Who wrote a message, as far as styling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderKind {
    Human,
    System,
    Agent,
    Other,
}

impl SenderKind {
    pub fn of(sender: &str) -> Self {
        match sender {
            "human" => SenderKind::Human,
            "system" => SenderKind::System,
            s if s.starts_with("agent") => SenderKind::Agent,
            _ => SenderKind::Other,
        }
    }
}

/// One entry of the chat history: a parsed message or an opaque raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Message(Message),
    Raw(String),
}

impl LogEntry {
    /// Parse a log line (without its line terminator).
    pub fn parse(line: &str) -> Self {
        match parse_line(line) {
            ParsedLine {
                timestamp: Some(timestamp),
                sender: Some(sender),
                body,
            } => LogEntry::Message(Message {
                timestamp: timestamp.to_string(),
                sender: sender.to_string(),
                body: body.to_string(),
            }),
            _ => LogEntry::Raw(line.to_string()),
        }
    }
}

/// Result of parsing a single line. Both header fields are present or both absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub timestamp: Option<&'a str>,
    pub sender: Option<&'a str>,
    pub body: &'a str,
}

/// Split a raw line into `(timestamp, sender, body)`.
///
/// Lines that don't match `[ts] [sender] body` come back with both header
/// fields absent and the whole input as the body.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    match split_header(line) {
        Some((timestamp, sender, body)) => ParsedLine {
            timestamp: Some(timestamp),
            sender: Some(sender),
            body,
        },
        None => ParsedLine {
            timestamp: None,
            sender: None,
            body: line,
        },
    }
}

// All delimiters are ASCII, so every slice boundary below is a char boundary.
fn split_header(line: &str) -> Option<(&str, &str, &str)> {
    let inner = line.strip_prefix('[')?;
    let ts_end = inner.find(']')?;
    let timestamp = &inner[..ts_end];

    let rest = inner[ts_end + 1..].strip_prefix(" [")?;
    let sender_end = rest.find(']')?;
    let sender = &rest[..sender_end];

    let body = rest[sender_end + 1..].strip_prefix(' ')?;
    Some((timestamp, sender, body))
}

/// Current local time in log timestamp format.
pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Replace line breaks so the body stays on a single log line.
pub fn flatten_body(body: &str) -> String {
    body.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn sanitize_header_field(field: &str) -> String {
    field
        .chars()
        .map(|c| match c {
            ']' => ')',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}
