//! # MessagePane Component
//!
//! Tail-pinned view of the chat history. Layout comes from
//! `core::transcript::visible_tail`; this component only styles the rows:
//! the timestamp is dim, the sender token bold and colored by sender kind,
//! bodies are left in the default style.

use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::message::{LogEntry, SenderKind};
use crate::core::transcript::{DisplayLine, visible_tail};
use crate::tui::component::Component;

pub struct MessagePane<'a> {
    pub history: &'a VecDeque<LogEntry>,
}

impl<'a> MessagePane<'a> {
    pub fn new(history: &'a VecDeque<LogEntry>) -> Self {
        Self { history }
    }
}

pub fn sender_style(kind: SenderKind) -> Style {
    let color = match kind {
        SenderKind::Human => Color::Green,
        SenderKind::System => Color::Yellow,
        SenderKind::Agent => Color::Cyan,
        SenderKind::Other => Color::White,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn styled_line(row: DisplayLine<'_>) -> Line<'_> {
    match row {
        DisplayLine::Lead {
            timestamp,
            sender,
            text,
        } => {
            let mut spans = vec![
                Span::styled(format!("[{timestamp}] "), Style::default().add_modifier(Modifier::DIM)),
                Span::styled(format!("[{sender}]"), sender_style(SenderKind::of(sender))),
            ];
            if !text.is_empty() {
                spans.push(Span::raw(format!(" {text}")));
            }
            Line::from(spans)
        }
        DisplayLine::Continuation { indent, text } => {
            Line::from(vec![Span::raw(" ".repeat(indent)), Span::raw(text)])
        }
        DisplayLine::Raw(text) => Line::from(text),
    }
}

impl Component for MessagePane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = visible_tail(self.history, area.width, area.height);
        let lines: Vec<Line> = rows.into_iter().map(styled_line).collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(history: &VecDeque<LogEntry>, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| MessagePane::new(history).render(f, f.area()))
            .unwrap();
        terminal
    }

    fn row_text(terminal: &Terminal<TestBackend>, row: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, row)].symbol())
            .collect::<String>()
    }

    #[test]
    fn sender_colors_by_kind() {
        assert_eq!(sender_style(SenderKind::Human).fg, Some(Color::Green));
        assert_eq!(sender_style(SenderKind::System).fg, Some(Color::Yellow));
        assert_eq!(sender_style(SenderKind::Agent).fg, Some(Color::Cyan));
        assert_eq!(sender_style(SenderKind::Other).fg, Some(Color::White));
    }

    #[test]
    fn newest_message_sits_on_last_row() {
        let history: VecDeque<LogEntry> = (0..10)
            .map(|i| LogEntry::Message(Message::new("12:00:00", "agent1", format!("msg {i}"))))
            .collect();
        let terminal = render(&history, 40, 3);
        assert!(row_text(&terminal, 2).starts_with("[12:00:00] [agent1] msg 9"));
        assert!(row_text(&terminal, 0).starts_with("[12:00:00] [agent1] msg 7"));
    }

    #[test]
    fn only_sender_token_is_colored() {
        let history: VecDeque<LogEntry> =
            [LogEntry::Message(Message::new("12:00:00", "human", "hello"))].into();
        let terminal = render(&history, 40, 1);
        let buffer = terminal.backend().buffer();

        // "[12:00:00] " is 11 cells, then "[human]" then " hello"
        assert!(buffer[(0, 0)].modifier.contains(Modifier::DIM));
        assert_eq!(buffer[(11, 0)].fg, Color::Green);
        assert!(buffer[(11, 0)].modifier.contains(Modifier::BOLD));
        assert_eq!(buffer[(19, 0)].symbol(), "h");
        assert_eq!(buffer[(19, 0)].fg, Color::Reset);
    }

    #[test]
    fn continuation_rows_are_indented() {
        let history: VecDeque<LogEntry> = [LogEntry::Message(Message::new(
            "12:00:00",
            "human",
            "alpha beta gamma delta epsilon zeta eta theta",
        ))]
        .into();
        // usable 40, prefix 19 → 21-column body
        let terminal = render(&history, 41, 3);
        let second = row_text(&terminal, 1);
        assert!(second.starts_with(&" ".repeat(19)));
        assert!(second[19..].starts_with("delta epsilon zeta"));
    }

    #[test]
    fn raw_lines_render_verbatim() {
        let history: VecDeque<LogEntry> = [LogEntry::Raw("plain [text".into())].into();
        let terminal = render(&history, 30, 1);
        assert!(row_text(&terminal, 0).starts_with("plain [text"));
    }
}
