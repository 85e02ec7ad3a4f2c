//! # StatusBar Component
//!
//! One inverted row between the messages and the input line:
//!
//! ```text
//!  multi-agent │ 14:03:22                          ^D:exit ^L:clear
//! ```
//!
//! Stateless: the clock string is a prop, so the event loop decides when the
//! time shown moves forward (every status interval, or on any redraw).

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;

pub const HELP_TEXT: &str = "^D:exit ^L:clear";

pub struct StatusBar<'a> {
    pub session_name: &'a str,
    pub clock: &'a str,
}

impl<'a> StatusBar<'a> {
    pub fn new(session_name: &'a str, clock: &'a str) -> Self {
        Self {
            session_name,
            clock,
        }
    }

    fn line(&self, width: u16) -> Line<'static> {
        let bar = Style::default().fg(Color::Black).bg(Color::White);
        let left = format!(" {} │ {}", self.session_name, self.clock);
        let right = format!("{HELP_TEXT} ");

        let gap = (width as usize).saturating_sub(left.width() + right.width());
        if gap == 0 {
            // No room for the help text; the session and clock win.
            return Line::from(Span::styled(left, bar)).style(bar);
        }

        Line::from(vec![
            Span::styled(left, bar),
            Span::styled(" ".repeat(gap), bar),
            Span::styled(right, bar.add_modifier(Modifier::DIM)),
        ])
        .style(bar)
    }
}

impl Component for StatusBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = self.line(area.width);
        frame.render_widget(Paragraph::new(line), area);
    }
}
