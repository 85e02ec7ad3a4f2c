//! # InputLine Component
//!
//! Prompt plus the edit buffer on one row. Long buffers scroll sideways so
//! the edit position is always on screen; the terminal cursor is placed there.

mod viewport;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::core::input::InputState;
use crate::tui::component::Component;

pub struct InputLine<'a> {
    pub operator: &'a str,
    pub input: &'a InputState,
}

impl<'a> InputLine<'a> {
    pub fn new(operator: &'a str, input: &'a InputState) -> Self {
        Self { operator, input }
    }

    fn prompt(&self) -> String {
        format!("[{}]> ", self.operator)
    }
}

impl Component for InputLine<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let prompt = self.prompt();
        let prompt_width = prompt.width();
        let buffer = self.input.buffer();
        let width = viewport::text_width(area.width, prompt_width);
        let view = viewport::scroll(buffer.len(), self.input.cursor(), width);

        let line = Line::from(vec![
            Span::styled(
                prompt,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(&buffer[view.start..view.end]),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        let column = (prompt_width + view.cursor_column).min(area.width as usize - 1);
        frame.set_cursor_position((area.x + column as u16, area.y));
    }
}
