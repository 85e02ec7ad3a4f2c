use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::core::state::App;
use crate::core::transcript::{PaneGeometry, usable_width};
use crate::tui::component::Component;
use crate::tui::components::{InputLine, MessagePane, StatusBar};

/// One row of the frame, clipped to what exists.
fn row_area(frame_area: Rect, y: u16, height: u16) -> Rect {
    Rect::new(
        frame_area.x,
        frame_area.y.saturating_add(y),
        frame_area.width,
        height,
    )
    .intersection(frame_area)
}

/// Draw the whole chat screen: messages, status bar, separator, input line.
pub fn draw_ui(frame: &mut Frame, app: &App, clock: &str) {
    let area = frame.area();
    let geometry = PaneGeometry::for_height(area.height);

    let messages = row_area(area, 0, geometry.messages);
    if !messages.is_empty() {
        MessagePane::new(&app.history).render(frame, messages);
    }

    let status = row_area(area, geometry.status_row, 1);
    if !status.is_empty() {
        StatusBar::new(&app.session_name, clock).render(frame, status);
    }

    let separator = row_area(area, geometry.separator_row, 1);
    if !separator.is_empty() {
        let rule = "─".repeat(usable_width(separator.width));
        frame.render_widget(
            Span::styled(rule, Style::default().add_modifier(Modifier::DIM)),
            separator,
        );
    }

    let input = row_area(area, geometry.input_row, 1);
    if !input.is_empty() {
        InputLine::new(&app.operator, &app.input).render(frame, input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{LogEntry, Message};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn full_screen_layout() {
        let mut app = test_app();
        app.push_entry(LogEntry::Message(Message::new("10:00:00", "agent1", "ready")));
        app.input.insert_str("hi");

        let mut terminal = Terminal::new(TestBackend::new(50, 6)).unwrap();
        terminal.draw(|f| draw_ui(f, &app, "10:00:05")).unwrap();
        let rows = rows(&terminal);

        assert!(rows[2].starts_with("[10:00:00] [agent1] ready"));
        assert!(rows[3].starts_with(" test-session │ 10:00:05"));
        assert_eq!(rows[4].trim_end(), "─".repeat(49));
        assert!(rows[5].starts_with("[human]> hi"));
    }

    #[test]
    fn tiny_terminals_do_not_panic() {
        let app = test_app();
        for (width, height) in [(1, 1), (5, 2), (80, 3), (2, 1), (3, 10)] {
            let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
            terminal.draw(|f| draw_ui(f, &app, "00:00:00")).unwrap();
        }
    }

    #[test]
    fn two_row_terminal_keeps_status_and_separator() {
        let app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(30, 2)).unwrap();
        terminal.draw(|f| draw_ui(f, &app, "00:00:00")).unwrap();
        let rows = rows(&terminal);
        assert!(rows[0].contains("test-session"));
        assert!(rows[1].starts_with('─'));
    }
}
