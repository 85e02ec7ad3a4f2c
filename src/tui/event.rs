use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, warn};

use crate::core::action::Action;

/// Poll for an event with timeout (blocks up to `timeout`)
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<Action> {
    match event::poll(timeout) {
        Ok(true) => match event::read() {
            Ok(event) => translate(event),
            Err(e) => {
                warn!("Failed to read terminal event: {}", e);
                None
            }
        },
        Ok(false) => None,
        Err(e) => {
            warn!("Failed to poll terminal events: {}", e);
            None
        }
    }
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<Action> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// Map a terminal event to an action. Unbound keys map to `None`.
pub fn translate(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => translate_key(key_event),
        Event::Paste(data) => Some(Action::Paste(data)),
        Event::Resize(width, height) => {
            debug!("Terminal resized to {}x{}", width, height);
            Some(Action::Resize)
        }
        _ => None,
    }
}

fn translate_key(key_event: KeyEvent) -> Option<Action> {
    // Some platforms report releases too; only presses edit.
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code, key_event.modifiers
    );

    // Alt chords are not bound to anything and must not type their letter.
    if key_event.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('d') => Some(Action::Exit),
            KeyCode::Char('c') => Some(Action::ForceExit),
            KeyCode::Char('a') => Some(Action::CursorHome),
            KeyCode::Char('e') => Some(Action::CursorEnd),
            KeyCode::Char('u') => Some(Action::ClearBuffer),
            KeyCode::Char('l') => Some(Action::ClearScreen),
            _ => None,
        };
    }

    match key_event.code {
        KeyCode::Char(c) => Some(Action::InsertChar(c)),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Delete => Some(Action::DeleteForward),
        KeyCode::Left => Some(Action::CursorLeft),
        KeyCode::Right => Some(Action::CursorRight),
        KeyCode::Home => Some(Action::CursorHome),
        KeyCode::End => Some(Action::CursorEnd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn ctrl(c: char) -> Event {
        key(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn control_shortcuts() {
        assert_eq!(translate(ctrl('d')), Some(Action::Exit));
        assert_eq!(translate(ctrl('c')), Some(Action::ForceExit));
        assert_eq!(translate(ctrl('a')), Some(Action::CursorHome));
        assert_eq!(translate(ctrl('e')), Some(Action::CursorEnd));
        assert_eq!(translate(ctrl('u')), Some(Action::ClearBuffer));
        assert_eq!(translate(ctrl('l')), Some(Action::ClearScreen));
        assert_eq!(translate(ctrl('x')), None);
    }

    #[test]
    fn editing_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(translate(key(KeyCode::Char('q'), none)), Some(Action::InsertChar('q')));
        assert_eq!(
            translate(key(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(Action::InsertChar('Q'))
        );
        assert_eq!(translate(key(KeyCode::Enter, none)), Some(Action::Submit));
        assert_eq!(translate(key(KeyCode::Backspace, none)), Some(Action::Backspace));
        assert_eq!(translate(key(KeyCode::Delete, none)), Some(Action::DeleteForward));
        assert_eq!(translate(key(KeyCode::Left, none)), Some(Action::CursorLeft));
        assert_eq!(translate(key(KeyCode::Right, none)), Some(Action::CursorRight));
        assert_eq!(translate(key(KeyCode::Home, none)), Some(Action::CursorHome));
        assert_eq!(translate(key(KeyCode::End, none)), Some(Action::CursorEnd));
        assert_eq!(translate(key(KeyCode::F(5), none)), None);
        assert_eq!(translate(key(KeyCode::Up, none)), None);
    }

    #[test]
    fn alt_chords_are_ignored() {
        assert_eq!(translate(key(KeyCode::Char('b'), KeyModifiers::ALT)), None);
        assert_eq!(
            translate(key(KeyCode::Char('B'), KeyModifiers::ALT | KeyModifiers::SHIFT)),
            None
        );
        assert_eq!(
            translate(key(KeyCode::Char('d'), KeyModifiers::ALT | KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(translate(key(KeyCode::Enter, KeyModifiers::ALT)), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(translate(Event::Key(release)), None);
    }

    #[test]
    fn resize_and_paste() {
        assert_eq!(translate(Event::Resize(80, 24)), Some(Action::Resize));
        assert_eq!(
            translate(Event::Paste("a\nb".into())),
            Some(Action::Paste("a\nb".into()))
        );
        assert_eq!(translate(Event::FocusGained), None);
    }
}
