//! Edit buffer and cursor for the input line.
//!
//! Only printable ASCII is ever inserted, so byte offsets and character
//! offsets coincide and `cursor` is always a valid slice index. Every method
//! keeps `cursor <= buffer.len()`.

/// Characters accepted as typed text.
pub fn is_insertable(c: char) -> bool {
    (' '..='~').contains(&c)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert a character at the cursor. Returns `false` if it was rejected.
    pub fn insert(&mut self, c: char) -> bool {
        if !is_insertable(c) {
            return false;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
        true
    }

    /// Insert pasted text. Line breaks and tabs become spaces, other
    /// non-printable characters are dropped. Returns `true` if anything changed.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let cleaned: String = text
            .chars()
            .map(|c| match c {
                '\n' | '\r' | '\t' => ' ',
                c => c,
            })
            .filter(|&c| is_insertable(c))
            .collect();
        if cleaned.is_empty() {
            return false;
        }
        self.buffer.insert_str(self.cursor, &cleaned);
        self.cursor += cleaned.len();
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.buffer.remove(self.cursor);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        self.buffer.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn home(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    pub fn end(&mut self) -> bool {
        let moved = self.cursor != self.buffer.len();
        self.cursor = self.buffer.len();
        moved
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the buffer for submission and reset. Whitespace-only input is
    /// discarded and yields `None`.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        (!text.trim().is_empty()).then_some(text)
    }
}
