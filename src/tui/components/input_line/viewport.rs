//! Horizontal scrolling for the single-row input line.
//!
//! The buffer is printable ASCII, so a byte offset is also a column offset.

/// Visible slice of the buffer and the cursor column inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Viewport {
    pub start: usize,
    pub end: usize,
    pub cursor_column: usize,
}

/// Columns left for text after the prompt. One column is kept free so the
/// cursor can sit past the last character.
pub(super) fn text_width(area_width: u16, prompt_width: usize) -> usize {
    (area_width as usize)
        .saturating_sub(prompt_width)
        .saturating_sub(1)
}

/// Window of `len` bytes that keeps `cursor` in view within `width` columns.
///
/// The window scrolls only as far as needed: while the cursor fits in the
/// first `width` columns the buffer is shown from its start.
pub(super) fn scroll(len: usize, cursor: usize, width: usize) -> Viewport {
    let cursor = cursor.min(len);
    if width == 0 {
        return Viewport {
            start: cursor,
            end: cursor,
            cursor_column: 0,
        };
    }

    let start = if cursor >= width {
        cursor - width + 1
    } else {
        0
    };
    Viewport {
        start,
        end: (start + width).min(len),
        cursor_column: cursor - start,
    }
}
