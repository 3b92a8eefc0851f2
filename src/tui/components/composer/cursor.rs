//! Cursor position and internal scroll of the composer.
//!
//! The buffer itself lives in the core `MessageComposer`; every method here
//! takes it as `&str` so the ownership stays visible.

use super::text_wrap::{BORDER_OFFSET, inner_width, wrap_line_count, wrap_options};
use ratatui::layout::Rect;

pub(super) struct CursorState {
    /// Byte offset into the buffer (0..=buffer.len())
    pub pos: usize,
    /// First visible wrapped line when the buffer is taller than the box
    pub scroll_offset: u16,
    /// Area width from the last render, used for vertical movement
    pub last_width: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Keep `pos` valid after the buffer was replaced from outside.
    pub fn move_to_end(&mut self, buffer: &str) {
        self.pos = buffer.len();
    }

    /// Byte ranges of each wrapped line, including a trailing newline byte
    /// when the line ended at one.
    fn line_spans(buffer: &str, width: u16) -> Vec<(usize, usize)> {
        let lines = textwrap::wrap(buffer, wrap_options(width));
        let mut spans = Vec::with_capacity(lines.len());
        let mut start = 0;
        for line in &lines {
            let end = start + line.len();
            let consumed = if buffer.as_bytes().get(end) == Some(&b'\n') {
                end + 1
            } else {
                end
            };
            spans.push((start, end));
            start = consumed;
        }
        spans
    }

    /// Move up (`-1`) or down (`1`) a wrapped line, keeping the column when
    /// the target line is long enough. Returns false at the first/last line.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, area_width: u16) -> bool {
        let width = inner_width(area_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }
        let spans = Self::line_spans(buffer, width);
        let Some(current) = spans.iter().position(|&(_, end)| self.pos <= end) else {
            return false;
        };
        let target = if direction < 0 {
            match current.checked_sub(1) {
                Some(t) => t,
                None => return false,
            }
        } else if current + 1 < spans.len() {
            current + 1
        } else {
            return false;
        };
        let column = self.pos - spans[current].0;
        let (start, end) = spans[target];
        self.pos = (start + column).min(end);
        while !buffer.is_char_boundary(self.pos) {
            self.pos -= 1;
        }
        true
    }

    /// Wrapped line (0-based) the cursor sits on.
    pub fn current_line(&self, buffer: &str, area_width: u16) -> u16 {
        let width = inner_width(area_width);
        if width == 0 {
            return 0;
        }
        wrap_line_count(&buffer[..self.pos], width).saturating_sub(1)
    }

    /// Scroll so the cursor line stays inside `max_lines` visible lines.
    pub fn update_scroll_offset(&mut self, buffer: &str, area_width: u16, max_lines: u16) {
        let total = wrap_line_count(buffer, inner_width(area_width));
        if total <= max_lines {
            self.scroll_offset = 0;
            return;
        }
        let line = self.current_line(buffer, area_width);
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + max_lines {
            self.scroll_offset = line + 1 - max_lines;
        }
    }

    /// Terminal (column, row) of the cursor inside `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        }
        let before = &buffer[..self.pos];
        let line = self.current_line(buffer, area.width);

        // Column from the start of the logical line; wrapping trims trailing
        // spaces, so the wrapped segments can't be measured directly.
        let logical_start = before.rfind('\n').map_or(0, |i| i + 1);
        let logical = &before[logical_start..];
        let segments = textwrap::wrap(logical, wrap_options(width));
        let column = match segments.split_last() {
            Some((_, earlier)) => {
                let consumed: usize = earlier.iter().map(|s| s.chars().count()).sum();
                logical.chars().count().saturating_sub(consumed)
            }
            None => 0,
        };

        let row = line.saturating_sub(self.scroll_offset);
        (
            area.x + BORDER_OFFSET + column as u16,
            area.y + BORDER_OFFSET + row,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Area width 14 leaves 10 columns of text
    const WIDTH: u16 = 14;

    #[test]
    fn test_vertical_move_keeps_column() {
        let buffer = "first\nsecond";
        let mut cursor = CursorState::new();
        cursor.pos = buffer.len();
        assert!(cursor.move_vertically(buffer, -1, WIDTH));
        assert_eq!(cursor.pos, 5, "clamped to end of the shorter line");
        assert!(!cursor.move_vertically(buffer, -1, WIDTH));
        assert!(cursor.move_vertically(buffer, 1, WIDTH));
        assert_eq!(cursor.pos, 11);
    }

    #[test]
    fn test_current_line_after_newline() {
        let buffer = "one\n";
        let mut cursor = CursorState::new();
        cursor.pos = buffer.len();
        assert_eq!(cursor.current_line(buffer, WIDTH), 1);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let buffer = "1\n2\n3\n4\n5\n6";
        let mut cursor = CursorState::new();
        cursor.pos = buffer.len();
        cursor.update_scroll_offset(buffer, WIDTH, 3);
        assert_eq!(cursor.scroll_offset, 3);

        cursor.pos = 0;
        cursor.update_scroll_offset(buffer, WIDTH, 3);
        assert_eq!(cursor.scroll_offset, 0);
    }

    #[test]
    fn test_screen_pos_counts_trailing_spaces() {
        let buffer = "hi  ";
        let mut cursor = CursorState::new();
        cursor.pos = buffer.len();
        let area = Rect::new(0, 0, WIDTH, 3);
        assert_eq!(cursor.screen_pos(buffer, area), (1 + 4, 1));
    }
}
