//! Wrapping and boundary helpers for the composer.
//!
//! Stateless; the composer and its cursor call into these with the buffer
//! and the width they were rendered at.

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to content (border width)
pub(super) const BORDER_OFFSET: u16 = 1;

pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Text width inside the composer block, 0 when the area is too narrow.
pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Number of wrapped lines `text` occupies. Never less than one, and a
/// trailing newline counts as the start of a new line.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let ends_open = text.ends_with('\n') && lines.last().is_none_or(|l| !l.is_empty());
    (lines.len() as u16).max(1) + u16::from(ends_open)
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos].char_indices().last().map_or(0, |(i, _)| i)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos`, skipping separators first (readline
/// `backward-word`).
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let before = &text[..pos];
    let trimmed = before.trim_end_matches(|c: char| !is_word_char(c));
    trimmed
        .char_indices()
        .rev()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// End of the word after `pos`, skipping separators first (readline
/// `forward-word`).
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let after = &text[pos..];
    let word_start = after
        .find(is_word_char)
        .unwrap_or(after.len());
    let word_len = after[word_start..]
        .find(|c: char| !is_word_char(c))
        .unwrap_or(after.len() - word_start);
    pos + word_start + word_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count_minimum_is_one() {
        assert_eq!(wrap_line_count("", 40), 1);
        assert_eq!(wrap_line_count("hi", 0), 1);
    }

    #[test]
    fn test_line_count_wraps_and_breaks() {
        assert_eq!(wrap_line_count("abcdefgh", 4), 2);
        assert_eq!(wrap_line_count("one\ntwo\nthree", 40), 3);
    }

    #[test]
    fn test_trailing_newline_opens_a_line() {
        assert_eq!(wrap_line_count("draft\n", 40), 2);
        assert_eq!(wrap_line_count("abcdefgh\n", 4), 3);
    }

    #[test]
    fn test_char_boundaries_respect_utf8() {
        let s = "né🙂x";
        // n=0, é=1..3, 🙂=3..7, x=7
        assert_eq!(next_char_boundary(s, 1), 3);
        assert_eq!(next_char_boundary(s, 3), 7);
        assert_eq!(next_char_boundary(s, s.len()), s.len());
        assert_eq!(prev_char_boundary(s, 7), 3);
        assert_eq!(prev_char_boundary(s, 3), 1);
        assert_eq!(prev_char_boundary(s, 0), 0);
    }

    #[test]
    fn test_word_boundaries() {
        let s = "send it, now";
        assert_eq!(prev_word_boundary(s, s.len()), 9);
        assert_eq!(prev_word_boundary(s, 9), 5);
        assert_eq!(prev_word_boundary(s, 3), 0);
        assert_eq!(next_word_boundary(s, 0), 4);
        assert_eq!(next_word_boundary(s, 4), 7);
        assert_eq!(next_word_boundary(s, 7), s.len());
    }

    #[test]
    fn test_word_boundaries_treat_underscore_as_word() {
        let s = "a snake_case b";
        assert_eq!(next_word_boundary(s, 1), 12);
        assert_eq!(prev_word_boundary(s, 12), 2);
    }
}
