//! Line lookup and offset helpers over a document's text

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::span::Span;

/// Find the nearest valid UTF-8 char boundary at or before `pos`
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    // Walk backwards to find valid UTF-8 start byte
    let mut p = pos;
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Clamp a caller-supplied offset into `text`
pub fn clamp_offset(text: &str, pos: usize) -> usize {
    floor_char_boundary(text, pos)
}

/// Span of the line containing `pos`, without its line terminator
pub fn line_span(text: &str, pos: usize) -> Span {
    let pos = clamp_offset(text, pos);
    let start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
    // Keep CRLF files from leaking '\r' into the scanned line
    let end = if end > start && text.as_bytes()[end - 1] == b'\r' {
        end - 1
    } else {
        end
    };
    Span::new(start, end.max(start))
}

/// Byte offset for a 0-based line and display column
///
/// Columns past the end of the line clamp to the line end. Returns None
/// when the line does not exist.
pub fn offset_at(text: &str, line: usize, col: usize) -> Option<usize> {
    let mut line_start = 0;
    for _ in 0..line {
        line_start += text[line_start..].find('\n')? + 1;
    }
    let span = line_span(text, line_start);
    let line_text = span.slice(text);

    let mut current_col = 0;
    for (byte_idx, ch) in line_text.char_indices() {
        if current_col >= col {
            return Some(span.start + byte_idx);
        }
        current_col += ch.width().unwrap_or(1);
    }
    Some(span.end)
}

/// 0-based line and display column for a byte offset
pub fn position_of(text: &str, pos: usize) -> (usize, usize) {
    let pos = clamp_offset(text, pos);
    let line = text[..pos].matches('\n').count();
    let span = line_span(text, pos);
    let col = text[span.start..pos.max(span.start)].width();
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span() {
        let text = "first\nsecond line\r\nthird";
        assert_eq!(line_span(text, 0).slice(text), "first");
        assert_eq!(line_span(text, 5).slice(text), "first");
        assert_eq!(line_span(text, 8).slice(text), "second line");
        assert_eq!(line_span(text, text.len()).slice(text), "third");
    }

    #[test]
    fn test_line_span_empty_text() {
        assert_eq!(line_span("", 10), Span::new(0, 0));
    }

    #[test]
    fn test_floor_char_boundary() {
        let text = "café";
        // 'é' occupies bytes 3..5
        assert_eq!(floor_char_boundary(text, 4), 3);
        assert_eq!(floor_char_boundary(text, 3), 3);
        assert_eq!(floor_char_boundary(text, 99), text.len());
    }

    #[test]
    fn test_offset_at() {
        let text = "ab\n你好x";
        assert_eq!(offset_at(text, 0, 1), Some(1));
        // Each CJK char is two columns wide and three bytes long
        assert_eq!(offset_at(text, 1, 2), Some(6));
        assert_eq!(offset_at(text, 1, 4), Some(9));
        assert_eq!(offset_at(text, 1, 40), Some(text.len()));
        assert_eq!(offset_at(text, 5, 0), None);
    }

    #[test]
    fn test_position_of() {
        let text = "ab\n你好x";
        assert_eq!(position_of(text, 1), (0, 1));
        assert_eq!(position_of(text, 9), (1, 4));
    }
}
