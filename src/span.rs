//! Byte spans into a text buffer
//!
//! Every operation in this crate reports positions as `Span`s. Hosts that
//! keep ranges as two-element arrays or tuples convert with `From`/`Into`.

use std::fmt;

/// A half-open byte range `[start, end)` within a text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span, normalising reversed bounds
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// An empty span at `pos`
    pub fn empty(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Check if this span contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Check if `pos` lies strictly between the bounds
    pub fn surrounds(&self, pos: usize) -> bool {
        pos > self.start && pos < self.end
    }

    /// Check if `other` lies fully within this span
    pub fn covers(&self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Get the length of this span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Move the span right by `offset` bytes
    pub fn shift(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// The text this span covers, or "" if it falls outside `text`
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }

    /// Shrink the span so it excludes leading and trailing ASCII whitespace
    pub fn trim(self, text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut start = self.start.min(bytes.len());
        let mut end = self.end.min(bytes.len());
        while start < end && bytes[start].is_ascii_whitespace() {
            start += 1;
        }
        while end > start && bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        Self { start, end }
    }
}

impl From<[usize; 2]> for Span {
    fn from(range: [usize; 2]) -> Self {
        Span::new(range[0], range[1])
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Span::new(start, end)
    }
}

impl From<Span> for [usize; 2] {
    fn from(span: Span) -> Self {
        [span.start, span.end]
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.start, span.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let span = Span::new(5, 10);
        assert!(!span.contains(4));
        assert!(span.contains(5));
        assert!(span.contains(9));
        assert!(!span.contains(10));
        assert!(!span.surrounds(5));
        assert!(span.surrounds(6));
    }

    #[test]
    fn test_region_round_trip() {
        for (start, end) in [(0, 0), (0, 1), (3, 17), (42, 42), (7, 1000)] {
            let span = Span::from([start, end]);
            let back: [usize; 2] = span.into();
            assert_eq!(back, [start, end]);

            let tuple: (usize, usize) = Span::from((start, end)).into();
            assert_eq!(tuple, (start, end));
        }
    }

    #[test]
    fn test_reversed_range_normalised() {
        let span = Span::from([9, 2]);
        assert_eq!(span, Span::new(2, 9));
        assert!(span.start <= span.end);
    }

    #[test]
    fn test_shift_and_slice() {
        let text = "hello world";
        let span = Span::new(0, 5).shift(6);
        assert_eq!(span.slice(text), "world");
        assert_eq!(Span::new(20, 30).slice(text), "");
    }

    #[test]
    fn test_trim() {
        let text = "a {  color  }";
        let span = Span::new(3, 12).trim(text);
        assert_eq!(span.slice(text), "color");
        assert_eq!(Span::new(3, 5).trim(text), Span::new(5, 5));
    }
}
