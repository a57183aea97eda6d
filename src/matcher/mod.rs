//! Structural matchers for markup and stylesheets
//!
//! Both matchers answer the same three questions about an offset: what is
//! the innermost node around it, and which spans does selection widen or
//! narrow through. `ContentMatcher` picks the implementation for a syntax.

pub mod css;
pub mod html;

pub use css::{CssMatch, CssMatchKind, CssMatcher};
pub use html::{Attribute, HtmlMatcher, MatchedTag};

use crate::span::Span;
use crate::syntax::SyntaxKind;

/// Balancing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Narrow the selection toward the offset
    Inward,
    /// Widen the selection away from the offset
    Outward,
}

/// Shared interface of the tag and CSS matchers
pub trait Matcher {
    type Match;

    /// Innermost node around `pos`
    fn find(&self, code: &str, pos: usize) -> Option<Self::Match>;

    /// Spans around `pos`, widest first, followed by the first-child chain
    fn balanced_inward(&self, code: &str, pos: usize) -> Vec<Span>;

    /// Spans around `pos`, narrowest first
    fn balanced_outward(&self, code: &str, pos: usize) -> Vec<Span>;

    /// Spans for either direction
    fn balanced(&self, code: &str, pos: usize, direction: Direction) -> Vec<Span> {
        match direction {
            Direction::Inward => self.balanced_inward(code, pos),
            Direction::Outward => self.balanced_outward(code, pos),
        }
    }
}

/// Matcher selected by content type
#[derive(Debug, Clone, Copy)]
pub enum ContentMatcher {
    Html(HtmlMatcher),
    Css(CssMatcher),
}

impl ContentMatcher {
    /// Matcher for a syntax kind; `xml` only applies to markup
    pub fn for_kind(kind: SyntaxKind, xml: bool) -> Self {
        match kind {
            SyntaxKind::Markup => ContentMatcher::Html(HtmlMatcher::new(xml)),
            SyntaxKind::Stylesheet => ContentMatcher::Css(CssMatcher),
        }
    }

    pub fn balanced(&self, code: &str, pos: usize, direction: Direction) -> Vec<Span> {
        match self {
            ContentMatcher::Html(matcher) => matcher.balanced(code, pos, direction),
            ContentMatcher::Css(matcher) => matcher.balanced(code, pos, direction),
        }
    }
}

/// Drop consecutive duplicates
pub(crate) fn dedup_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.dedup();
    spans
}
