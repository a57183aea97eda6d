//! Expand/shrink selection by structure

use crate::matcher::{ContentMatcher, CssMatcher, Direction, HtmlMatcher, Matcher};
use crate::span::Span;
use crate::syntax::SyntaxKind;
use crate::text;

/// Tag spans around `pos` in markup
///
/// Outward lists spans narrowest to widest; inward lists them widest to
/// narrowest and continues into the first child after `pos`.
pub fn balance(code: &str, pos: usize, direction: Direction, xml: bool) -> Vec<Span> {
    HtmlMatcher::new(xml).balanced(code, text::clamp_offset(code, pos), direction)
}

/// Rule and declaration spans around `pos` in a stylesheet
pub fn balance_css(code: &str, pos: usize, direction: Direction) -> Vec<Span> {
    CssMatcher.balanced(code, text::clamp_offset(code, pos), direction)
}

/// Balance with the matcher for a syntax kind
pub fn balance_for(
    kind: SyntaxKind,
    xml: bool,
    code: &str,
    pos: usize,
    direction: Direction,
) -> Vec<Span> {
    ContentMatcher::for_kind(kind, xml).balanced(code, text::clamp_offset(code, pos), direction)
}
