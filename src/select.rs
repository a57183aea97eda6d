//! Next/previous item selection
//!
//! An item is an HTML open tag or a CSS selector/declaration. The model
//! lists the spans inside the item that a host steps through: for a tag its
//! name and attributes, for a declaration the property and its value.

use crate::matcher::css::{self, CssNode};
use crate::matcher::html::{self, TagKind};
use crate::span::Span;
use crate::text;

/// Spans of one selectable item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItemModel {
    pub start: usize,
    pub end: usize,
    pub ranges: Vec<Span>,
}

impl SelectItemModel {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// The item after (or before, with `is_previous`) `pos`
pub fn select_item(
    code: &str,
    pos: usize,
    is_css: bool,
    is_previous: bool,
) -> Option<SelectItemModel> {
    let pos = text::clamp_offset(code, pos);
    if is_css {
        select_css_item(code, pos, is_previous)
    } else {
        select_html_item(code, pos, is_previous)
    }
}

fn select_html_item(code: &str, pos: usize, is_previous: bool) -> Option<SelectItemModel> {
    let tags = html::scan_tags(code, false);
    let mut candidates = tags
        .iter()
        .filter(|tag| matches!(tag.kind, TagKind::Open | TagKind::SelfClose));
    let tag = if is_previous {
        candidates.filter(|tag| tag.span.start < pos).last()?
    } else {
        candidates.find(|tag| tag.span.end > pos)?
    };

    let name_start = tag.span.start + 1;
    let mut ranges = vec![Span::new(name_start, name_start + tag.name.len())];

    for attr in html::attributes(code, tag.span) {
        let full_end = attr.value_span.map_or(attr.name_span.end, |v| v.end);
        ranges.push(Span::new(attr.name_span.start, full_end));

        let Some(value) = attr.unquoted_value_span(code) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        ranges.push(value);

        if attr.name.eq_ignore_ascii_case("class") {
            let classes = words(code, value);
            if classes.len() > 1 {
                ranges.extend(classes);
            }
        }
    }

    Some(SelectItemModel {
        start: tag.span.start,
        end: tag.span.end,
        ranges,
    })
}

fn select_css_item(code: &str, pos: usize, is_previous: bool) -> Option<SelectItemModel> {
    let tree = css::parse(code);
    let item_span = |node: CssNode| match node {
        CssNode::Rule(idx) => tree.rules[idx].selector.trim(code),
        CssNode::Declaration(idx) => tree.declarations[idx].span,
    };

    let items = tree.items();
    let node = if is_previous {
        items
            .into_iter()
            .filter(|&node| item_span(node).start < pos)
            .last()?
    } else {
        items
            .into_iter()
            .find(|&node| item_span(node).end > pos)?
    };

    let span = item_span(node);
    let ranges = match node {
        CssNode::Rule(_) => vec![span],
        CssNode::Declaration(idx) => {
            let decl = &tree.declarations[idx];
            let mut ranges = vec![span, decl.value];
            let tokens = css::split_value(code, decl.value);
            if tokens.len() > 1 {
                ranges.extend(tokens);
            }
            ranges
        }
    };

    Some(SelectItemModel {
        start: span.start,
        end: span.end,
        ranges,
    })
}

/// Whitespace-separated words of `span`
fn words(code: &str, span: Span) -> Vec<Span> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, b) in span.slice(code).bytes().enumerate() {
        match (b.is_ascii_whitespace(), start) {
            (true, Some(s)) => {
                words.push(Span::new(span.start + s, span.start + i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push(Span::new(span.start + s, span.end));
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(code: &'a str, model: &SelectItemModel) -> Vec<&'a str> {
        model.ranges.iter().map(|s| s.slice(code)).collect()
    }

    #[test]
    fn test_next_tag() {
        let code = "<div class=\"a b\" id=x hidden>text</div><br/>";
        let model = select_item(code, 0, false, false).unwrap();

        assert_eq!(model.span().slice(code), "<div class=\"a b\" id=x hidden>");
        assert_eq!(
            texts(code, &model),
            vec!["div", "class=\"a b\"", "a b", "a", "b", "id=x", "x", "hidden"]
        );

        let pos = code.find("text").unwrap();
        let model = select_item(code, pos, false, false).unwrap();
        assert_eq!(texts(code, &model), vec!["br"]);
    }

    #[test]
    fn test_previous_tag() {
        let code = "<p title=''>a</p><i>b</i>";
        let pos = code.find("<i>").unwrap();
        let model = select_item(code, pos, false, true).unwrap();
        // Empty values are not offered as a separate range
        assert_eq!(texts(code, &model), vec!["p", "title=''"]);

        assert_eq!(select_item(code, 0, false, true), None);
    }

    #[test]
    fn test_single_class_has_no_word_ranges() {
        let code = "<a class=\"only\">";
        let model = select_item(code, 0, false, false).unwrap();
        assert_eq!(texts(code, &model), vec!["a", "class=\"only\"", "only"]);
    }

    #[test]
    fn test_next_css_items() {
        let code = "a { margin: 0 auto; color: red; }";

        let model = select_item(code, 0, true, false).unwrap();
        assert_eq!(texts(code, &model), vec!["a"]);

        let model = select_item(code, 1, true, false).unwrap();
        assert_eq!(
            texts(code, &model),
            vec!["margin: 0 auto;", "0 auto", "0", "auto"]
        );

        let pos = code.find("color").unwrap();
        let model = select_item(code, pos, true, false).unwrap();
        assert_eq!(texts(code, &model), vec!["color: red;", "red"]);
    }

    #[test]
    fn test_previous_css_item() {
        let code = "a { margin: 0; }\nb { }";
        let pos = code.find('b').unwrap();
        let model = select_item(code, pos, true, true).unwrap();
        assert_eq!(texts(code, &model), vec!["margin: 0;", "0"]);

        assert_eq!(select_item(code, code.len(), true, false), None);
    }

    #[test]
    fn test_words() {
        let code = " a  bc ";
        let spans: Vec<_> = words(code, Span::new(0, code.len()))
            .into_iter()
            .map(|s| s.slice(code))
            .collect();
        assert_eq!(spans, vec!["a", "bc"]);
    }
}
