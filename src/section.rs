//! CSS section lookup

use crate::matcher::css::{self, CssNode};
use crate::span::Span;
use crate::text;

/// A declaration inside a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssProperty {
    pub name: Span,
    pub value: Span,
    /// Value split into words, function calls and strings
    pub value_tokens: Vec<Span>,
}

/// The rule enclosing an offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSection {
    /// Selector start to closing brace
    pub span: Span,
    /// Content between the braces
    pub body: Span,
    /// Direct declarations, when requested
    pub properties: Option<Vec<CssProperty>>,
}

/// Innermost rule containing `pos`
///
/// With `properties`, the rule's own declarations are included; those of
/// nested rules are not.
pub fn css_section(code: &str, pos: usize, properties: bool) -> Option<CssSection> {
    let pos = text::clamp_offset(code, pos);
    let tree = css::parse(code);
    let idx = tree.enclosing_rules(pos).first().copied()?;
    let rule = &tree.rules[idx];

    let properties = properties.then(|| {
        tree.children(Some(idx))
            .into_iter()
            .filter_map(|node| match node {
                CssNode::Declaration(d) => Some(&tree.declarations[d]),
                CssNode::Rule(_) => None,
            })
            .map(|decl| CssProperty {
                name: decl.name,
                value: decl.value,
                value_tokens: css::split_value(code, decl.value),
            })
            .collect()
    });

    Some(CssSection {
        span: rule.span,
        body: rule.body,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_span() {
        let code = "a { color: red }\nb { margin: 0 }";
        let pos = code.find("margin").unwrap();
        let section = css_section(code, pos, false).unwrap();
        assert_eq!(section.span.slice(code), "b { margin: 0 }");
        assert_eq!(section.body.slice(code), " margin: 0 ");
        assert_eq!(section.properties, None);
    }

    #[test]
    fn test_section_properties() {
        let code = "p { margin: 0 auto; font: 12px/1.5 \"A B\", serif }";
        let section = css_section(code, 5, true).unwrap();
        let props = section.properties.unwrap();
        assert_eq!(props.len(), 2);

        assert_eq!(props[0].name.slice(code), "margin");
        assert_eq!(props[0].value.slice(code), "0 auto");
        let tokens: Vec<_> = props[1].value_tokens.iter().map(|s| s.slice(code)).collect();
        assert_eq!(tokens, vec!["12px", "1.5", "\"A B\"", "serif"]);
    }

    #[test]
    fn test_innermost_rule_only() {
        let code = ".a { color: red; .b { top: 0 } }";
        let pos = code.find("top").unwrap();
        let section = css_section(code, pos, true).unwrap();
        assert_eq!(section.span.slice(code), ".b { top: 0 }");

        let section = css_section(code, 1, true).unwrap();
        let names: Vec<_> = section
            .properties
            .unwrap()
            .iter()
            .map(|p| p.name.slice(code))
            .collect();
        assert_eq!(names, vec!["color"]);
    }

    #[test]
    fn test_edges_are_inside() {
        let code = "a { }";
        assert!(css_section(code, 0, false).is_some());
        assert!(css_section(code, code.len(), false).is_some());
    }

    #[test]
    fn test_no_section() {
        assert_eq!(css_section("a { }\n\nb { }", 6, false), None);
        assert_eq!(css_section("", 0, true), None);
    }
}
