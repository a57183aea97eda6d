//! Scope selectors
//!
//! A scope is a space-separated stack of dotted names, outermost first:
//! `source.css meta.declaration.css meta.property-value.css`. A selector
//! atom such as `meta.property-value` matches any scope name that equals it
//! or extends it with further dotted segments. Space-separated atoms form a
//! descendant path and commas separate alternatives.

use crate::span::Span;

/// A parsed scope selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSelector {
    alternatives: Vec<Vec<String>>,
}

impl ScopeSelector {
    /// Parse a selector expression like `meta.selector, section.property-list`
    pub fn parse(selector: &str) -> Self {
        let alternatives = selector
            .split(',')
            .map(|alt| alt.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|path| !path.is_empty())
            .collect();
        Self { alternatives }
    }

    /// Check if a scope stack matches this selector
    pub fn matches(&self, scope: &str) -> bool {
        let names: Vec<&str> = scope.split_whitespace().collect();
        self.alternatives
            .iter()
            .any(|path| path_matches(path, &names))
    }
}

/// Every atom of `path` must match a scope name, in order
fn path_matches(path: &[String], names: &[&str]) -> bool {
    let mut next = 0;
    for atom in path {
        match names[next..].iter().position(|name| atom_matches(name, atom)) {
            Some(idx) => next += idx + 1,
            None => return false,
        }
    }
    true
}

fn atom_matches(name: &str, atom: &str) -> bool {
    name == atom
        || (name.starts_with(atom) && name.as_bytes().get(atom.len()) == Some(&b'.'))
}

/// Scope-level view of a document
///
/// This is the part of an editor view the CSS context walk needs.
pub trait ScopeView {
    /// Full document text
    fn text(&self) -> &str;

    /// Scope stack of the character at `pos`
    fn scope_name(&self, pos: usize) -> String;

    /// Extent of the scope region containing `pos`
    fn extract_scope(&self, pos: usize) -> Span;

    /// Check if the scope at `pos` matches `selector`
    fn match_selector(&self, pos: usize, selector: &str) -> bool {
        ScopeSelector::parse(selector).matches(&self.scope_name(pos))
    }

    /// Text covered by `span`
    fn substr(&self, span: Span) -> &str {
        span.slice(self.text())
    }
}
