//! Context resolution
//!
//! Turns an offset in a view into the `SyntaxContext` that drives
//! abbreviation extraction and expansion: the syntax at the offset, its
//! flavour flags, and optionally the enclosing tag or CSS property.

use crate::matcher::{HtmlMatcher, Matcher};
use crate::span::Span;
use crate::syntax::{ScopeView, SyntaxClassifier, SyntaxInfo, SyntaxKind};

/// Prefix that marks abbreviations in JSX, where bare words are identifiers
pub const JSX_PREFIX: &str = "<";

/// Syntax used when the classifier knows nothing about an offset
pub const FALLBACK_SYNTAX: &str = "html";

/// A host view: document text with syntax and scope classification
pub trait View: SyntaxClassifier + ScopeView {}

impl<T: SyntaxClassifier + ScopeView + ?Sized> View for T {}

/// Enclosing HTML/XML element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagContext {
    pub name: String,
    /// Attributes in source order, values unquoted
    pub attributes: Vec<(String, Option<String>)>,
    pub open: Span,
    pub close: Option<Span>,
}

impl TagContext {
    /// Value of an attribute; None if absent, Some(None) if valueless
    pub fn attribute(&self, name: &str) -> Option<Option<&str>> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref())
    }
}

/// Enclosing CSS property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyContext {
    pub name: String,
}

/// Semantic context around the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorContext {
    Tag(TagContext),
    Property(PropertyContext),
}

/// Everything the extractor and the expansion engine need to know about an offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxContext {
    pub kind: SyntaxKind,
    pub syntax: String,
    pub inline: bool,
    pub jsx: bool,
    pub xml: bool,
    /// Required abbreviation prefix
    pub prefix: Option<String>,
    /// Allow the token scanner to step over auto-closed characters
    pub look_ahead: bool,
    pub context: Option<EditorContext>,
}

impl SyntaxContext {
    /// Context for a syntax with default options
    pub fn new(syntax: &str, kind: SyntaxKind) -> Self {
        Self {
            kind,
            syntax: syntax.to_string(),
            inline: false,
            jsx: false,
            xml: false,
            prefix: None,
            look_ahead: true,
            context: None,
        }
    }

    fn from_info(info: &SyntaxInfo) -> Self {
        Self {
            inline: info.inline,
            xml: info.xml,
            ..Self::new(&info.syntax, info.kind)
        }
    }
}

impl Default for SyntaxContext {
    fn default() -> Self {
        Self::new(FALLBACK_SYNTAX, SyntaxKind::Markup)
    }
}

/// Resolve the syntax context at `pos`
///
/// With `with_context`, also attaches the enclosing CSS property (for
/// stylesheets) or tag (for HTML-flavoured markup).
pub fn resolve<V: View + ?Sized>(view: &V, pos: usize, with_context: bool) -> SyntaxContext {
    let info = view.classify(pos).unwrap_or_else(|| SyntaxInfo {
        syntax: FALLBACK_SYNTAX.to_string(),
        kind: SyntaxKind::Markup,
        html: true,
        xml: false,
        jsx: false,
        inline: false,
    });

    let mut ctx = SyntaxContext::from_info(&info);

    if with_context {
        ctx.context = match info.kind {
            SyntaxKind::Stylesheet => css_context(view, pos).map(EditorContext::Property),
            SyntaxKind::Markup if info.html => {
                tag_context(view.text(), pos, info.xml).map(EditorContext::Tag)
            }
            SyntaxKind::Markup => None,
        };
    }

    if info.jsx {
        ctx.prefix = Some(JSX_PREFIX.to_string());
        ctx.jsx = true;
    }

    ctx
}

/// Name of the CSS property whose value contains `pos`
pub fn css_context<V: ScopeView + ?Sized>(view: &V, pos: usize) -> Option<PropertyContext> {
    if !view.match_selector(pos, "meta.property-value") {
        return None;
    }

    // Walk back scope by scope until the property name or a boundary
    let mut scope = view.extract_scope(pos);
    while scope.start > 0 {
        let probe = scope.start - 1;
        if view.match_selector(probe, "section.property-list")
            || view.match_selector(probe, "meta.selector")
        {
            break;
        }
        scope = view.extract_scope(probe);
        if view.match_selector(probe, "meta.property-name") {
            return Some(PropertyContext {
                name: view.substr(scope).to_string(),
            });
        }
        // Scope regions always start at or before the probe
        scope.start = scope.start.min(probe);
    }
    None
}

/// Element enclosing `pos` in markup `code`
pub fn tag_context(code: &str, pos: usize, xml: bool) -> Option<TagContext> {
    let matched = HtmlMatcher::new(xml).find(code, pos)?;

    let mut attributes: Vec<(String, Option<String>)> = Vec::new();
    for attr in matched.attributes {
        let value = attr.value.as_deref().map(unquote);
        match attributes.iter_mut().find(|(name, _)| *name == attr.name) {
            Some(existing) => existing.1 = value,
            None => attributes.push((attr.name, value)),
        }
    }

    Some(TagContext {
        name: matched.name,
        attributes,
        open: matched.open,
        close: matched.close,
    })
}

/// Strip one matching quote from each end of an attribute value
pub fn unquote(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let rest = chars.as_str();
            rest.strip_suffix(q).unwrap_or(rest).to_string()
        }
        _ => value.to_string(),
    }
}
