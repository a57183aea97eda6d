//! In-memory document view
//!
//! `Document` plays the role of the editor view: it owns the text, knows its
//! base syntax, reports embedded CSS inside HTML (`<style>` bodies and
//! `style` attribute values) and assigns scope names to CSS text so that the
//! property-name walk in `context` can run without an editor.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::matcher::css::{self, CssTree};
use crate::matcher::html;
use crate::span::Span;
use crate::syntax::{
    ScopeView, SyntaxClassifier, SyntaxDefinition, SyntaxInfo, SyntaxKind, SyntaxRegistry,
};
use crate::text;

/// CSS embedded in markup
#[derive(Debug, Clone, PartialEq, Eq)]
struct CssRegion {
    span: Span,
    /// A `style` attribute value rather than a `<style>` element
    inline: bool,
}

/// A run of text with a single scope stack
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScopeToken {
    span: Span,
    scope: String,
}

/// An open document with its syntax
pub struct Document {
    text: String,
    syntax: SyntaxDefinition,
    css_syntax: SyntaxDefinition,
    regions: Vec<CssRegion>,
    /// Scope tokens ordered by start offset
    tokens: Vec<ScopeToken>,
    /// Rule bodies, for scoping whitespace between declarations
    bodies: Vec<Span>,
}

impl Document {
    /// Create a document from text and its syntax
    pub fn new(text: impl Into<String>, syntax: SyntaxDefinition) -> Self {
        let mut doc = Self {
            text: text.into(),
            syntax,
            css_syntax: SyntaxDefinition::new("css", SyntaxKind::Stylesheet),
            regions: Vec::new(),
            tokens: Vec::new(),
            bodies: Vec::new(),
        };
        doc.index();
        doc
    }

    /// Create a document using a syntax from `registry`, falling back to HTML
    pub fn with_syntax_name(text: impl Into<String>, name: &str, registry: &SyntaxRegistry) -> Self {
        let syntax = registry
            .get(name)
            .cloned()
            .unwrap_or_else(|| fallback_syntax(registry));
        Self::new(text, syntax)
    }

    /// Read a file, detecting its syntax from the extension
    pub fn open(path: &Path, registry: &SyntaxRegistry) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let syntax = registry
            .detect(path)
            .cloned()
            .unwrap_or_else(|| fallback_syntax(registry));
        debug!("opened {} as {}", path.display(), syntax.name);
        Ok(Self::new(text, syntax))
    }

    /// Base syntax of the document
    pub fn syntax(&self) -> &SyntaxDefinition {
        &self.syntax
    }

    fn base_scope(&self) -> String {
        match self.syntax.kind {
            SyntaxKind::Stylesheet => format!("source.{}", self.syntax.name),
            SyntaxKind::Markup if self.syntax.name == "html" => "text.html.basic".to_string(),
            SyntaxKind::Markup => format!("text.{}", self.syntax.name),
        }
    }

    /// Locate CSS and compute scope tokens
    fn index(&mut self) {
        match self.syntax.kind {
            SyntaxKind::Stylesheet => {
                let tree = css::parse(&self.text);
                let base = self.base_scope();
                self.add_css_scopes(&tree, &base);
            }
            SyntaxKind::Markup if self.syntax.html && !self.syntax.xml && !self.syntax.jsx => {
                self.regions = embedded_css(&self.text);
                let base = format!("{} source.css.embedded.html", self.base_scope());
                for region in self.regions.clone() {
                    let tree = css::parse_region(&self.text, region.span, region.inline);
                    self.add_css_scopes(&tree, &base);
                }
            }
            SyntaxKind::Markup => {}
        }
        self.tokens.sort_by_key(|t| (t.span.start, std::cmp::Reverse(t.span.end)));
    }

    fn add_css_scopes(&mut self, tree: &CssTree, base: &str) {
        let mut push = |span: Span, scope: &str| {
            if !span.is_empty() {
                self.tokens.push(ScopeToken {
                    span,
                    scope: format!("{} {}", base, scope),
                });
            }
        };

        for &comment in &tree.comments {
            push(comment, "comment.block.css");
        }

        for rule in &tree.rules {
            push(rule.selector, "meta.selector.css");
            push(
                Span::new(rule.body.start - 1, rule.body.start),
                "section.property-list.css punctuation.section.property-list.begin.css",
            );
            if rule.closed {
                push(
                    Span::new(rule.body.end, rule.body.end + 1),
                    "section.property-list.css punctuation.section.property-list.end.css",
                );
            }
        }

        for decl in &tree.declarations {
            push(decl.name, "meta.declaration.css meta.property-name.css");
            let value_end = decl.terminator.unwrap_or(decl.value.end);
            match decl.colon {
                Some(colon) => {
                    push(Span::new(decl.name.end, colon), "meta.declaration.css");
                    push(
                        Span::new(colon, colon + 1),
                        "meta.declaration.css meta.property-value.css punctuation.separator.key-value.css",
                    );
                    push(
                        Span::new(colon + 1, value_end),
                        "meta.declaration.css meta.property-value.css",
                    );
                }
                None => push(
                    Span::new(decl.value.start, value_end),
                    "meta.declaration.css meta.property-value.css",
                ),
            }
            if let Some(t) = decl.terminator {
                push(
                    Span::new(t, t + 1),
                    "meta.declaration.css meta.property-value.css punctuation.terminator.rule.css",
                );
            }
        }

        self.bodies.extend(tree.rules.iter().map(|rule| rule.body));
    }

    /// Innermost token containing `pos`
    fn token_at(&self, pos: usize) -> Option<&ScopeToken> {
        self.tokens
            .iter()
            .filter(|t| t.span.contains(pos))
            .min_by_key(|t| t.span.len())
    }

    fn region_at(&self, pos: usize) -> Option<&CssRegion> {
        self.regions
            .iter()
            .find(|r| r.span.start <= pos && pos <= r.span.end)
    }
}

impl SyntaxClassifier for Document {
    fn classify(&self, pos: usize) -> Option<SyntaxInfo> {
        let pos = text::clamp_offset(&self.text, pos);
        match self.region_at(pos) {
            Some(region) => Some(self.css_syntax.info(region.inline)),
            None => Some(self.syntax.info(false)),
        }
    }
}

impl ScopeView for Document {
    fn text(&self) -> &str {
        &self.text
    }

    fn scope_name(&self, pos: usize) -> String {
        if let Some(token) = self.token_at(pos) {
            return token.scope.clone();
        }

        let in_body = self.bodies.iter().any(|b| b.contains(pos));
        let embedded = self.region_at(pos).is_some();
        match (self.syntax.kind, embedded, in_body) {
            (SyntaxKind::Stylesheet, _, true) => {
                format!("{} section.property-list.css", self.base_scope())
            }
            (SyntaxKind::Markup, true, true) => format!(
                "{} source.css.embedded.html section.property-list.css",
                self.base_scope()
            ),
            (SyntaxKind::Markup, true, false) => {
                format!("{} source.css.embedded.html", self.base_scope())
            }
            _ => self.base_scope(),
        }
    }

    fn extract_scope(&self, pos: usize) -> Span {
        if let Some(token) = self.token_at(pos) {
            return token.span;
        }
        let start = self
            .tokens
            .iter()
            .map(|t| t.span.end)
            .filter(|&end| end <= pos)
            .max()
            .unwrap_or(0);
        let end = self
            .tokens
            .iter()
            .map(|t| t.span.start)
            .filter(|&start| start > pos)
            .min()
            .unwrap_or(self.text.len());
        Span::new(start, end.max(start))
    }
}

fn fallback_syntax(registry: &SyntaxRegistry) -> SyntaxDefinition {
    registry
        .get("html")
        .cloned()
        .unwrap_or_else(|| SyntaxDefinition::new("html", SyntaxKind::Markup).with_html())
}

/// `<style>` bodies and quoted `style` attribute values
fn embedded_css(code: &str) -> Vec<CssRegion> {
    let mut regions = Vec::new();
    for element in html::elements(code, false) {
        if element.name.eq_ignore_ascii_case("style") {
            if let Some(inner) = element.inner() {
                regions.push(CssRegion {
                    span: inner,
                    inline: false,
                });
            }
        }
        for attr in html::attributes(code, element.open) {
            if !attr.name.eq_ignore_ascii_case("style") {
                continue;
            }
            let quoted = attr
                .value
                .as_deref()
                .is_some_and(|v| v.starts_with('"') || v.starts_with('\''));
            if let (true, Some(span)) = (quoted, attr.unquoted_value_span(code)) {
                regions.push(CssRegion { span, inline: true });
            }
        }
    }
    regions.sort_by_key(|r| r.span.start);
    regions
}
