//! Stylesheet structure scanning
//!
//! `parse` splits CSS-like text into rules (selector + braced body) and
//! declarations (`name: value;`). It is tolerant: unclosed rules run to the
//! end of the scanned region and stray closing braces are ignored. Nested
//! rules (SCSS, LESS, `@media`) are tracked through a stack.

use crate::span::Span;

use super::{dedup_spans, Matcher};

/// A rule: selector or at-rule prelude followed by a braced body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: Span,
    /// Content between the braces
    pub body: Span,
    /// Selector start to closing brace (inclusive)
    pub span: Span,
    /// Whether the closing brace was found
    pub closed: bool,
    pub parent: Option<usize>,
}

/// A `name: value` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssDeclaration {
    pub name: Span,
    pub value: Span,
    /// Name start to terminating `;` (inclusive) or value end
    pub span: Span,
    /// Offset of the `:` separator
    pub colon: Option<usize>,
    /// Offset of the terminating `;`
    pub terminator: Option<usize>,
    /// Index of the enclosing rule
    pub parent: Option<usize>,
}

/// Rules, declarations and comments of a stylesheet, in document order
#[derive(Debug, Clone, Default)]
pub struct CssTree {
    pub rules: Vec<CssRule>,
    pub declarations: Vec<CssDeclaration>,
    pub comments: Vec<Span>,
}

/// A node of the tree, by index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssNode {
    Rule(usize),
    Declaration(usize),
}

impl CssTree {
    /// Span of a node
    pub fn span(&self, node: CssNode) -> Span {
        match node {
            CssNode::Rule(idx) => self.rules[idx].span,
            CssNode::Declaration(idx) => self.declarations[idx].span,
        }
    }

    /// Rules containing `pos`, innermost first
    pub fn enclosing_rules(&self, pos: usize) -> Vec<usize> {
        let mut found: Vec<usize> = (0..self.rules.len())
            .filter(|&idx| {
                let span = self.rules[idx].span;
                span.start <= pos && pos <= span.end
            })
            .collect();
        found.sort_by_key(|&idx| self.rules[idx].span.len());
        found
    }

    /// Declaration containing `pos`, if any
    pub fn declaration_at(&self, pos: usize) -> Option<usize> {
        self.declarations
            .iter()
            .position(|decl| decl.span.start <= pos && pos <= decl.span.end)
    }

    /// Selectors and declarations in document order
    pub fn items(&self) -> Vec<CssNode> {
        let mut items: Vec<CssNode> = (0..self.rules.len())
            .map(CssNode::Rule)
            .chain((0..self.declarations.len()).map(CssNode::Declaration))
            .collect();
        items.sort_by_key(|&node| self.span(node).start);
        items
    }

    /// Direct children of a rule (or top-level nodes for `None`), in order
    pub fn children(&self, parent: Option<usize>) -> Vec<CssNode> {
        self.items()
            .into_iter()
            .filter(|&node| match node {
                CssNode::Rule(idx) => self.rules[idx].parent == parent,
                CssNode::Declaration(idx) => self.declarations[idx].parent == parent,
            })
            .collect()
    }
}

/// Parse `code` as a stylesheet
pub fn parse(code: &str) -> CssTree {
    parse_region(code, Span::new(0, code.len()), false)
}

/// Parse `region` of `code`
///
/// With `inline`, the region is a bare declaration list such as the value
/// of an HTML `style` attribute.
pub fn parse_region(code: &str, region: Span, inline: bool) -> CssTree {
    let mut parser = Parser {
        code,
        tree: CssTree::default(),
        stack: Vec::new(),
        pending: None,
        colon: None,
    };
    parser.run(region, inline);
    parser.tree
}

struct Parser<'a> {
    code: &'a str,
    tree: CssTree,
    /// Open rules, innermost last
    stack: Vec<usize>,
    /// Start of the current selector or declaration
    pending: Option<usize>,
    colon: Option<usize>,
}

impl Parser<'_> {
    fn run(&mut self, region: Span, inline: bool) {
        let bytes = self.code.as_bytes();
        let end = region.end.min(bytes.len());
        let mut depth = 0usize;
        let mut i = region.start;

        while i < end {
            let b = bytes[i];

            if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
                let close = find(bytes, i + 2, end, b"*/").map_or(end, |p| p + 2);
                self.tree.comments.push(Span::new(i, close));
                i = close;
                continue;
            }

            if b == b'"' || b == b'\'' {
                self.pending.get_or_insert(i);
                i = skip_string(bytes, i, end);
                continue;
            }

            if b.is_ascii_whitespace() {
                i += 1;
                continue;
            }

            match b {
                b'(' => {
                    self.pending.get_or_insert(i);
                    depth += 1;
                }
                b')' => depth = depth.saturating_sub(1),
                b':' if depth == 0 => {
                    let start = *self.pending.get_or_insert(i);
                    // `:root {` starts with a colon; it is a selector, not a separator
                    if self.colon.is_none() && start < i {
                        self.colon = Some(i);
                    }
                }
                b';' if depth == 0 => {
                    if let Some(start) = self.pending {
                        self.declaration(start, i, Some(i));
                    }
                    self.reset();
                }
                b'{' if depth == 0 => {
                    self.open_rule(i);
                    self.reset();
                }
                b'}' if depth == 0 => {
                    if let Some(start) = self.pending {
                        self.declaration(start, i, None);
                    }
                    self.reset();
                    if let Some(idx) = self.stack.pop() {
                        let rule = &mut self.tree.rules[idx];
                        rule.body.end = i;
                        rule.span.end = i + 1;
                        rule.closed = true;
                    }
                }
                _ => {
                    self.pending.get_or_insert(i);
                }
            }
            i += 1;
        }

        if let Some(start) = self.pending {
            if inline || !self.stack.is_empty() {
                self.declaration(start, end, None);
            }
        }
        for idx in self.stack.drain(..) {
            let rule = &mut self.tree.rules[idx];
            rule.body.end = end;
            rule.span.end = end;
        }
    }

    fn reset(&mut self) {
        self.pending = None;
        self.colon = None;
    }

    fn open_rule(&mut self, brace: usize) {
        let selector = Span::new(self.pending.unwrap_or(brace), brace).trim(self.code);
        let idx = self.tree.rules.len();
        self.tree.rules.push(CssRule {
            selector,
            body: Span::new(brace + 1, brace + 1),
            span: Span::new(selector.start, brace + 1),
            closed: false,
            parent: self.stack.last().copied(),
        });
        self.stack.push(idx);
    }

    fn declaration(&mut self, start: usize, end: usize, terminator: Option<usize>) {
        let content = Span::new(start, end).trim(self.code);
        if content.is_empty() {
            return;
        }

        let (name, value) = match self.colon {
            Some(colon) => (
                Span::new(start, colon).trim(self.code),
                Span::new(colon + 1, content.end).trim(self.code),
            ),
            None => {
                // At-rules without a body (`@import url(a.css)`) split on the first space
                let text = content.slice(self.code);
                match text.find(|c: char| c.is_ascii_whitespace()) {
                    Some(ws) if text.starts_with('@') => (
                        Span::new(content.start, content.start + ws),
                        Span::new(content.start + ws, content.end).trim(self.code),
                    ),
                    _ => (content, Span::empty(content.end)),
                }
            }
        };

        let span_end = terminator.map_or(content.end, |t| t + 1);
        self.tree.declarations.push(CssDeclaration {
            name,
            value,
            span: Span::new(content.start, span_end),
            colon: self.colon,
            terminator,
            parent: self.stack.last().copied(),
        });
    }
}

/// Offset just past the string starting at `start`, honouring escapes
fn skip_string(bytes: &[u8], start: usize, end: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    end
}

fn find(bytes: &[u8], from: usize, end: usize, needle: &[u8]) -> Option<usize> {
    if from >= end {
        return None;
    }
    bytes[from..end]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// Split a property value into tokens
///
/// Tokens are separated by whitespace, `,` and `/`; function calls and
/// quoted strings stay whole.
pub fn split_value(code: &str, value: Span) -> Vec<Span> {
    let bytes = code.as_bytes();
    let end = value.end.min(bytes.len());
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;
    let mut depth = 0usize;
    let mut i = value.start;

    while i < end {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            token_start.get_or_insert(i);
            i = skip_string(bytes, i, end);
            continue;
        }
        match b {
            b'(' => {
                token_start.get_or_insert(i);
                depth += 1;
            }
            b')' => depth = depth.saturating_sub(1),
            b',' | b'/' if depth == 0 => {
                if let Some(start) = token_start.take() {
                    tokens.push(Span::new(start, i));
                }
            }
            b if b.is_ascii_whitespace() && depth == 0 => {
                if let Some(start) = token_start.take() {
                    tokens.push(Span::new(start, i));
                }
            }
            _ => {
                token_start.get_or_insert(i);
            }
        }
        i += 1;
    }
    if let Some(start) = token_start {
        tokens.push(Span::new(start, end));
    }
    tokens
}

/// What kind of node `CssMatcher::find` landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssMatchKind {
    Selector,
    Property,
}

/// Innermost rule or declaration around an offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssMatch {
    pub kind: CssMatchKind,
    pub span: Span,
    /// Rule body or declaration value
    pub body: Span,
}

/// Matcher for stylesheet syntaxes
#[derive(Debug, Clone, Copy, Default)]
pub struct CssMatcher;

impl CssMatcher {
    /// Spans of a node, widest first
    fn node_spans(tree: &CssTree, code: &str, node: CssNode) -> Vec<Span> {
        let [outer, inner] = match node {
            CssNode::Rule(idx) => {
                let rule = &tree.rules[idx];
                [rule.span, rule.body.trim(code)]
            }
            CssNode::Declaration(idx) => {
                let decl = &tree.declarations[idx];
                [decl.span, decl.value]
            }
        };
        if inner.is_empty() {
            vec![outer]
        } else {
            vec![outer, inner]
        }
    }
}

impl Matcher for CssMatcher {
    type Match = CssMatch;

    fn find(&self, code: &str, pos: usize) -> Option<CssMatch> {
        let tree = parse(code);
        let rule = tree.enclosing_rules(pos).first().map(|&idx| &tree.rules[idx]);
        let decl = tree.declaration_at(pos).map(|idx| &tree.declarations[idx]);

        match (decl, rule) {
            (Some(decl), Some(rule)) if rule.span.len() < decl.span.len() => Some(CssMatch {
                kind: CssMatchKind::Selector,
                span: rule.span,
                body: rule.body,
            }),
            (Some(decl), _) => Some(CssMatch {
                kind: CssMatchKind::Property,
                span: decl.span,
                body: decl.value,
            }),
            (None, Some(rule)) => Some(CssMatch {
                kind: CssMatchKind::Selector,
                span: rule.span,
                body: rule.body,
            }),
            (None, None) => None,
        }
    }

    fn balanced_outward(&self, code: &str, pos: usize) -> Vec<Span> {
        let tree = parse(code);
        let mut spans = Vec::new();

        if let Some(idx) = tree.declaration_at(pos) {
            let decl = &tree.declarations[idx];
            if !decl.value.is_empty() && decl.value.start <= pos && pos <= decl.value.end {
                spans.push(decl.value);
            }
            spans.push(decl.span);
        }
        for idx in tree.enclosing_rules(pos) {
            let rule = &tree.rules[idx];
            let body = rule.body.trim(code);
            if !body.is_empty() && body.start <= pos && pos <= body.end {
                spans.push(body);
            }
            spans.push(rule.span);
        }
        dedup_spans(spans)
    }

    fn balanced_inward(&self, code: &str, pos: usize) -> Vec<Span> {
        let tree = parse(code);
        let mut spans = self.balanced_outward(code, pos);
        spans.reverse();

        if tree.declaration_at(pos).is_some() {
            return dedup_spans(spans);
        }

        // Narrow into the first node after the cursor, then its first children
        let mut parent = tree.enclosing_rules(pos).first().copied();
        let mut from = pos;
        while let Some(node) = tree
            .children(parent)
            .into_iter()
            .find(|&node| tree.span(node).start >= from)
        {
            spans.extend(Self::node_spans(&tree, code, node));
            match node {
                CssNode::Rule(idx) => {
                    parent = Some(idx);
                    from = tree.rules[idx].body.start;
                }
                CssNode::Declaration(_) => break,
            }
        }
        dedup_spans(spans)
    }
}
