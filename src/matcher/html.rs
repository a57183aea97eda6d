//! HTML/XML tag matching
//!
//! `scan_tags` walks the document once and reports open, close and
//! self-closing tags. Comments, CDATA, processing instructions and doctypes
//! are skipped, and the contents of `script`/`style` elements are opaque in
//! HTML mode. Pairs are formed with a stack: a closing tag closes the
//! nearest open tag of the same name, discarding unclosed tags above it.

use crate::span::Span;

use super::{dedup_spans, Matcher};

/// HTML elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is not markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClose,
}

/// A single tag found by `scan_tags`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTag<'a> {
    pub name: &'a str,
    pub kind: TagKind,
    pub span: Span,
}

/// An attribute of an open tag, exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Raw value including quotes; None for valueless attributes
    pub value: Option<String>,
    pub name_span: Span,
    pub value_span: Option<Span>,
}

impl Attribute {
    /// Value span without surrounding quotes
    pub fn unquoted_value_span(&self, code: &str) -> Option<Span> {
        let span = self.value_span?;
        let bytes = span.slice(code).as_bytes();
        match bytes.first() {
            Some(&q) if q == b'"' || q == b'\'' => {
                let end = if bytes.len() > 1 && bytes[bytes.len() - 1] == q {
                    span.end - 1
                } else {
                    span.end
                };
                Some(Span::new(span.start + 1, end))
            }
            _ => Some(span),
        }
    }
}

/// An element matched around an offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub open: Span,
    /// None for self-closing and unclosed elements
    pub close: Option<Span>,
}

/// An element assembled from scanned tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    pub name: &'a str,
    pub open: Span,
    pub close: Option<Span>,
}

impl Element<'_> {
    /// Open tag start to close tag end
    pub fn outer(&self) -> Span {
        Span::new(self.open.start, self.close.map_or(self.open.end, |c| c.end))
    }

    /// Content between open and close tags
    pub fn inner(&self) -> Option<Span> {
        self.close.map(|c| Span::new(self.open.end, c.start))
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'.' | b'-')
}

fn names_equal(a: &str, b: &str, xml: bool) -> bool {
    if xml {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

fn is_listed(name: &str, list: &[&str]) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(name))
}

fn find_bytes(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    i
}

/// Offset just past a quoted value or a `{...}` expression starting at `start`
fn skip_value(bytes: &[u8], start: usize) -> usize {
    match bytes[start] {
        q @ (b'"' | b'\'') => find_bytes(bytes, start + 1, &[q]).map_or(bytes.len(), |p| p + 1),
        b'{' => {
            let mut depth = 0usize;
            for (i, &b) in bytes.iter().enumerate().skip(start) {
                match b {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            return i + 1;
                        }
                    }
                    _ => {}
                }
            }
            bytes.len()
        }
        _ => start + 1,
    }
}

/// End of an open tag whose name ends at `from`: (offset past `>`, self-closing)
fn open_tag_end(bytes: &[u8], from: usize) -> Option<(usize, bool)> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some((i + 1, false)),
            b'/' if bytes.get(i + 1) == Some(&b'>') => return Some((i + 2, true)),
            b'"' | b'\'' | b'{' => i = skip_value(bytes, i),
            b'<' => return None,
            _ => i += 1,
        }
    }
    None
}

/// Scan all tags of `code` in document order
pub fn scan_tags(code: &str, xml: bool) -> Vec<ScannedTag<'_>> {
    let bytes = code.as_bytes();
    let len = bytes.len();
    let mut tags = Vec::new();
    let mut i = 0;

    while let Some(lt) = find_bytes(bytes, i, b"<") {
        i = lt;
        let rest = &bytes[i..];

        let skip_to = if rest.starts_with(b"<!--") {
            Some(find_bytes(bytes, i + 4, b"-->").map_or(len, |p| p + 3))
        } else if rest.starts_with(b"<![CDATA[") {
            Some(find_bytes(bytes, i + 9, b"]]>").map_or(len, |p| p + 3))
        } else if rest.starts_with(b"<?") {
            Some(find_bytes(bytes, i + 2, b"?>").map_or(len, |p| p + 2))
        } else if rest.starts_with(b"<!") {
            Some(find_bytes(bytes, i + 2, b">").map_or(len, |p| p + 1))
        } else {
            None
        };
        if let Some(next) = skip_to {
            i = next;
            continue;
        }

        if rest.get(1) == Some(&b'/') && rest.get(2).is_some_and(|&b| is_ident_start(b)) {
            let name_end = ident_end(bytes, i + 2);
            let end = find_bytes(bytes, name_end, b">").map_or(len, |p| p + 1);
            tags.push(ScannedTag {
                name: &code[i + 2..name_end],
                kind: TagKind::Close,
                span: Span::new(i, end),
            });
            i = end;
            continue;
        }

        if rest.get(1).is_some_and(|&b| is_ident_start(b)) {
            let name_end = ident_end(bytes, i + 1);
            let name = &code[i + 1..name_end];
            if let Some((end, self_closing)) = open_tag_end(bytes, name_end) {
                let kind = if self_closing || (!xml && is_listed(name, VOID_ELEMENTS)) {
                    TagKind::SelfClose
                } else {
                    TagKind::Open
                };
                tags.push(ScannedTag {
                    name,
                    kind,
                    span: Span::new(i, end),
                });
                i = end;

                if kind == TagKind::Open && !xml && is_listed(name, RAW_TEXT_ELEMENTS) {
                    // Jump to the matching close tag; everything before it is opaque
                    let needle = format!("</{}", name.to_ascii_lowercase());
                    i = code[i..]
                        .to_ascii_lowercase()
                        .find(&needle)
                        .map_or(len, |p| i + p);
                }
                continue;
            }
        }

        i += 1;
    }

    tags
}

/// Pair scanned tags into elements, ordered by open tag position
///
/// Open tags that are never closed become elements without a close tag.
pub fn elements(code: &str, xml: bool) -> Vec<Element<'_>> {
    let mut elements: Vec<Element<'_>> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for tag in scan_tags(code, xml) {
        match tag.kind {
            TagKind::Open => {
                stack.push(elements.len());
                elements.push(Element {
                    name: tag.name,
                    open: tag.span,
                    close: None,
                });
            }
            TagKind::SelfClose => elements.push(Element {
                name: tag.name,
                open: tag.span,
                close: None,
            }),
            TagKind::Close => {
                let found = stack
                    .iter()
                    .rposition(|&idx| names_equal(elements[idx].name, tag.name, xml));
                if let Some(pos) = found {
                    let idx = stack[pos];
                    elements[idx].close = Some(tag.span);
                    stack.truncate(pos);
                }
            }
        }
    }

    elements
}

/// Elements strictly surrounding `pos`, innermost first
fn enclosing<'a, 'b>(elements: &'b [Element<'a>], pos: usize) -> Vec<&'b Element<'a>> {
    let mut found: Vec<_> = elements.iter().filter(|e| e.outer().surrounds(pos)).collect();
    found.sort_by_key(|e| e.outer().len());
    found
}

/// Parse the attributes of the open tag at `open`
pub fn attributes(code: &str, open: Span) -> Vec<Attribute> {
    let bytes = code.as_bytes();
    let limit = open.end.min(bytes.len());
    let mut attrs = Vec::new();
    let mut i = ident_end(bytes, open.start + 1);

    while i < limit {
        let b = bytes[i];
        if b.is_ascii_whitespace() || b == b'/' {
            i += 1;
            continue;
        }
        if b == b'>' {
            break;
        }

        let name_start = i;
        if b == b'{' {
            // JSX spread: {...props}
            i = skip_value(bytes, i).min(limit);
        } else {
            while i < limit && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
                i += 1;
            }
        }
        let name_span = Span::new(name_start, i);
        if name_span.is_empty() {
            i += 1;
            continue;
        }

        let mut j = i;
        while j < limit && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let mut value_span = None;
        if j < limit && bytes[j] == b'=' {
            j += 1;
            while j < limit && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let value_start = j;
            if j < limit && matches!(bytes[j], b'"' | b'\'' | b'{') {
                j = skip_value(bytes, j).min(limit);
            } else {
                while j < limit && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
            }
            value_span = Some(Span::new(value_start, j));
            i = j;
        }

        attrs.push(Attribute {
            name: name_span.slice(code).to_string(),
            value: value_span.map(|s| s.slice(code).to_string()),
            name_span,
            value_span,
        });
    }

    attrs
}

/// Matcher for HTML-flavoured markup
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMatcher {
    /// XML mode: case-sensitive names, no void elements, no raw-text elements
    pub xml: bool,
}

impl HtmlMatcher {
    pub fn new(xml: bool) -> Self {
        Self { xml }
    }

    /// Spans of an element, widest first; the inner span only if it covers `pos`
    fn element_spans(element: &Element<'_>, pos: Option<usize>) -> Vec<Span> {
        let mut spans = vec![element.outer()];
        if let Some(inner) = element.inner() {
            if !inner.is_empty() && pos.map_or(true, |p| inner.start <= p && p <= inner.end) {
                spans.push(inner);
            }
        }
        spans
    }
}

impl Matcher for HtmlMatcher {
    type Match = MatchedTag;

    fn find(&self, code: &str, pos: usize) -> Option<MatchedTag> {
        let elements = elements(code, self.xml);
        let element = enclosing(&elements, pos).into_iter().next()?;
        Some(MatchedTag {
            name: element.name.to_string(),
            attributes: attributes(code, element.open),
            open: element.open,
            close: element.close,
        })
    }

    fn balanced_outward(&self, code: &str, pos: usize) -> Vec<Span> {
        let elements = elements(code, self.xml);
        let spans = enclosing(&elements, pos)
            .into_iter()
            .flat_map(|e| Self::element_spans(e, Some(pos)).into_iter().rev())
            .collect();
        dedup_spans(spans)
    }

    fn balanced_inward(&self, code: &str, pos: usize) -> Vec<Span> {
        let elements = elements(code, self.xml);
        let chain = enclosing(&elements, pos);
        let mut spans: Vec<Span> = chain
            .iter()
            .rev()
            .flat_map(|e| Self::element_spans(e, Some(pos)))
            .collect();

        // Narrow into the first element after the cursor, then its first children
        let mut bounds = match chain.first() {
            Some(innermost) => innermost.inner(),
            None => Some(Span::new(0, code.len())),
        };
        let mut from = pos;
        while let Some(area) = bounds {
            let next = elements
                .iter()
                .find(|e| e.open.start >= from && area.covers(e.outer()));
            let Some(child) = next else { break };
            spans.extend(Self::element_spans(child, None));
            bounds = child.inner();
            from = child.open.end;
        }
        dedup_spans(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(code: &str, span: Span) -> &str {
        span.slice(code)
    }

    #[test]
    fn test_scan_tags_kinds() {
        let code = "<!DOCTYPE html><!-- <b> --><div><br><img/></div><?xml x?>";
        let tags: Vec<_> = scan_tags(code, false).into_iter().map(|t| (t.name, t.kind)).collect();
        assert_eq!(
            tags,
            vec![
                ("div", TagKind::Open),
                ("br", TagKind::SelfClose),
                ("img", TagKind::SelfClose),
                ("div", TagKind::Close),
            ]
        );
    }

    #[test]
    fn test_scan_tags_xml_has_no_void_elements() {
        let tags = scan_tags("<br></br>", true);
        assert_eq!(tags[0].kind, TagKind::Open);
        assert_eq!(tags[1].kind, TagKind::Close);
    }

    #[test]
    fn test_scan_tags_raw_text() {
        let code = "<script>if (a < b) { x = '<p>'; }</script><p></p>";
        let names: Vec<_> = scan_tags(code, false).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["script", "script", "p", "p"]);
    }

    #[test]
    fn test_scan_tags_quoted_gt() {
        let code = "<a title=\"x > y\" href='/'>link</a>";
        let tags = scan_tags(code, false);
        assert_eq!(text(code, tags[0].span), "<a title=\"x > y\" href='/'>");
    }

    #[test]
    fn test_attributes() {
        let code = "<input type=\"text\" value='a b' disabled data-x=1 {...rest}>";
        let open = scan_tags(code, false)[0].span;
        let attrs = attributes(code, open);

        let pairs: Vec<_> = attrs
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("type", Some("\"text\"")),
                ("value", Some("'a b'")),
                ("disabled", None),
                ("data-x", Some("1")),
                ("{...rest}", None),
            ]
        );
        assert_eq!(text(code, attrs[1].unquoted_value_span(code).unwrap()), "a b");
        assert_eq!(text(code, attrs[3].unquoted_value_span(code).unwrap()), "1");
    }

    #[test]
    fn test_find_innermost() {
        let code = "<div class=\"a\"><p>hello</p></div>";
        let pos = code.find("hello").unwrap() + 2;
        let tag = HtmlMatcher::new(false).find(code, pos).unwrap();
        assert_eq!(tag.name, "p");
        assert_eq!(text(code, tag.open), "<p>");
        assert_eq!(text(code, tag.close.unwrap()), "</p>");

        let tag = HtmlMatcher::new(false).find(code, 3).unwrap();
        assert_eq!(tag.name, "div");
        assert_eq!(tag.attributes[0].value.as_deref(), Some("\"a\""));
    }

    #[test]
    fn test_find_unclosed_and_stray() {
        let code = "<div><p>one<p>two</div></span>";
        let elements = elements(code, false);
        assert_eq!(elements.len(), 3);
        assert!(elements[0].close.is_some());
        assert!(elements[1].close.is_none());

        let pos = code.find("two").unwrap();
        assert_eq!(HtmlMatcher::default().find(code, pos).unwrap().name, "div");
        assert!(HtmlMatcher::default().find(code, code.len()).is_none());
    }

    #[test]
    fn test_find_case_sensitivity() {
        let code = "<Item>x</item>";
        assert!(HtmlMatcher::new(false).find(code, 7).is_some());
        assert!(HtmlMatcher::new(true).find(code, 7).is_none());
    }

    #[test]
    fn test_balanced_outward() {
        let code = "<ul><li>item</li></ul>";
        let pos = code.find("item").unwrap() + 1;
        let spans: Vec<_> = HtmlMatcher::default()
            .balanced_outward(code, pos)
            .into_iter()
            .map(|s| text(code, s))
            .collect();
        assert_eq!(spans, vec!["item", "<li>item</li>", code]);
    }

    #[test]
    fn test_balanced_inward() {
        let code = "<ul> <li><b>a</b></li><li>b</li></ul>";
        let spans: Vec<_> = HtmlMatcher::default()
            .balanced_inward(code, 2)
            .into_iter()
            .map(|s| text(code, s))
            .collect();
        assert_eq!(
            spans,
            vec![
                code,
                "<li><b>a</b></li>",
                "<b>a</b>",
                "a",
            ]
        );
    }
}
