//! Backward abbreviation scanner
//!
//! Walks from the cursor toward the start of a line collecting the longest
//! run of characters that can form an abbreviation. Bracketed groups
//! (`[attr="a b"]`, `(group)`, `{text}`) are consumed whole so that spaces
//! inside them do not end the token.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{AbbreviationMatch, ScanOptions};
use crate::error::{Error, Result};
use crate::syntax::SyntaxKind;
use crate::text;

/// A complete tag ending exactly at the end of the haystack
static TAG_AT_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"</?[A-Za-z][\w:.\-]*(?:\s+[^<>]*?)?\s*/?>$"#).expect("Valid tag regex")
});

/// Finds the abbreviation that ends at an offset inside a single line
pub trait AbbreviationScanner {
    /// Scan `line` backwards from `pos`
    ///
    /// Offsets in the result are relative to `line`. `Ok(None)` means there
    /// is nothing to expand.
    fn scan(
        &self,
        line: &str,
        pos: usize,
        options: &ScanOptions,
    ) -> Result<Option<AbbreviationMatch>>;
}

/// The built-in scanner
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenScanner;

impl AbbreviationScanner for TokenScanner {
    fn scan(
        &self,
        line: &str,
        pos: usize,
        options: &ScanOptions,
    ) -> Result<Option<AbbreviationMatch>> {
        let bytes = line.as_bytes();
        let kind = options.kind;
        let mut pos = text::clamp_offset(line, pos);
        if options.look_ahead {
            pos = offset_past_auto_closed(bytes, pos, kind);
        }

        let prefix = options.prefix.as_deref().unwrap_or("").as_bytes();
        let start = if prefix.is_empty() {
            0
        } else {
            match prefix_offset(bytes, pos, prefix) {
                Some(start) => start,
                None => return Ok(None),
            }
        };

        let mut cursor = pos;
        let mut stack: Vec<u8> = Vec::new();

        while cursor > start {
            let ch = bytes[cursor - 1];

            // Text content: anything goes until the opening brace
            if stack.contains(&b'}') {
                if ch == b'}' {
                    stack.push(ch);
                    cursor -= 1;
                    continue;
                }
                if ch != b'{' {
                    cursor -= 1;
                    continue;
                }
            }

            if is_close_brace(ch, kind) {
                stack.push(ch);
            } else if is_open_brace(ch, kind) {
                match stack.pop() {
                    Some(close) if brace_pair(close) == Some(ch) => {}
                    Some(close) => {
                        return Err(Error::MalformedAbbreviation {
                            pos: cursor - 1,
                            message: format!(
                                "'{}' does not match '{}'",
                                ch as char, close as char
                            ),
                        });
                    }
                    None => break,
                }
            } else if stack.contains(&b']') || stack.contains(&b')') {
                cursor -= 1;
                continue;
            } else if at_tag_end(line, cursor) || !is_abbreviation_byte(ch) {
                break;
            }

            cursor -= 1;
        }

        if !stack.is_empty() || cursor == pos {
            return Ok(None);
        }

        let abbreviation =
            line[cursor..pos].trim_start_matches(|c| matches!(c, '*' | '+' | '>' | '^'));
        if abbreviation.is_empty() {
            return Ok(None);
        }

        let location = pos - abbreviation.len();
        Ok(Some(AbbreviationMatch {
            abbreviation: abbreviation.to_string(),
            start: if prefix.is_empty() {
                location
            } else {
                start - prefix.len()
            },
            end: pos,
            location,
        }))
    }
}

/// Step over a closing quote and closing braces an editor may have auto-inserted
fn offset_past_auto_closed(bytes: &[u8], mut pos: usize, kind: SyntaxKind) -> usize {
    if pos < bytes.len() && is_quote(bytes[pos]) {
        pos += 1;
    }
    while pos < bytes.len() && is_close_brace(bytes[pos], kind) {
        pos += 1;
    }
    pos
}

/// Offset right after the nearest `prefix` before `pos`, skipping `[..]` and `{..}` groups
fn prefix_offset(bytes: &[u8], pos: usize, prefix: &[u8]) -> Option<usize> {
    let mut cursor = pos;
    while cursor > 0 {
        if let Some(skipped) = skip_group(bytes, cursor, b']', b'[')
            .or_else(|| skip_group(bytes, cursor, b'}', b'{'))
        {
            cursor = skipped;
            continue;
        }
        if bytes[..cursor].ends_with(prefix) {
            return Some(cursor);
        }
        cursor -= 1;
    }
    None
}

/// Offset of the `open` byte matching a `close` right before `cursor`
fn skip_group(bytes: &[u8], cursor: usize, close: u8, open: u8) -> Option<usize> {
    if bytes[cursor - 1] != close {
        return None;
    }
    let mut i = cursor - 1;
    while i > 0 {
        i -= 1;
        if bytes[i] == open {
            return Some(i);
        }
        if is_quote(bytes[i]) {
            let quote = bytes[i];
            match bytes[..i].iter().rposition(|&b| b == quote) {
                Some(q) => i = q,
                None => return None,
            }
        }
    }
    None
}

fn at_tag_end(line: &str, cursor: usize) -> bool {
    line.as_bytes()[cursor - 1] == b'>' && TAG_AT_END.is_match(&line[..cursor])
}

fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

fn is_close_brace(b: u8, kind: SyntaxKind) -> bool {
    b == b')' || (kind == SyntaxKind::Markup && (b == b']' || b == b'}'))
}

fn is_open_brace(b: u8, kind: SyntaxKind) -> bool {
    b == b'(' || (kind == SyntaxKind::Markup && (b == b'[' || b == b'{'))
}

fn brace_pair(close: u8) -> Option<u8> {
    match close {
        b')' => Some(b'('),
        b']' => Some(b'['),
        b'}' => Some(b'{'),
        _ => None,
    }
}

fn is_abbreviation_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"#.*:$-_!@%^+>/".contains(&b)
}
