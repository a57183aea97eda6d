//! Abbreviation extraction
//!
//! Picks the text region to scan (the cursor's line, or an explicit range),
//! resolves the syntax context when the caller has none, and maps scanner
//! results back to document offsets.

mod scanner;

pub use scanner::{AbbreviationScanner, TokenScanner};

use crate::context::{self, SyntaxContext, View};
use crate::error::{Error, Result};
use crate::span::Span;
use crate::syntax::SyntaxKind;
use crate::text;

/// Where to look for an abbreviation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Scan the line containing this offset, up to the offset
    Offset(usize),
    /// Scan exactly this range, up to its end
    Range(Span),
}

impl From<usize> for Location {
    fn from(pos: usize) -> Self {
        Location::Offset(pos)
    }
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Location::Range(span)
    }
}

impl From<[usize; 2]> for Location {
    fn from(range: [usize; 2]) -> Self {
        Location::Range(range.into())
    }
}

/// An abbreviation found in the text
///
/// `start` includes a required prefix (such as JSX `<`), `location` is where
/// the abbreviation itself begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationMatch {
    pub abbreviation: String,
    pub start: usize,
    pub end: usize,
    pub location: usize,
}

impl AbbreviationMatch {
    /// Span to replace with the expansion
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    fn shift(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            location: self.location + offset,
            ..self
        }
    }
}

/// Options handed to an `AbbreviationScanner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub kind: SyntaxKind,
    pub look_ahead: bool,
    pub prefix: Option<String>,
}

impl From<&SyntaxContext> for ScanOptions {
    fn from(ctx: &SyntaxContext) -> Self {
        Self {
            kind: ctx.kind,
            look_ahead: ctx.look_ahead,
            prefix: ctx.prefix.clone(),
        }
    }
}

/// Extract the abbreviation at `location` with the built-in scanner
pub fn extract_abbreviation<V: View + ?Sized>(
    view: &V,
    location: impl Into<Location>,
    options: Option<SyntaxContext>,
) -> Result<Option<(AbbreviationMatch, SyntaxContext)>> {
    extract_abbreviation_with(view, location, options, &TokenScanner)
}

/// Extract the abbreviation at `location` using `scanner`
///
/// Returns the match in document offsets together with the syntax context
/// it was scanned under. Stylesheets never look ahead past auto-closed
/// characters, whatever the options say.
pub fn extract_abbreviation_with<V, S>(
    view: &V,
    location: impl Into<Location>,
    options: Option<SyntaxContext>,
    scanner: &S,
) -> Result<Option<(AbbreviationMatch, SyntaxContext)>>
where
    V: View + ?Sized,
    S: AbbreviationScanner + ?Sized,
{
    let code = view.text();
    let (pos, region) = match location.into() {
        Location::Offset(pt) => {
            let pt = text::clamp_offset(code, pt);
            (pt, text::line_span(code, pt))
        }
        Location::Range(span) => {
            let span = Span::new(
                text::clamp_offset(code, span.start),
                text::clamp_offset(code, span.end),
            );
            (span.end, span)
        }
    };

    let mut ctx = options.unwrap_or_else(|| context::resolve(view, pos, false));
    if ctx.kind == SyntaxKind::Stylesheet {
        ctx.look_ahead = false;
    }

    let scan_options = ScanOptions::from(&ctx);
    let found = scanner
        .scan(region.slice(code), pos - region.start, &scan_options)
        .map_err(|err| match err {
            Error::MalformedAbbreviation { pos, message } => Error::MalformedAbbreviation {
                pos: pos + region.start,
                message,
            },
            other => other,
        })?;

    Ok(found.map(|m| (m.shift(region.start), ctx)))
}
