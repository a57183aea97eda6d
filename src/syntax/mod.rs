//! Syntax identification
//!
//! This module answers "what kind of text is at this offset":
//! - Known Emmet syntaxes and their file extensions
//! - Classification of an offset into a syntax (markup or stylesheet)
//! - Scope selectors for finer-grained classification inside CSS

mod builtin;
mod registry;
pub mod scope;

pub use registry::{SyntaxDefinition, SyntaxRegistry};
pub use scope::{ScopeSelector, ScopeView};

/// Broad family of a syntax, which decides how abbreviations are scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyntaxKind {
    #[default]
    Markup,
    Stylesheet,
}

impl SyntaxKind {
    pub fn name(&self) -> &'static str {
        match self {
            SyntaxKind::Markup => "markup",
            SyntaxKind::Stylesheet => "stylesheet",
        }
    }
}

/// Syntax metadata for a single offset in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxInfo {
    /// Emmet syntax name (e.g., "html", "css", "jsx")
    pub syntax: String,
    pub kind: SyntaxKind,
    /// HTML-flavoured markup: tag context can be matched
    pub html: bool,
    /// XML dialect: no implied void elements
    pub xml: bool,
    pub jsx: bool,
    /// Offset sits in an inline fragment, e.g. a `style` attribute value
    pub inline: bool,
}

/// Classifies offsets of a document into syntaxes
pub trait SyntaxClassifier {
    /// Syntax at `pos`, or None if the document has no known syntax there
    fn classify(&self, pos: usize) -> Option<SyntaxInfo>;
}
