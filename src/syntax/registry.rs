//! Registry of known syntaxes
//!
//! Maps syntax names and file extensions to `SyntaxDefinition`s.

use std::collections::HashMap;
use std::path::Path;

use super::builtin;
use super::{SyntaxInfo, SyntaxKind};

/// A syntax Emmet knows how to expand abbreviations for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDefinition {
    /// Syntax name (e.g., "html", "scss")
    pub name: String,
    pub kind: SyntaxKind,
    /// File extensions (e.g., ["html", "htm"])
    pub extensions: Vec<String>,
    pub html: bool,
    pub xml: bool,
    pub jsx: bool,
}

impl SyntaxDefinition {
    /// Create a new definition with no extensions or flavour flags
    pub fn new(name: &str, kind: SyntaxKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            extensions: Vec::new(),
            html: false,
            xml: false,
            jsx: false,
        }
    }

    /// Builder: add file extensions
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions
            .extend(extensions.iter().map(|ext| ext.to_string()));
        self
    }

    /// Builder: mark as HTML-flavoured markup
    pub fn with_html(mut self) -> Self {
        self.html = true;
        self
    }

    /// Builder: mark as an XML dialect
    pub fn with_xml(mut self) -> Self {
        self.html = true;
        self.xml = true;
        self
    }

    /// Builder: mark as JSX
    pub fn with_jsx(mut self) -> Self {
        self.html = true;
        self.jsx = true;
        self
    }

    /// Metadata for an offset classified as this syntax
    pub fn info(&self, inline: bool) -> SyntaxInfo {
        SyntaxInfo {
            syntax: self.name.clone(),
            kind: self.kind,
            html: self.html,
            xml: self.xml,
            jsx: self.jsx,
            inline,
        }
    }
}

/// Lookup table of syntax definitions
pub struct SyntaxRegistry {
    syntaxes: HashMap<String, SyntaxDefinition>,
    /// Extension to syntax name mapping
    extension_map: HashMap<String, String>,
}

impl SyntaxRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            syntaxes: HashMap::new(),
            extension_map: HashMap::new(),
        }
    }

    /// Create a registry with the built-in syntaxes
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for syntax in builtin::all_syntaxes() {
            registry.add(syntax);
        }
        registry
    }

    /// Add a syntax definition, replacing any with the same name
    pub fn add(&mut self, syntax: SyntaxDefinition) {
        let name = syntax.name.clone();
        for ext in &syntax.extensions {
            self.extension_map.insert(ext.to_lowercase(), name.clone());
        }
        self.syntaxes.insert(name, syntax);
    }

    /// Get a syntax definition by name
    pub fn get(&self, name: &str) -> Option<&SyntaxDefinition> {
        self.syntaxes.get(&name.to_lowercase())
    }

    /// Detect syntax from filename
    pub fn detect(&self, filename: &Path) -> Option<&SyntaxDefinition> {
        let ext = filename.extension()?.to_str()?.to_lowercase();
        self.extension_map
            .get(&ext)
            .and_then(|name| self.syntaxes.get(name))
    }

    /// List known syntax names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.syntaxes.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_syntax() {
        let registry = SyntaxRegistry::with_defaults();

        let detect = |name: &str| registry.detect(Path::new(name)).map(|s| s.name.as_str());
        assert_eq!(detect("index.html"), Some("html"));
        assert_eq!(detect("INDEX.HTM"), Some("html"));
        assert_eq!(detect("app.jsx"), Some("jsx"));
        assert_eq!(detect("feed.xml"), Some("xml"));
        assert_eq!(detect("main.scss"), Some("scss"));
        assert_eq!(detect("style.css"), Some("css"));
        assert_eq!(detect("Makefile"), None);
    }

    #[test]
    fn test_flavour_flags() {
        let registry = SyntaxRegistry::with_defaults();

        let xsl = registry.get("xsl").unwrap();
        assert!(xsl.html && xsl.xml && !xsl.jsx);

        let jsx = registry.get("jsx").unwrap();
        assert!(jsx.html && jsx.jsx);

        let pug = registry.get("pug").unwrap();
        assert_eq!(pug.kind, SyntaxKind::Markup);
        assert!(!pug.html);

        let less = registry.get("LESS").unwrap();
        assert_eq!(less.kind, SyntaxKind::Stylesheet);
    }

    #[test]
    fn test_custom_syntax() {
        let mut registry = SyntaxRegistry::new();
        registry.add(SyntaxDefinition::new("twig", SyntaxKind::Markup).with_html().with_extensions(&["twig"]));

        assert_eq!(registry.names(), vec!["twig"]);
        assert!(registry.detect(Path::new("base.twig")).unwrap().html);
    }
}
