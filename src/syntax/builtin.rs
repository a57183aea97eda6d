//! Built-in syntax definitions

use super::registry::SyntaxDefinition;
use super::SyntaxKind::{Markup, Stylesheet};

/// Get all built-in syntax definitions
pub fn all_syntaxes() -> Vec<SyntaxDefinition> {
    vec![
        // HTML family
        SyntaxDefinition::new("html", Markup).with_html().with_extensions(&["html", "htm", "shtml"]),
        SyntaxDefinition::new("xhtml", Markup).with_html().with_extensions(&["xhtml"]),
        SyntaxDefinition::new("vue", Markup).with_html().with_extensions(&["vue"]),
        SyntaxDefinition::new("xml", Markup).with_xml().with_extensions(&["xml", "svg", "plist"]),
        SyntaxDefinition::new("xsl", Markup).with_xml().with_extensions(&["xsl", "xslt"]),
        SyntaxDefinition::new("jsx", Markup).with_jsx().with_extensions(&["jsx", "tsx"]),
        // Indentation-based markup: no tags to match
        SyntaxDefinition::new("haml", Markup).with_extensions(&["haml"]),
        SyntaxDefinition::new("pug", Markup).with_extensions(&["pug", "jade"]),
        SyntaxDefinition::new("slim", Markup).with_extensions(&["slim"]),
        // Stylesheets
        SyntaxDefinition::new("css", Stylesheet).with_extensions(&["css"]),
        SyntaxDefinition::new("scss", Stylesheet).with_extensions(&["scss"]),
        SyntaxDefinition::new("sass", Stylesheet).with_extensions(&["sass"]),
        SyntaxDefinition::new("less", Stylesheet).with_extensions(&["less"]),
        SyntaxDefinition::new("sss", Stylesheet).with_extensions(&["sss"]),
        SyntaxDefinition::new("stylus", Stylesheet).with_extensions(&["styl"]),
    ]
}
