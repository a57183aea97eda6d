//! emmet-bridge - editor-side core for Emmet-style abbreviation expansion
//!
//! Given document text and a cursor offset, this crate works out what kind
//! of text surrounds the cursor, which abbreviation to expand and what
//! context the expansion engine should see. It also carries the structural
//! navigation commands that ship with Emmet integrations: balancing, item
//! selection, CSS section lookup and inline math.

pub mod balance;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod expand;
pub mod extract;
pub mod math;
pub mod matcher;
pub mod section;
pub mod select;
pub mod span;
pub mod syntax;
pub mod text;

pub use balance::{balance, balance_css, balance_for};
pub use config::{GlobalConfig, Settings, SettingsFile, SettingsSource};
pub use context::{resolve, EditorContext, PropertyContext, SyntaxContext, TagContext, View};
pub use document::Document;
pub use error::{Error, Result};
pub use expand::{
    ExpandConfig, ExpandOptions, Expander, ExpansionEngine, FieldStrategy, GrammarCache,
    OutputOptions, OutputOverrides, TextStrategy,
};
pub use extract::{
    extract_abbreviation, extract_abbreviation_with, AbbreviationMatch, AbbreviationScanner,
    Location, ScanOptions, TokenScanner,
};
pub use math::{evaluate_math, MathOptions, MathResult};
pub use matcher::Direction;
pub use section::{css_section, CssProperty, CssSection};
pub use select::{select_item, SelectItemModel};
pub use span::Span;
pub use syntax::{SyntaxClassifier, SyntaxKind, SyntaxRegistry};
