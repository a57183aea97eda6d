//! Expansion driver
//!
//! Emmet itself is an external engine behind `ExpansionEngine`. The driver
//! owns the state that outlives a single call: the grammar cache and the
//! global configuration read from settings. It also decides how the engine
//! renders tab stops and plain text for the host editor.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use tracing::debug;

use crate::config::{GlobalConfig, SettingsSource};
use crate::context::SyntaxContext;
use crate::error::Result;

static DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$").expect("Valid dollar regex"));

/// Expands abbreviations into text
pub trait ExpansionEngine {
    /// Expand `abbreviation`
    ///
    /// The engine may memoise parsed grammar in `options.cache` and must use
    /// `options.output` to render tab stops and text.
    fn expand(
        &self,
        abbreviation: &str,
        options: &mut ExpandOptions<'_>,
        global: &GlobalConfig,
    ) -> Result<String>;
}

/// Engine-defined memoised values keyed by abbreviation source
#[derive(Default)]
pub struct GrammarCache {
    entries: HashMap<String, Box<dyn Any + Send>>,
}

impl GrammarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, if present and of type `T`
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn insert<T: Send + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for GrammarCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// How tab stops are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStrategy {
    /// Editor snippet syntax: `${1:placeholder}` or `${1}`
    #[default]
    Snippet,
    /// Plain placeholder text, for previews
    Preview,
}

impl FieldStrategy {
    pub fn render(&self, index: usize, placeholder: &str) -> String {
        match self {
            FieldStrategy::Snippet if placeholder.is_empty() => format!("${{{}}}", index),
            FieldStrategy::Snippet => format!("${{{}:{}}}", index, placeholder),
            FieldStrategy::Preview => placeholder.to_string(),
        }
    }
}

/// How literal text is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStrategy {
    /// Escape `$` so the snippet parser keeps it literal
    #[default]
    Escape,
    Verbatim,
}

impl TextStrategy {
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self {
            TextStrategy::Escape => DOLLAR.replace_all(text, NoExpand(r"\$")),
            TextStrategy::Verbatim => Cow::Borrowed(text),
        }
    }
}

/// Output options the engine renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub field: FieldStrategy,
    pub text: TextStrategy,
    /// Produce indented, multi-line output
    pub format: bool,
}

/// Caller overrides for `OutputOptions`; set fields win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOverrides {
    pub field: Option<FieldStrategy>,
    pub text: Option<TextStrategy>,
    pub format: Option<bool>,
}

/// Per-call expansion request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpandConfig {
    pub syntax: SyntaxContext,
    /// Render tab stops as plain placeholders
    pub preview: bool,
    pub options: OutputOverrides,
}

impl ExpandConfig {
    pub fn new(syntax: SyntaxContext) -> Self {
        Self {
            syntax,
            ..Self::default()
        }
    }

    pub fn preview(mut self) -> Self {
        self.preview = true;
        self
    }

    /// Defaults derived from the context, then the caller's overrides
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            field: self.options.field.unwrap_or(if self.preview {
                FieldStrategy::Preview
            } else {
                FieldStrategy::Snippet
            }),
            text: self.options.text.unwrap_or(TextStrategy::Escape),
            format: self.options.format.unwrap_or(!self.syntax.inline),
        }
    }
}

/// Everything the engine receives for one call
#[derive(Debug)]
pub struct ExpandOptions<'a> {
    pub cache: &'a mut GrammarCache,
    pub syntax: SyntaxContext,
    pub output: OutputOptions,
}

/// Drives an `ExpansionEngine` with cached state and settings
pub struct Expander<E, S> {
    engine: E,
    settings: S,
    cache: GrammarCache,
    global: Option<GlobalConfig>,
}

impl<E: ExpansionEngine, S: SettingsSource> Expander<E, S> {
    pub fn new(engine: E, settings: S) -> Self {
        Self {
            engine,
            settings,
            cache: GrammarCache::new(),
            global: None,
        }
    }

    /// Expand `abbreviation` with the engine
    pub fn expand(&mut self, abbreviation: &str, config: ExpandConfig) -> Result<String> {
        let output = config.output();
        let global = self
            .global
            .get_or_insert_with(|| {
                debug!("loading global expansion config");
                self.settings.load().global_config()
            });

        let mut options = ExpandOptions {
            cache: &mut self.cache,
            syntax: config.syntax,
            output,
        };
        self.engine.expand(abbreviation, &mut options, global)
    }

    /// Settings changed: drop cached grammar and reload configuration on next use
    pub fn invalidate(&mut self) {
        debug!("invalidating {} cached entries", self.cache.len());
        self.cache.clear();
        self.global = None;
    }

    pub fn cache(&self) -> &GrammarCache {
        &self.cache
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::Error;
    use crate::syntax::SyntaxKind;
    use std::cell::{Cell, RefCell};

    /// Renders `<abbr>` followed by one tab stop, caching each abbreviation
    #[derive(Default)]
    struct FakeEngine {
        seen: RefCell<Vec<(SyntaxContext, OutputOptions)>>,
    }

    impl ExpansionEngine for FakeEngine {
        fn expand(
            &self,
            abbreviation: &str,
            options: &mut ExpandOptions<'_>,
            global: &GlobalConfig,
        ) -> Result<String> {
            if abbreviation.is_empty() {
                return Err(Error::Engine("empty abbreviation".to_string()));
            }
            self.seen
                .borrow_mut()
                .push((options.syntax.clone(), options.output));
            options.cache.insert(abbreviation, abbreviation.len());

            let suffix = global
                .get("suffix")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            Ok(format!(
                "<{}>{}{}",
                options.output.text.apply(abbreviation),
                options.output.field.render(2, "text"),
                suffix
            ))
        }
    }

    #[derive(Default)]
    struct CountingSource {
        loads: Cell<usize>,
    }

    impl SettingsSource for CountingSource {
        fn load(&self) -> Settings {
            self.loads.set(self.loads.get() + 1);
            Settings::parse("[config]\nsuffix = \"!\"").unwrap()
        }
    }

    fn expander() -> Expander<FakeEngine, Settings> {
        Expander::new(FakeEngine::default(), Settings::default())
    }

    #[test]
    fn test_expander_is_shareable_behind_mutex() {
        fn assert_send<T: Send>() {}
        assert_send::<GrammarCache>();
        assert_send::<Expander<FakeEngine, Settings>>();

        let shared = std::sync::Arc::new(std::sync::Mutex::new(expander()));
        let worker = {
            let shared = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || {
                let mut expander = shared.lock().unwrap();
                expander.expand("a", ExpandConfig::default())
            })
        };
        assert_eq!(worker.join().unwrap().unwrap(), "<a>${2:text}");
        assert!(shared.lock().unwrap().cache().contains("a"));
    }

    #[test]
    fn test_field_rendering() {
        assert_eq!(FieldStrategy::Snippet.render(2, "text"), "${2:text}");
        assert_eq!(FieldStrategy::Snippet.render(1, ""), "${1}");
        assert_eq!(FieldStrategy::Preview.render(2, "text"), "text");
        assert_eq!(FieldStrategy::Preview.render(1, ""), "");
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(TextStrategy::Escape.apply("a$b$"), "a\\$b\\$");
        assert_eq!(TextStrategy::Escape.apply("plain"), "plain");
        assert_eq!(TextStrategy::Verbatim.apply("a$b"), "a$b");
    }

    #[test]
    fn test_preview_vs_snippet() {
        let mut expander = expander();

        let snippet = expander.expand("a", ExpandConfig::default()).unwrap();
        assert_eq!(snippet, "<a>${2:text}");

        let preview = expander
            .expand("a", ExpandConfig::default().preview())
            .unwrap();
        assert_eq!(preview, "<a>text");
    }

    #[test]
    fn test_format_follows_inline() {
        let mut expander = expander();

        let mut syntax = SyntaxContext::new("css", SyntaxKind::Stylesheet);
        syntax.inline = true;
        expander.expand("m10", ExpandConfig::new(syntax)).unwrap();
        expander.expand("div", ExpandConfig::default()).unwrap();

        let seen = expander.engine().seen.borrow();
        assert!(!seen[0].1.format);
        assert_eq!(seen[0].0.syntax, "css");
        assert!(seen[1].1.format);
    }

    #[test]
    fn test_overrides_win() {
        let mut expander = expander();
        let config = ExpandConfig {
            preview: true,
            options: OutputOverrides {
                field: Some(FieldStrategy::Snippet),
                text: Some(TextStrategy::Verbatim),
                format: Some(false),
            },
            ..ExpandConfig::default()
        };

        assert_eq!(expander.expand("$x", config).unwrap(), "<$x>${2:text}");
        let seen = expander.engine().seen.borrow();
        assert!(!seen[0].1.format);
    }

    #[test]
    fn test_global_config_loaded_once() {
        let mut expander = Expander::new(FakeEngine::default(), CountingSource::default());

        assert_eq!(expander.expand("a", ExpandConfig::default()).unwrap(), "<a>${2:text}!");
        expander.expand("b", ExpandConfig::default()).unwrap();
        assert_eq!(expander.settings.loads.get(), 1);

        expander.invalidate();
        expander.expand("c", ExpandConfig::default()).unwrap();
        assert_eq!(expander.settings.loads.get(), 2);
    }

    #[test]
    fn test_cache_cleared_on_invalidate() {
        let mut expander = expander();
        expander.expand("ul>li", ExpandConfig::default()).unwrap();
        expander.expand("p", ExpandConfig::default()).unwrap();

        assert_eq!(expander.cache().len(), 2);
        assert_eq!(expander.cache().get::<usize>("ul>li"), Some(&5));
        assert_eq!(expander.cache().get::<String>("ul>li"), None);

        expander.invalidate();
        assert!(expander.cache().is_empty());
        assert!(!expander.cache().contains("p"));
    }

    #[test]
    fn test_engine_errors_propagate() {
        let mut expander = expander();
        let err = expander.expand("", ExpandConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
    }
}
