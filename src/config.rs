//! Settings file support
//!
//! Loads settings from ~/.emmet-bridge.toml (or %USERPROFILE%\.emmet-bridge.toml
//! on Windows)
//!
//! The `[config]` table is handed to the expansion engine unchanged as the
//! global configuration; everything else is reserved for the bridge itself.
//!
//! Example:
//! ```text
//! # emmet-bridge settings
//! [config.markup.snippets]
//! foo = "div.foo"
//!
//! [config.stylesheet.options]
//! "stylesheet.shortHex" = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;

const FILE_NAME: &str = ".emmet-bridge.toml";

/// Global engine configuration: the `[config]` table of the settings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalConfig(toml::Table);

impl GlobalConfig {
    pub fn new(table: toml::Table) -> Self {
        Self(table)
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_table(&self) -> &toml::Table {
        &self.0
    }
}

/// Parsed settings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    table: toml::Table,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(FILE_NAME))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(FILE_NAME))
        }
    }

    /// Parse settings file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let table = contents.parse::<toml::Table>()?;
        Ok(Self { table })
    }

    /// Read and parse a settings file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Top-level value by key
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.table.get(key)
    }

    /// The `[config]` table; empty when missing or not a table
    pub fn global_config(&self) -> GlobalConfig {
        match self.table.get("config") {
            Some(toml::Value::Table(table)) => GlobalConfig::new(table.clone()),
            Some(other) => {
                warn!("ignoring non-table `config` setting ({})", other.type_str());
                GlobalConfig::default()
            }
            None => GlobalConfig::default(),
        }
    }
}

/// Where the expansion driver gets its settings from
pub trait SettingsSource {
    fn load(&self) -> Settings;
}

impl SettingsSource for Settings {
    fn load(&self) -> Settings {
        self.clone()
    }
}

/// Settings read from a file on every load
///
/// A missing file yields default settings; an unreadable or invalid one is
/// logged and also yields defaults.
#[derive(Debug, Clone, Default)]
pub struct SettingsFile {
    path: Option<PathBuf>,
}

impl SettingsFile {
    /// The per-user settings file
    pub fn user() -> Self {
        Self {
            path: Settings::config_path(),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl SettingsSource for SettingsFile {
    fn load(&self) -> Settings {
        let Some(path) = &self.path else {
            return Settings::default();
        };
        if !path.exists() {
            debug!("no settings file at {}", path.display());
            return Settings::default();
        }
        match Settings::load_from(path) {
            Ok(settings) => {
                debug!("loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                warn!("using default settings, {}: {}", path.display(), err);
                Settings::default()
            }
        }
    }
}
