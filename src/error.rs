//! Error types for emmet-bridge
//!
//! "Nothing found" outcomes (no abbreviation, no context, no section) are
//! plain `None` values. The variants here are reserved for input that is
//! present but invalid, and for I/O around settings and the CLI.

use thiserror::Error;

/// Result type alias for emmet-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Invalid abbreviation at {pos}: {message}")]
    MalformedAbbreviation { pos: usize, message: String },

    #[error("Invalid expression: {0}")]
    MalformedExpression(String),

    #[error("Expansion failed: {0}")]
    Engine(String),

    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Whether this error describes malformed user input under the cursor
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedAbbreviation { .. } | Error::MalformedExpression(_)
        )
    }
}
