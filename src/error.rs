//! Error types with actionable diagnostics.
//!
//! Every variant names the problem and, where the user can act on it, what to
//! try next. Reads on a closed recording return empty results, not errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for caserec operations.
pub type Result<T> = std::result::Result<T, RecordingError>;

/// Errors raised while opening or reading a recording file.
#[derive(Error, Debug)]
pub enum RecordingError {
    /// The file is missing, shorter than a SQLite header, or has the wrong magic.
    #[error("Not a SQLite recording: {path}\n  → Check the path points at a case recorder output file")]
    InvalidFormat { path: PathBuf },

    /// A catalog blob could not be decoded as a current or legacy pickle.
    #[error("Cannot decode catalog column '{column}': {message}\n  → The recording may be corrupt or written by an unsupported recorder version")]
    CatalogDecode { column: String, message: String },

    /// A binary array column of an iteration row is not a valid npy buffer.
    #[error("Malformed iteration row '{coordinate}', column '{column}': {message}")]
    MalformedRow { coordinate: String, column: String, message: String },

    /// Underlying SQLite failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Create a config file or drop --config to use defaults")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check YAML syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    ConfigValue { field: String, message: String, suggestion: String },

    /// JSON (de)serialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl RecordingError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigParsing { .. }
                | Self::ConfigValue { .. }
        )
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "E001",
            Self::CatalogDecode { .. } => "E010",
            Self::MalformedRow { .. } => "E011",
            Self::Sqlite(_) => "E020",
            Self::Io { .. } => "E030",
            Self::ConfigNotFound { .. } => "E040",
            Self::ConfigParsing { .. } => "E041",
            Self::ConfigValue { .. } => "E042",
            Self::Serialization { .. } => "E050",
        }
    }
}

impl From<serde_json::Error> for RecordingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { message: err.to_string() }
    }
}
