//! YAML schema for reader configuration

use crate::error::{RecordingError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for `busy_timeout_ms` (ten minutes).
pub const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {s}. Valid formats: text, json")),
        }
    }
}

/// Reader configuration
///
/// Every field is optional in YAML:
///
/// ```yaml
/// busy_timeout_ms: 5000
/// create_layout_table: true
/// log_level: info
/// format: json
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// SQLite busy timeout applied on connect
    pub busy_timeout_ms: u64,

    /// Create the layouts table when connecting
    pub create_layout_table: bool,

    /// Default tracing filter for the CLI
    pub log_level: String,

    /// Default CLI output format
    pub format: OutputFormat,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5000,
            create_layout_table: true,
            log_level: "info".to_string(),
            format: OutputFormat::Text,
        }
    }
}

impl ReaderConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(RecordingError::ConfigValue {
                field: "busy_timeout_ms".to_string(),
                message: format!("{} exceeds the maximum of {MAX_BUSY_TIMEOUT_MS}", self.busy_timeout_ms),
                suggestion: "Use a timeout of at most 600000 ms".to_string(),
            });
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(RecordingError::ConfigValue {
                field: "log_level".to_string(),
                message: format!("unknown level '{}'", self.log_level),
                suggestion: format!("Use one of: {}", LOG_LEVELS.join(", ")),
            });
        }
        Ok(())
    }
}
