//! Configuration file loading

use super::schema::ReaderConfig;
use crate::error::{RecordingError, Result};
use std::fs;
use std::path::Path;

/// Load and validate a YAML reader configuration.
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ReaderConfig> {
    let path = config_path.as_ref();
    if !path.exists() {
        return Err(RecordingError::ConfigNotFound { path: path.to_path_buf() });
    }

    let yaml_content = fs::read_to_string(path)
        .map_err(|e| RecordingError::io(format!("reading config file {}", path.display()), e))?;

    if yaml_content.trim().is_empty() {
        return Ok(ReaderConfig::default());
    }

    let config: ReaderConfig = serde_yaml::from_str(&yaml_content).map_err(|e| {
        RecordingError::ConfigParsing { path: path.to_path_buf(), message: e.to_string() }
    })?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}
