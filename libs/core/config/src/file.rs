//! YAML configuration file loading.

use crate::ConfigError;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

/// Load a configuration struct from a YAML file.
///
/// A missing file yields `T::default()`; the caller decides whether that is
/// acceptable. Fields absent from the file fall back to the serde defaults
/// declared on `T`. A file that exists but cannot be read or parsed is an error.
pub fn load_yaml<T>(path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Configuration file not found, using defaults");
            return Ok(T::default());
        }
        Err(e) => {
            return Err(ConfigError::File {
                path: path.display().to_string(),
                details: e.to_string(),
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    let parsed = serde_yaml::from_str(&contents).map_err(|e| ConfigError::File {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    info!(path = %path.display(), "Loaded configuration file");
    Ok(parsed)
}
