//! Configuration file handling for the structural cache.
//!
//! This module provides loading and parsing of `.docsql.json` configuration files:
//!
//! ```json
//! { "cache": { "enabled": true, "max_size": 500 } }
//! ```
//!
//! Resolution priority: explicit `--config` path > `.docsql.json` in the
//! working directory > environment (`DOCSQL_CACHE_DISABLED`, `DOCSQL_CACHE_SIZE`)
//! > defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::query::CacheConfig;

pub const CONFIG_FILE_NAME: &str = ".docsql.json";
pub const ENV_CACHE_DISABLED: &str = "DOCSQL_CACHE_DISABLED";
pub const ENV_CACHE_SIZE: &str = "DOCSQL_CACHE_SIZE";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cache: CacheConfig,
}

impl ConfigFile {
    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the JSON is invalid.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Load `.docsql.json` from `dir`, or `None` when there is no such file.
    pub fn load_in(dir: &Path) -> Result<Option<Self>, Box<dyn Error>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }
}

/// Read cache settings from environment variables, if any are set.
pub fn cache_config_from_env<F>(lookup: F) -> Result<Option<CacheConfig>, Box<dyn Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let disabled = lookup(ENV_CACHE_DISABLED);
    let size = lookup(ENV_CACHE_SIZE);
    if disabled.is_none() && size.is_none() {
        return Ok(None);
    }

    let mut config = CacheConfig::default();
    if let Some(raw) = disabled {
        config.enabled = match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => false,
            "0" | "false" | "no" | "" => true,
            other => return Err(format!("Invalid {}: '{}'", ENV_CACHE_DISABLED, other).into()),
        };
    }
    if let Some(raw) = size {
        config.max_size = raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {}: '{}' ({})", ENV_CACHE_SIZE, raw, e))?;
    }
    Ok(Some(config))
}

/// Resolve cache configuration from the process environment and working directory.
pub fn resolve(explicit: Option<&Path>) -> Result<CacheConfig, Box<dyn Error>> {
    resolve_with(Path::new("."), explicit, |key| std::env::var(key).ok())
}

/// Resolve cache configuration.
///
/// Priority: explicit file > `.docsql.json` in `dir` > environment > defaults.
pub fn resolve_with<F>(dir: &Path, explicit: Option<&Path>, env: F) -> Result<CacheConfig, Box<dyn Error>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading cache config from explicit file");
        return Ok(ConfigFile::load_from(path)?.cache);
    }

    if let Some(file) = ConfigFile::load_in(dir)? {
        debug!(dir = %dir.display(), "loaded {}", CONFIG_FILE_NAME);
        return Ok(file.cache);
    }

    if let Some(config) = cache_config_from_env(env)? {
        debug!(enabled = config.enabled, max_size = config.max_size, "cache config from environment");
        return Ok(config);
    }

    Ok(CacheConfig::default())
}
