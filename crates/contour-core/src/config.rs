//! Editor configuration
//!
//! Generic YAML load/save plus the engine-facing settings. Invalid or
//! missing config files fall back to defaults with a warning; only saving
//! can fail.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_LEVEL, DEFAULT_WAVEFORM_BUCKETS, DOMAIN_WIDTH};

/// Engine settings the shell may persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Number of min/max buckets per waveform summary
    pub waveform_buckets: usize,
    /// Width of the envelope curve domain in editor units
    pub curve_domain_width: f64,
    /// Level assigned to the boundary breakpoints of a fresh curve
    pub default_level: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            waveform_buckets: DEFAULT_WAVEFORM_BUCKETS,
            curve_domain_width: DOMAIN_WIDTH,
            default_level: DEFAULT_LEVEL,
        }
    }
}

/// Get the default config file path (`<config dir>/contour/config.yaml`)
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("contour")
        .join("config.yaml")
}

/// Load configuration from a YAML file
///
/// A missing file returns defaults silently; an unreadable or unparsable
/// file logs a warning and returns defaults.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("load_config: {:?} doesn't exist, using defaults", path);
        return T::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<T>(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("load_config: failed to parse {:?}: {}, using defaults", path, e);
                T::default()
            }
        },
        Err(e) => {
            log::warn!("load_config: failed to read {:?}: {}, using defaults", path, e);
            T::default()
        }
    }
}

/// Save configuration to a YAML file, creating parent directories
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("serializing config")?;
    std::fs::write(path, yaml).with_context(|| format!("writing config to {:?}", path))?;
    log::info!("save_config: saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.waveform_buckets, DEFAULT_WAVEFORM_BUCKETS);
        assert_eq!(config.curve_domain_width, DOMAIN_WIDTH);
        assert_eq!(config.default_level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_missing_file_returns_defaults() {
        let config: PlayerConfig = load_config(Path::new("/nonexistent/contour/config.yaml"));
        assert_eq!(config.waveform_buckets, DEFAULT_WAVEFORM_BUCKETS);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: PlayerConfig = serde_yaml::from_str("waveform_buckets: 800\n").unwrap();
        assert_eq!(config.waveform_buckets, 800);
        assert_eq!(config.curve_domain_width, DOMAIN_WIDTH);
    }
}
