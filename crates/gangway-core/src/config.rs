use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GangwayConfig {
    pub version: u32,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
}

impl Default for GangwayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            platform: PlatformConfig::default(),
            effects: EffectsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformConfig {
    pub api_base_url: String,
    pub github_install_url: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.gangway.dev".to_string(),
            github_install_url: "https://github.com/apps/gangway-deploy/installations/new"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EffectsConfig {
    /// Number of scatter layers the card snapshot is split into.
    pub layer_count: usize,
    /// Independent randomized layer assignments per source cell.
    pub scatter_repeats: usize,
    pub dissolve_ms: u64,
    /// Maximum per-layer drift distance, in terminal cells.
    pub drift_cells: f32,
    pub crossfade_ms: u64,
    pub settle_ms: u64,
    /// Skips the dissolve and crossfade animations entirely; navigation
    /// still fires.
    pub reduced_motion: bool,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            layer_count: 75,
            scatter_repeats: 3,
            dissolve_ms: 900,
            drift_cells: 12.0,
            crossfade_ms: 1500,
            settle_ms: 2000,
            reduced_motion: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("gangway")
        .join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<GangwayConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: GangwayConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

/// A missing config file is the common case and means defaults; a config
/// file that exists but does not parse or validate is an error the user
/// should see.
pub fn load_config_or_default(path: &Path) -> Result<GangwayConfig, ConfigError> {
    if !path.exists() {
        return Ok(GangwayConfig::default());
    }
    load_config(path)
}

pub fn validate_config(config: &GangwayConfig) -> Result<(), ConfigError> {
    if config.version != 1 {
        return Err(ConfigError::Validation {
            message: "version must be 1".to_string(),
        });
    }

    if config.platform.api_base_url.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "platform.api_base_url must be non-empty".to_string(),
        });
    }

    if config.platform.github_install_url.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "platform.github_install_url must be non-empty".to_string(),
        });
    }

    let effects = &config.effects;
    if effects.layer_count == 0 {
        return Err(ConfigError::Validation {
            message: "effects.layer_count must be at least 1".to_string(),
        });
    }

    if effects.scatter_repeats == 0 {
        return Err(ConfigError::Validation {
            message: "effects.scatter_repeats must be at least 1".to_string(),
        });
    }

    if !effects.reduced_motion
        && (effects.dissolve_ms == 0 || effects.crossfade_ms == 0 || effects.settle_ms == 0)
    {
        return Err(ConfigError::Validation {
            message: "effects durations must be nonzero unless reduced_motion is set".to_string(),
        });
    }

    Ok(())
}
