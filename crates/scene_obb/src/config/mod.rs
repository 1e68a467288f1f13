//! Configuration system
//!
//! Configuration types load from and save to TOML or RON files, picked by
//! file extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::spatial::StalePolicy;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tuning for collision queries issued through [`crate::query::CollisionQuery`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Escalate to the separating-axis test when the sphere test passes
    pub precise_by_default: bool,

    /// Refresh stale node transforms before sampling them.
    ///
    /// Turn off when world transforms are already brought up to date once
    /// per frame; stale nodes are then sampled as-is and logged.
    pub refresh_stale_transforms: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            precise_by_default: true,
            refresh_stale_transforms: true,
        }
    }
}

impl CollisionConfig {
    /// Staleness policy matching `refresh_stale_transforms`
    pub fn stale_policy(&self) -> StalePolicy {
        if self.refresh_stale_transforms {
            StalePolicy::Refresh
        } else {
            StalePolicy::SampleAsIs
        }
    }
}

impl Config for CollisionConfig {}
