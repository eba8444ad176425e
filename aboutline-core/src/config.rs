//! Configuration management for aboutline

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::extract::{HeadingPattern, DEFAULT_MARKER};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeVariant,
    pub outline: OutlineConfig,
    #[cfg(feature = "watch")]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeVariant {
    Dark,
    Light,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Literal text introducing a heading label
    pub marker: String,
    /// Raw regular expression overriding `marker`; group 1 is the label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub visible: bool,
    pub side: OutlineSide,
    pub width: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlineSide {
    Left,
    Right,
}

#[cfg(feature = "watch")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub enabled: bool,
    pub auto_reload: bool,
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::Dark,
            outline: OutlineConfig::default(),
            #[cfg(feature = "watch")]
            watch: WatchConfig::default(),
        }
    }
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            pattern: None,
            visible: true,
            side: OutlineSide::Left,
            width: 32,
        }
    }
}

#[cfg(feature = "watch")]
impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_reload: true,
            debounce_ms: 250,
        }
    }
}

impl OutlineConfig {
    /// Compile the configured heading pattern
    pub fn heading_pattern(&self) -> Result<HeadingPattern> {
        match &self.pattern {
            Some(source) => HeadingPattern::from_regex(source),
            None => HeadingPattern::new(&self.marker)
                .with_context(|| format!("Invalid heading marker: {:?}", self.marker)),
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "aboutline")
            .map(|proj_dirs| proj_dirs.config_dir().join("aboutline.toml"))
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
