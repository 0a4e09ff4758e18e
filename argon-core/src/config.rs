//! Configuration for Argon
//!
//! Loads user configuration from `~/.config/argon/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ArgonError, Result};
use crate::types::{SourceOptions, ThumbnailSize};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Default enumeration settings
    #[serde(default)]
    pub defaults: DefaultSettings,

    /// Daemon settings
    #[serde(default)]
    pub daemon: DaemonSettings,
}

/// Default enumeration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultSettings {
    /// Include window sources by default
    #[serde(default = "default_true")]
    pub capture_window: bool,

    /// Include screen sources by default
    #[serde(default = "default_true")]
    pub capture_screen: bool,

    /// Default thumbnail width in pixels
    #[serde(default = "default_thumbnail_dim")]
    pub thumbnail_width: u32,

    /// Default thumbnail height in pixels
    #[serde(default = "default_thumbnail_dim")]
    pub thumbnail_height: u32,

    /// Fetch window application icons by default
    #[serde(default)]
    pub fetch_window_icons: bool,
}

/// Daemon settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonSettings {
    /// Socket path override (default: runtime-dir socket)
    #[serde(default)]
    pub socket: Option<PathBuf>,
}

fn default_thumbnail_dim() -> u32 {
    150
}

fn default_true() -> bool {
    true
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            capture_window: true,
            capture_screen: true,
            thumbnail_width: default_thumbnail_dim(),
            thumbnail_height: default_thumbnail_dim(),
            fetch_window_icons: false,
        }
    }
}

impl DefaultSettings {
    /// Build the request options these defaults describe
    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            capture_window: self.capture_window,
            capture_screen: self.capture_screen,
            thumbnail_size: ThumbnailSize::new(self.thumbnail_width, self.thumbnail_height),
            fetch_window_icons: self.fetch_window_icons,
        }
    }
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("argon").join("config.toml")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("argon")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/argon/config.toml")
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ArgonError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| ArgonError::Config(format!("Failed to parse config file: {}", e)))?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, logging warnings but returning defaults on error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path())
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ArgonError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ArgonError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&path, content)
            .map_err(|e| ArgonError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Create a default config file if it doesn't exist
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_path();
        if path.exists() {
            return Ok(false);
        }

        let config = Self::default();
        config.save_to(path)?;
        Ok(true)
    }
}

/// Generate a sample configuration file
pub fn sample_config() -> String {
    r#"# Argon Configuration
# https://github.com/ghostkellz/argon

[defaults]
# Include individual windows when enumerating sources
capture_window = true

# Include full screens/monitors when enumerating sources
capture_screen = true

# Thumbnail dimensions in pixels
thumbnail_width = 150
thumbnail_height = 150

# Also fetch application icons for window sources
fetch_window_icons = false

[daemon]
# Socket path override. When unset, the daemon listens on
# $XDG_RUNTIME_DIR/argon.sock (or /tmp/argon-<uid>.sock).
# socket = "/run/user/1000/argon.sock"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.defaults.capture_window);
        assert!(config.defaults.capture_screen);
        assert_eq!(config.defaults.thumbnail_width, 150);
        assert!(!config.defaults.fetch_window_icons);
        assert!(config.daemon.socket.is_none());
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = sample_config();
        let config: ConfigFile = toml::from_str(&sample).unwrap();
        assert_eq!(config.defaults.thumbnail_height, 150);
    }

    #[test]
    fn test_defaults_to_source_options() {
        let options = ConfigFile::default().defaults.source_options();
        assert_eq!(options, SourceOptions::all(ThumbnailSize::new(150, 150)));
    }
}
