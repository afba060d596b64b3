//! Settings file handling
//!
//! Handles TOML parsing and validation of `~/.crc/crc-settings.toml`

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::{CRC_HOME_DIR, DAEMON_SOCKET_NAME, SETTINGS_FILE_NAME};
use crate::logging::LogLevel;

/// Main settings structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaneSettings {
    pub daemon: DaemonSettings,
    pub logging: LoggingSettings,
    pub apply: ApplySettings,
}

/// How to reach the daemon
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Path of the daemon's command socket
    pub socket_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplySettings {
    /// Skip the confirmation prompt
    pub assume_yes: bool,
}

impl Default for PaneSettings {
    fn default() -> Self {
        Self {
            daemon: DaemonSettings::default(),
            logging: LoggingSettings::default(),
            apply: ApplySettings::default(),
        }
    }
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            socket_path: crc_home().join(DAEMON_SOCKET_NAME),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: LogLevel::Error }
    }
}

impl PaneSettings {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        crc_home().join(SETTINGS_FILE_NAME)
    }

    /// Load settings from `path`, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: PaneSettings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.daemon.socket_path.as_os_str().is_empty() {
            anyhow::bail!("Invalid daemon.socket_path: must not be empty");
        }
        Ok(())
    }
}

fn crc_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CRC_HOME_DIR)
}
