use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use oe_observers::{AlertConfig, LoggerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerSettings {
    pub enabled: bool,
    #[serde(flatten)]
    pub observer: LoggerConfig,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            observer: LoggerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertSettings {
    pub enabled: bool,
    #[serde(flatten)]
    pub observer: AlertConfig,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            observer: AlertConfig::default(),
        }
    }
}

/// Settings for one replay run. Every field has a default, so a config file
/// only needs the keys it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReplayConfig {
    pub input: Option<PathBuf>,
    pub logger: LoggerSettings,
    pub alerts: AlertSettings,
    pub output: OutputFormat,
    pub metrics: bool,
}

impl ReplayConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}
