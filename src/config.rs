// Configuration file handling

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{Level, debug};

const APP_NAME: &str = "tasktracker";
const CONFIG_FILE: &str = "tasktracker.yml";

/// Settings read from `tasktracker.yml`
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the SQLite database file
    pub db_path: PathBuf,
    /// Ask before deleting a task
    pub confirm_delete: bool,
    /// Colourise task rows by status
    pub color: bool,
    /// Maximum tracing level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("tasks.db"),
            confirm_delete: true,
            color: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Per-user config file location, e.g. `~/.config/tasktracker/tasktracker.yml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the per-user file is used if
    /// present, otherwise the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content).wrap_err_with(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<Level> {
        Level::from_str(&self.log_level).map_err(|_| eyre!("Unknown log level: {}", self.log_level))
    }
}
