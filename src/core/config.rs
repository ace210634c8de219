//! Configuration management with layered hierarchy
//!
//! Built-in defaults, then the user config file, then command-line flags
//! (which also read `RJQ_DATA_DIR` / `RJQ_LOG_LEVEL` from the environment).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default flange-per-joint bound applied by the CLI
pub const DEFAULT_MAX_FLANGE_QUANTITY: u32 = 4;

/// Default quote validity printed in reports
pub const DEFAULT_VALIDITY_DAYS: u32 = 30;

pub const DEFAULT_CURRENCY: &str = "CNY";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Valid configuration keys
pub const VALID_KEYS: &[(&str, &str)] = &[
    ("data_dir", "Directory holding the product catalog and logs"),
    ("log_level", "Log level (trace, debug, info, warn, error)"),
    (
        "max_flange_quantity",
        "Largest flange count per joint accepted by `quote` (0 = no limit)",
    ),
    ("currency", "Currency label printed on quotation reports"),
    ("validity_days", "Quote validity in days printed on reports"),
    ("company", "Company name printed in the report header"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown configuration key '{0}'. Run 'rjq config keys' for the list")]
    UnknownKey(String),

    #[error("invalid value '{value}' for '{key}': expected a whole number")]
    InvalidNumber { key: String, value: String },

    #[error("no user configuration directory available")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },
}

/// RJQ configuration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_flange_quantity: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Config {
    /// Load configuration: defaults merged with the user config file.
    ///
    /// Runs before logging starts, so an unreadable or malformed file is
    /// returned to the caller rather than logged here.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                let file_config = Self::read_file(&path).map_err(|source| ConfigError::File {
                    path: path.clone(),
                    source: Box::new(source),
                })?;
                config.merge(file_config);
            }
        }
        Ok(config)
    }

    /// Read a single config file
    pub fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Write this config to `path`, creating the directory if needed
    pub fn write_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yml::to_string(self)?)?;
        Ok(())
    }

    /// Path to the user config file (`RJQ_CONFIG` overrides the platform location)
    pub fn global_config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os("RJQ_CONFIG") {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("", "", "rjq")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.max_flange_quantity.is_some() {
            self.max_flange_quantity = other.max_flange_quantity;
        }
        if other.currency.is_some() {
            self.currency = other.currency;
        }
        if other.validity_days.is_some() {
            self.validity_days = other.validity_days;
        }
        if other.company.is_some() {
            self.company = other.company;
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Flange-per-joint bound, or `None` when disabled with 0
    pub fn flange_limit(&self) -> Option<u32> {
        match self.max_flange_quantity {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_MAX_FLANGE_QUANTITY),
        }
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn validity_days(&self) -> u32 {
        self.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS)
    }

    /// Current value of a key as text, if set
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "data_dir" => self.data_dir.as_ref().map(|p| p.display().to_string()),
            "log_level" => self.log_level.clone(),
            "max_flange_quantity" => self.max_flange_quantity.map(|n| n.to_string()),
            "currency" => self.currency.clone(),
            "validity_days" => self.validity_days.map(|n| n.to_string()),
            "company" => self.company.clone(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "data_dir" => self.data_dir = Some(PathBuf::from(value)),
            "log_level" => self.log_level = Some(value.to_string()),
            "max_flange_quantity" => self.max_flange_quantity = Some(parse_number(key, value)?),
            "currency" => self.currency = Some(value.to_string()),
            "validity_days" => self.validity_days = Some(parse_number(key, value)?),
            "company" => self.company = Some(value.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "data_dir" => self.data_dir = None,
            "log_level" => self.log_level = None,
            "max_flange_quantity" => self.max_flange_quantity = None,
            "currency" => self.currency = None,
            "validity_days" => self.validity_days = None,
            "company" => self.company = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}
