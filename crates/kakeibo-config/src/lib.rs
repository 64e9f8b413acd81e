//! Configuration management for kakeibo
//!
//! This module handles loading, validation, and management of
//! kakeibo configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Raw bank export settings (`cashtrade` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTradeConfig {
    /// Base directory holding one sub-directory per year-month
    #[serde(default)]
    pub file_path: PathBuf,
    /// Preamble lines before the header row
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    /// Text encoding label understood by encoding_rs
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for CashTradeConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::new(),
            skip_rows: default_skip_rows(),
            encoding: default_encoding(),
        }
    }
}

fn default_skip_rows() -> usize {
    7
}

fn default_encoding() -> String {
    "shift_jis".to_string()
}

/// Intermediate ledger file settings (`tmp` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmpConfig {
    /// Base directory of the processed ledger files
    #[serde(default)]
    pub file_path: PathBuf,
    /// Text encoding label of the processed ledger files
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for TmpConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::new(),
            encoding: default_encoding(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

/// Chart and display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Money values are divided by this before display (10000 = 万円)
    #[serde(default = "default_unit_divisor")]
    pub unit_divisor: u32,
    /// Chart title
    #[serde(default = "default_title")]
    pub title: String,
    /// Y-axis tick prefix
    #[serde(default = "default_tick_prefix")]
    pub tick_prefix: String,
    /// Y-axis tick suffix
    #[serde(default = "default_tick_suffix")]
    pub tick_suffix: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            unit_divisor: default_unit_divisor(),
            title: default_title(),
            tick_prefix: default_tick_prefix(),
            tick_suffix: default_tick_suffix(),
        }
    }
}

fn default_unit_divisor() -> u32 {
    10000
}

fn default_title() -> String {
    "残高の推移".to_string()
}

fn default_tick_prefix() -> String {
    "¥".to_string()
}

fn default_tick_suffix() -> String {
    "万".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Raw bank export settings
    #[serde(default)]
    pub cashtrade: CashTradeConfig,
    /// Intermediate ledger file settings
    #[serde(default)]
    pub tmp: TmpConfig,
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Chart settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cashtrade.file_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "cashtrade.file_path".to_string(),
            });
        }

        if self.tmp.file_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "tmp.file_path".to_string(),
            });
        }

        for (field, label) in [
            ("cashtrade.encoding", &self.cashtrade.encoding),
            ("tmp.encoding", &self.tmp.encoding),
        ] {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("Unknown text encoding '{}'", label),
                });
            }
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.dashboard.unit_divisor == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.unit_divisor".to_string(),
                reason: "Unit divisor must be greater than 0".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Directory holding the raw export of a month
    pub fn cashtrade_month_dir(&self, year_month: &str) -> PathBuf {
        self.cashtrade.file_path.join(year_month)
    }

    /// Directory holding the processed ledger of a month
    pub fn tmp_month_dir(&self, year_month: &str) -> PathBuf {
        self.tmp.file_path.join(year_month)
    }
}
