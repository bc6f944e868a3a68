use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::columns::LogicalField;
use crate::dashboard::{DashboardOptions, DEFAULT_TOP_N};
use crate::table::LoadOptions;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read and parse `config.toml` from this directory. A missing file yields the defaults.
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub dashboard: DashboardConfig,
    /// Logical field key → literal column name
    pub columns: BTreeMap<String, String>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub infer_schema_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: Option<PathBuf>,
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            dashboard: DashboardConfig::default(),
            columns: BTreeMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Defaults merged with the user file in `manager`'s directory. A missing file means
    /// defaults; an unreadable or malformed one is an error.
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(manager.load_config()?);
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.dashboard.merge(other.dashboard);
        self.columns.extend(other.columns);
        self.logging.merge(other.logging);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.dashboard.top_n == 0 {
            return Err(eyre!("top_n must be greater than 0"));
        }

        for (field, column) in &self.columns {
            if LogicalField::from_key(field).is_none() {
                let known: Vec<&str> = LogicalField::ALL.iter().map(|f| f.key()).collect();
                return Err(eyre!(
                    "Unknown column field '{}'. Must be one of: {}",
                    field,
                    known.join(", ")
                ));
            }
            if column.trim().is_empty() {
                return Err(eyre!("Column name for '{}' must not be empty", field));
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(eyre!(
                    "Invalid logging level: {}. Must be one of trace, debug, info, warn, error",
                    self.logging.level
                ))
            }
        }

        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.file_loading.delimiter,
            has_header: self.file_loading.has_header,
            infer_schema_length: self.file_loading.infer_schema_length,
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            top_n: self.dashboard.top_n,
        }
    }
}

// Merge implementations for each config section
impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.has_header.is_some() {
            self.has_header = other.has_header;
        }
        if other.infer_schema_length.is_some() {
            self.infer_schema_length = other.infer_schema_length;
        }
    }
}

impl DashboardConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DashboardConfig::default();
        if other.data_path.is_some() {
            self.data_path = other.data_path;
        }
        if other.top_n != default.top_n {
            self.top_n = other.top_n;
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        if other.level != default.level {
            self.level = other.level;
        }
        if other.json != default.json {
            self.json = other.json;
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: AppConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed, AppConfig::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_merge_keeps_unset_sections() {
        let mut base = AppConfig::default();
        base.file_loading.delimiter = Some(b';');
        let other: AppConfig = toml::from_str(
            r#"
            [dashboard]
            top_n = 5
            "#,
        )
        .unwrap();
        base.merge(other);
        assert_eq!(base.dashboard.top_n, 5);
        assert_eq!(base.file_loading.delimiter, Some(b';'));
        assert_eq!(base.logging.level, "info");
    }
}
