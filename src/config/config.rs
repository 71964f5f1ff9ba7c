use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Controls how the converter interprets raw values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Raw value Tableau uses for NULL; converted to `DataValue::Null`
    pub null_token: String,

    /// chrono format for `date` columns (JS API default is YYYY-MM-DD)
    pub date_format: String,

    /// chrono format for `datetime` columns
    pub datetime_format: String,

    /// Case-insensitive tokens accepted as `true` in boolean columns
    pub truthy_tokens: Vec<String>,

    /// Case-insensitive tokens accepted as `false` in boolean columns
    pub falsy_tokens: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            null_token: "%null%".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            truthy_tokens: ["true", "1", "yes", "t", "y"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            falsy_tokens: ["false", "0", "no", "f", "n"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ConverterConfig {
    /// Load config from the default location, falling back to defaults when
    /// no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load config from a specific TOML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ConverterConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save config to a specific path, creating parent directories as needed
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("tableau-data").join("config.toml"))
    }

    pub fn is_truthy(&self, token: &str) -> bool {
        self.truthy_tokens
            .iter()
            .any(|t| t.eq_ignore_ascii_case(token))
    }

    pub fn is_falsy(&self, token: &str) -> bool {
        self.falsy_tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
    }
}
