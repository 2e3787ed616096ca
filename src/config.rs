use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CLICKUP_API_BASE: &str = "https://api.clickup.com/api/v2";
pub const DEFAULT_TINYURL_API_BASE: &str = "https://api.tinyurl.com";
pub const DEFAULT_TINYURL_DOMAIN: &str = "tinyurl.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AddinConfig {
    pub cache_dir: PathBuf,
    pub debug: bool,
    pub clickup: ClickUpConfig,
    pub tinyurl: TinyUrlConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClickUpConfig {
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TinyUrlConfig {
    pub api_base: String,
    pub domain: String,
}

impl Default for AddinConfig {
    fn default() -> Self {
        Self {
            cache_dir: data_dir().join("cache"),
            debug: false,
            clickup: ClickUpConfig::default(),
            tinyurl: TinyUrlConfig::default(),
        }
    }
}

impl Default for ClickUpConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_CLICKUP_API_BASE.into(),
        }
    }
}

impl Default for TinyUrlConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_TINYURL_API_BASE.into(),
            domain: DEFAULT_TINYURL_DOMAIN.into(),
        }
    }
}

impl AddinConfig {
    /// Configuration rooted at an explicit cache directory, everything else default.
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    pub fn auth_path(&self) -> PathBuf {
        self.cache_dir.join("auth.json")
    }

    pub fn projects_path(&self) -> PathBuf {
        self.cache_dir.join("projects.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.cache_dir.join("powertools.log")
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".powertools")
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config() -> Result<AddinConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AddinConfig> {
    if !path.exists() {
        return Ok(AddinConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AddinConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}
