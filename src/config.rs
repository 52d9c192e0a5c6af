use crate::constants::{SAPPORO_API, TOKYO_API};
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub sources: SourcesConfig,
}

/// Settings handed to the page fetcher at construction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Fixed wait before every request
    pub delay_ms: u64,
    /// Upper bound of the random extra wait added to `delay_ms`
    pub jitter_ms: u64,
    pub timeout_seconds: u64,
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay_ms: 1000,
            jitter_ms: 1000,
            timeout_seconds: 10,
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Source ids in run order
    pub enabled: Vec<String>,
    pub sapporo: KyobunConfig,
    pub tokyo: TokyoMusicConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: vec![SAPPORO_API.to_string(), TOKYO_API.to_string()],
            sapporo: KyobunConfig::default(),
            tokyo: TokyoMusicConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KyobunConfig {
    pub base_url: String,
}

impl Default for KyobunConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.kyobun.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokyoMusicConfig {
    pub base_url: String,
    pub live_house_sites: Vec<String>,
}

impl Default for TokyoMusicConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.tokyo-music.jp".to_string(),
            live_house_sites: vec![
                "https://www.livehouse.co.jp".to_string(),
                "https://www.tokyo-music.jp/livehouse".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
