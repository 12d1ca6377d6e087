use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Write the in-memory stores to disk when a command finishes
    #[serde(default = "default_true")]
    pub persist: bool,
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncConfig {
    /// Fetch details of every reviewed movie after a review sync
    #[serde(default = "default_true")]
    pub warm_movie_details: bool,
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_snapshot_file() -> String {
    "cache.bin".to_string()
}

fn default_base_url() -> String {
    "https://api.reelnotes.example/v1".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persist: default_true(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            warm_movie_details: default_true(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it does not exist yet
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("api.base_url is required and cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("api.base_url must start with http:// or https://"));
        }
        if self.api.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("api.timeout_seconds must be greater than zero"));
        }
        if self.cache.snapshot_file.trim().is_empty() {
            return Err(anyhow::anyhow!("cache.snapshot_file cannot be empty"));
        }
        Ok(())
    }
}
