use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reservoir: ReservoirConfig,
    #[serde(default)]
    pub looksrare: LooksRareConfig,
    #[serde(default)]
    pub run: RunConfig,
    /// Project display name -> on-chain contract address.
    pub registry: HashMap<String, String>,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| format!("parse {path}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.run.max_pages == 0 {
            anyhow::bail!("invalid run.max_pages=0 (must be > 0)");
        }
        if self.reservoir.page_limit == 0 {
            anyhow::bail!("invalid reservoir.page_limit=0 (must be > 0)");
        }
        if self.reservoir.api_key_env.trim().is_empty() {
            anyhow::bail!("reservoir.api_key_env must not be empty");
        }
        if self.registry.is_empty() {
            anyhow::bail!("registry must list at least one project -> contract entry");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReservoirConfig {
    #[serde(default = "default_reservoir_base")]
    pub api_base: String,
    /// Env var name holding the Reservoir API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Default timeout applied to all HTTP requests (ms).
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
    /// TCP connect timeout for HTTP requests (ms).
    #[serde(default = "default_http_connect_timeout_ms")]
    pub http_connect_timeout_ms: u64,
    /// Records requested per page.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            api_base: default_reservoir_base(),
            api_key_env: default_api_key_env(),
            http_timeout_ms: default_http_timeout_ms(),
            http_connect_timeout_ms: default_http_connect_timeout_ms(),
            page_limit: default_page_limit(),
        }
    }
}

fn default_reservoir_base() -> String {
    "https://api.reservoir.tools".to_string()
}

fn default_api_key_env() -> String {
    "RESERVOIR_API_KEY".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_http_connect_timeout_ms() -> u64 {
    3_000
}

fn default_page_limit() -> usize {
    50
}

#[derive(Clone, Debug, Deserialize)]
pub struct LooksRareConfig {
    #[serde(default = "default_looksrare_base")]
    pub api_base: String,
}

impl Default for LooksRareConfig {
    fn default() -> Self {
        Self {
            api_base: default_looksrare_base(),
        }
    }
}

fn default_looksrare_base() -> String {
    "https://api.looksrare.org/api/v1".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Pages fetched per data kind before the run stops paginating.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("database.db")
}

fn default_max_pages() -> usize {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [registry]
            CryptoPunks = "0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb"
            "#,
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.run.max_pages, 15);
        assert_eq!(cfg.reservoir.page_limit, 50);
        assert_eq!(cfg.reservoir.api_key_env, "RESERVOIR_API_KEY");
        assert!(cfg.looksrare.api_base.contains("looksrare"));
    }

    #[test]
    fn zero_max_pages_is_rejected() {
        let cfg: Config = toml::from_str(
            r#"
            [run]
            max_pages = 0
            [registry]
            CryptoPunks = "0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb"
            "#,
        )
        .unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_registry_is_rejected() {
        let cfg: Config = toml::from_str("[registry]\n").unwrap();
        assert!(cfg.validate().is_err());
    }
}
