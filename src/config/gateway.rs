// src/config/gateway.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

pub const ENV_CONFIG_PATH: &str = "GATEWAY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.toml";

pub const ENV_NEWS_BASE_URL: &str = "NEWS_API_BASE_URL";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_NEWS_LANGUAGE: &str = "NEWS_LANGUAGE";
pub const ENV_NEWS_DEFAULT_LIMIT: &str = "NEWS_DEFAULT_LIMIT";
pub const ENV_SENTIMENT_URL: &str = "SENTIMENT_API_URL";

fn default_news_base_url() -> String {
    "https://data-api.cryptocompare.com/news/v1".to_string()
}
fn default_sentiment_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_language() -> String {
    "EN".to_string()
}
fn default_limit() -> i64 {
    20
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// `"ENV"` means: read from `NEWS_API_KEY`. Absent key = unauthenticated mode.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_limit")]
    pub default_limit: i64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            api_key: None,
            language: default_language(),
            default_limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_sentiment_base_url")]
    pub base_url: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            base_url: default_sentiment_base_url(),
        }
    }
}

impl GatewayConfig {
    /// Parse a TOML file, then apply env overrides and validate.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading gateway config from {}", path.display()))?;
        let mut cfg: GatewayConfig = toml::from_str(&data)
            .with_context(|| format!("parsing gateway config {}", path.display()))?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolution order:
    /// 1) $GATEWAY_CONFIG_PATH (must exist)
    /// 2) config/gateway.toml
    /// 3) built-in defaults
    ///
    /// Env overrides apply on top in every case.
    pub fn from_env() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from_file(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from_file(&default_path);
        }
        let mut cfg = Self::default();
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = non_empty_env(ENV_NEWS_BASE_URL) {
            self.news.base_url = v;
        }
        if let Some(v) = non_empty_env(ENV_SENTIMENT_URL) {
            self.sentiment.base_url = v;
        }
        if let Some(v) = non_empty_env(ENV_NEWS_LANGUAGE) {
            self.news.language = v;
        }
        if let Some(v) = non_empty_env(ENV_NEWS_DEFAULT_LIMIT) {
            self.news.default_limit = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_NEWS_DEFAULT_LIMIT} is not an integer: {v}"))?;
        }

        // Env key wins; "ENV" placeholder in the file resolves from env or drops to None.
        let file_key = self.news.api_key.take();
        self.news.api_key = match non_empty_env(ENV_NEWS_API_KEY) {
            Some(k) => Some(k),
            None => file_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty() && !k.eq_ignore_ascii_case("env")),
        };
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        for (name, url) in [
            ("news.base_url", &self.news.base_url),
            ("sentiment.base_url", &self.sentiment.base_url),
        ] {
            let parsed = reqwest::Url::parse(url).with_context(|| format!("{name} is not a URL: {url}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(anyhow!("{name} must be http(s), got {url}"));
            }
        }
        if self.news.default_limit <= 0 {
            return Err(anyhow!(
                "news.default_limit must be positive, got {}",
                self.news.default_limit
            ));
        }
        self.news.language = self.news.language.trim().to_ascii_uppercase();
        if self.news.language.is_empty() {
            self.news.language = default_language();
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
