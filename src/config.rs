use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, bail, eyre};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Process-wide settings, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub proxy_url: Option<String>,
    /// Seconds allowed for transcript extraction
    pub extract_timeout: f64,
    /// Seconds allowed for the LLM completion
    pub llm_timeout: f64,
    pub languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            proxy_url: None,
            extract_timeout: 15.0,
            llm_timeout: 10.0,
            languages: vec!["fr".to_string(), "en".to_string()],
        }
    }
}

impl Config {
    /// Load config from the given file, or ~/.config/ytdigest/config.toml if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Apply overrides from the process environment (and a `.env` file, if present)
    pub fn with_env(self) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup; empty values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = get("LLM_MODEL") {
            self.model = model;
        }
        if let Some(proxy) = get("PROXY_URL") {
            self.proxy_url = Some(proxy);
        }
        if let Some(secs) = get("EXTRACT_TIMEOUT") {
            self.extract_timeout = parse_seconds("EXTRACT_TIMEOUT", &secs)?;
        }
        if let Some(secs) = get("LLM_TIMEOUT") {
            self.llm_timeout = parse_seconds("LLM_TIMEOUT", &secs)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        to_duration("extract_timeout", self.extract_timeout)?;
        to_duration("llm_timeout", self.llm_timeout)?;
        if self.languages.is_empty() {
            bail!("languages must list at least one language code");
        }
        Ok(())
    }

    pub fn extract_timeout(&self) -> Result<Duration> {
        to_duration("extract_timeout", self.extract_timeout)
    }

    pub fn llm_timeout(&self) -> Result<Duration> {
        to_duration("llm_timeout", self.llm_timeout)
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| eyre!("OPENAI_API_KEY environment variable not set (required for summarization)"))
    }

    /// Proxy URL with an `http://` scheme added when none was given
    pub fn proxy(&self) -> Option<String> {
        self.proxy_url
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(normalize_proxy_url)
    }
}

pub fn normalize_proxy_url(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    }
}

fn parse_seconds(name: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| eyre!("{name} must be a number of seconds, got {raw:?}: {e}"))
}

fn to_duration(name: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("{name} must be a positive number of seconds, got {secs}");
    }
    Duration::try_from_secs_f64(secs).map_err(|e| eyre!("{name} is out of range: {e}"))
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytdigest")
        .join("config.toml")
}
