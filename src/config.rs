//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default, so a partial (or missing) file still yields
//! a runnable service. Secrets (API keys) are referenced by env-var name
//! in the config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub live_data: LiveDataConfig,
    pub history: HistoryConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// TTL and capacity for each independent cache instance.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub aggregate_ttl_secs: u64,
    pub aggregate_capacity: usize,
    pub live_ttl_secs: u64,
    pub live_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            aggregate_ttl_secs: 3600,
            aggregate_capacity: 100,
            live_ttl_secs: 900,
            live_capacity: 100,
        }
    }
}

impl CacheConfig {
    pub fn aggregate_ttl(&self) -> Duration {
        Duration::from_secs(self.aggregate_ttl_secs)
    }

    pub fn live_ttl(&self) -> Duration {
        Duration::from_secs(self.live_ttl_secs)
    }
}

/// API-Football (live fixtures, standings, predictions).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LiveDataConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Season used by `/live/*` routes when the caller omits one.
    pub default_season: u16,
}

impl Default for LiveDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://v3.football.api-sports.io".to_string(),
            api_key_env: "API_FOOTBALL_KEY".to_string(),
            timeout_secs: 30,
            default_season: 2024,
        }
    }
}

/// FBref scraping (historical tables).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Pause between consecutive page fetches inside one scraper session.
    pub request_delay_ms: u64,
    pub current_season: String,
    pub head_to_head_seasons: Vec<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fbref.com/en/comps".to_string(),
            timeout_secs: 30,
            request_delay_ms: 3000,
            current_season: "2425".to_string(),
            head_to_head_seasons: vec!["2425".into(), "2324".into(), "2223".into()],
        }
    }
}

/// Chat-completion provider (xAI Grok, OpenAI wire format).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.x.ai/v1/chat/completions".to_string(),
            model: "grok-beta".to_string(),
            api_key_env: "GROK_API_KEY".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Resolve an optional secret; unset or blank variables yield `None`.
    pub fn resolve_secret(env_name: &str) -> Option<SecretString> {
        Self::resolve_env(env_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::new)
    }
}
