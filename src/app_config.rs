use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.

/// Default scheduler poll interval in milliseconds
fn default_poll_interval_ms() -> u64 {
    800
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_max_batch_chars() -> usize {
    6000
}

fn default_max_tokens() -> u32 {
    4096
}

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Scheduler poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Translation engine config
    #[serde(default)]
    pub engine: EngineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            engine: EngineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Translation engine provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineProvider {
    /// Deterministic offline engine
    #[default]
    Mock,
    /// OpenAI chat-completion API
    #[serde(rename = "openai")]
    OpenAi,
}

impl EngineProvider {
    /// Lowercase provider identifier, as stored in the usage ledger
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for EngineProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EngineProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAi),
            _ => Err(anyhow!("Invalid engine provider: {}", s)),
        }
    }
}

/// Engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Which engine variant to construct
    #[serde(default)]
    pub provider: EngineProvider,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; may also arrive via environment through the CLI
    #[serde(default)]
    pub api_key: String,

    /// Endpoint override; empty selects the provider's public endpoint
    #[serde(default)]
    pub endpoint: String,

    /// Maximum attempts per network call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for linear backoff, milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds, enforced by the HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Character budget for one batch-translation chunk
    #[serde(default = "default_max_batch_chars")]
    pub max_batch_chars: usize,

    /// Maximum output tokens requested per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: EngineProvider::default(),
            model: default_model(),
            api_key: String::new(),
            endpoint: String::new(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            max_batch_chars: default_max_batch_chars(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            )
        })?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Credential and endpoint problems are configuration errors and fail
    /// here, before any job can be scheduled against a broken engine.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than 0"));
        }
        if self.engine.provider == EngineProvider::OpenAi && self.engine.api_key.trim().is_empty()
        {
            return Err(anyhow!("API key is required for the openai engine"));
        }
        if !self.engine.endpoint.trim().is_empty() {
            Url::parse(self.engine.endpoint.trim())
                .map_err(|e| anyhow!("Invalid engine endpoint: {}", e))?;
        }
        if self.engine.max_batch_chars == 0 {
            return Err(anyhow!("max_batch_chars must be greater than 0"));
        }
        Ok(())
    }
}
