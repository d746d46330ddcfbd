//! Runtime configuration: provider credentials, retry policy, sanitizer
//! policy and probe limits. Loaded from the environment or a TOML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub pipeline: PipelineConfig,
    pub sanitizer: SanitizerConfig,
    pub verifier: VerifierConfig,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider identifier recorded in provenance.
    pub name: String,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub referer: Option<String>,
    pub app_title: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_attempts: u32,
    pub attempt_timeout_seconds: u64,
    pub max_prompt_length: usize,
    pub min_prompt_length: usize,
    pub dangerous_patterns: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SanitizerConfig {
    pub framework_url: String,
    pub allowed_script_hosts: Vec<String>,
    pub max_depth: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct VerifierConfig {
    pub enabled: bool,
    pub probe_timeout_seconds: u64,
    pub max_redirects: usize,
    pub concurrency: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "openrouter".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: "openai/gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 3000,
            timeout_seconds: 60,
            referer: Some("https://pagegen.app".to_string()),
            app_title: Some("PageSpark AI".to_string()),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("referer", &self.referer)
            .field("app_title", &self.app_title)
            .finish()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout_seconds: 90,
            max_prompt_length: 70_000,
            min_prompt_length: 10,
            dangerous_patterns: vec![
                "{{".to_string(),
                "}}".to_string(),
                "{%".to_string(),
                "%}".to_string(),
                "<script".to_string(),
                "javascript:".to_string(),
            ],
        }
    }
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            framework_url: TAILWIND_CDN.to_string(),
            allowed_script_hosts: vec![
                "cdn.tailwindcss.com".to_string(),
                "kit.fontawesome.com".to_string(),
                "cdn.jsdelivr.net".to_string(),
            ],
            max_depth: 512,
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_timeout_seconds: 5,
            max_redirects: 10,
            concurrency: 4,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl PipelineConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_seconds)
    }
}

impl VerifierConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

impl Config {
    /// Builds a config from the process environment, reading `.env` first.
    ///
    /// Required: `API_URL`, `API_KEY`, `MODEL`. Optional overrides:
    /// `MAX_ATTEMPTS`, `ATTEMPT_TIMEOUT_SECONDS`, `MAX_PROMPT_LENGTH`,
    /// `PROBE_TIMEOUT_SECONDS`, `VERIFY_RESOURCES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = ["API_URL", "API_KEY", "MODEL"];
        let missing: Vec<String> = required
            .iter()
            .filter(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let mut config = Config::default();
        config.provider.api_url = lookup("API_URL").unwrap_or_default();
        config.provider.api_key = lookup("API_KEY").unwrap_or_default();
        config.provider.model = lookup("MODEL").unwrap_or_default();

        if let Some(v) = lookup("MAX_ATTEMPTS") {
            config.pipeline.max_attempts = parse_var("MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("ATTEMPT_TIMEOUT_SECONDS") {
            config.pipeline.attempt_timeout_seconds = parse_var("ATTEMPT_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("MAX_PROMPT_LENGTH") {
            config.pipeline.max_prompt_length = parse_var("MAX_PROMPT_LENGTH", &v)?;
        }
        if let Some(v) = lookup("PROBE_TIMEOUT_SECONDS") {
            config.verifier.probe_timeout_seconds = parse_var("PROBE_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("VERIFY_RESOURCES") {
            config.verifier.enabled = parse_var("VERIFY_RESOURCES", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".to_string()));
        }
        if self.pipeline.attempt_timeout_seconds == 0 || self.provider.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }
        if self.verifier.enabled && self.verifier.probe_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("probe timeout must be non-zero".to_string()));
        }
        if self.pipeline.min_prompt_length > self.pipeline.max_prompt_length {
            return Err(ConfigError::Invalid(format!(
                "min_prompt_length {} exceeds max_prompt_length {}",
                self.pipeline.min_prompt_length, self.pipeline.max_prompt_length
            )));
        }
        if self.sanitizer.framework_url.trim().is_empty() {
            return Err(ConfigError::Invalid("framework_url cannot be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
