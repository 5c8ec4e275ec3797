//! Configuration loading, validation, and management for DocChat.
//!
//! Loads configuration from `~/.docchat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.docchat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// HTTP timeout for a single model call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Chat turn limits and sampling
    #[serde(default)]
    pub chat: ChatConfig,

    /// Summary limits and sampling
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_request_timeout_secs() -> u64 {
    120
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("chat", &self.chat)
            .field("summary", &self.summary)
            .field("extraction", &self.extraction)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Limits for a chat turn. Every length is counted in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,

    /// Cap on the document context embedded in the system instruction
    #[serde(default = "default_context_char_limit")]
    pub context_char_limit: usize,

    /// Tighter cap used when the whole request is over `request_char_limit`
    #[serde(default = "default_fallback_context_char_limit")]
    pub fallback_context_char_limit: usize,

    /// Total request size that triggers the fallback cap
    #[serde(default = "default_request_char_limit")]
    pub request_char_limit: usize,

    /// History turns sent with each question
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// How far back from the cap a sentence or line boundary may be
    #[serde(default = "default_boundary_lookback")]
    pub boundary_lookback: usize,
}

fn default_chat_max_tokens() -> u32 {
    1000
}
fn default_chat_temperature() -> f32 {
    0.7
}
fn default_context_char_limit() -> usize {
    200_000
}
fn default_fallback_context_char_limit() -> usize {
    120_000
}
fn default_request_char_limit() -> usize {
    250_000
}
fn default_history_turns() -> usize {
    3
}
fn default_boundary_lookback() -> usize {
    1_000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_chat_max_tokens(),
            temperature: default_chat_temperature(),
            context_char_limit: default_context_char_limit(),
            fallback_context_char_limit: default_fallback_context_char_limit(),
            request_char_limit: default_request_char_limit(),
            history_turns: default_history_turns(),
            boundary_lookback: default_boundary_lookback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_summary_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_summary_temperature")]
    pub temperature: f32,

    #[serde(default = "default_summary_char_limit")]
    pub context_char_limit: usize,

    /// Word count the prompt asks the model to stay under
    #[serde(default = "default_summary_word_limit")]
    pub word_limit: usize,
}

fn default_summary_max_tokens() -> u32 {
    300
}
fn default_summary_temperature() -> f32 {
    0.5
}
fn default_summary_char_limit() -> usize {
    15_000
}
fn default_summary_word_limit() -> usize {
    200
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_summary_max_tokens(),
            temperature: default_summary_temperature(),
            context_char_limit: default_summary_char_limit(),
            word_limit: default_summary_word_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Rows of each sheet rendered into the text preview
    #[serde(default = "default_excel_preview_rows")]
    pub excel_preview_rows: usize,
}

fn default_excel_preview_rows() -> usize {
    100
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            excel_preview_rows: default_excel_preview_rows(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.docchat/config.toml).
    ///
    /// Also checks environment variables:
    /// - `DOCCHAT_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `DOCCHAT_PROVIDER`
    /// - `DOCCHAT_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("DOCCHAT_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("DOCCHAT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("DOCCHAT_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".docchat")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, temperature) in [
            ("chat.temperature", self.chat.temperature),
            ("summary.temperature", self.summary.temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        for (name, value) in [
            ("chat.context_char_limit", self.chat.context_char_limit),
            ("chat.fallback_context_char_limit", self.chat.fallback_context_char_limit),
            ("chat.request_char_limit", self.chat.request_char_limit),
            ("summary.context_char_limit", self.summary.context_char_limit),
            ("extraction.excel_preview_rows", self.extraction.excel_preview_rows),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{name} must be > 0")));
            }
        }

        if self.chat.fallback_context_char_limit > self.chat.context_char_limit {
            return Err(ConfigError::ValidationError(
                "chat.fallback_context_char_limit must not exceed chat.context_char_limit".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
            chat: ChatConfig::default(),
            summary: SummaryConfig::default(),
            extraction: ExtractionConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.chat.context_char_limit, 200_000);
        assert_eq!(config.chat.fallback_context_char_limit, 120_000);
        assert_eq!(config.chat.request_char_limit, 250_000);
        assert_eq!(config.chat.history_turns, 3);
        assert_eq!(config.summary.context_char_limit, 15_000);
        assert_eq!(config.extraction.excel_preview_rows, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.chat.max_tokens, 1000);
        assert_eq!(parsed.summary.max_tokens, 300);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.summary.temperature = 5.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("summary.temperature"));
    }

    #[test]
    fn fallback_cap_above_primary_rejected() {
        let mut config = AppConfig::default();
        config.chat.fallback_context_char_limit = 300_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_limit_rejected() {
        let mut config = AppConfig::default();
        config.extraction.excel_preview_rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "gpt-4o-mini"

[chat]
history_turns = 5

[providers.ollama]
api_url = "http://localhost:11434/v1"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.chat.history_turns, 5);
        assert_eq!(config.chat.context_char_limit, 200_000);
        assert_eq!(
            config.providers["ollama"].api_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_model = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "DOCCHAT_API_KEY" => Some("sk-docchat".into()),
            "OPENAI_API_KEY" => Some("sk-openai".into()),
            "DOCCHAT_MODEL" => Some("gpt-4.1".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-docchat"));
        assert_eq!(config.default_model, "gpt-4.1");
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn file_api_key_wins_over_env() {
        let mut config = AppConfig {
            api_key: Some("sk-file".into()),
            ..AppConfig::default()
        };
        config.apply_env_overrides(|key| (key == "OPENAI_API_KEY").then(|| "sk-env".into()));
        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o"));
        assert!(toml_str.contains("context_char_limit"));
    }
}
