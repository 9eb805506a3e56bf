//! Configuration loading, validation, and management for taskweave.
//!
//! Loads configuration from `~/.taskweave/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.taskweave/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generator backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Backend preset: gemini, openai, openrouter, ollama, custom
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name sent to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Overrides the preset's base URL (required for `custom`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout before falling back
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Workflow bounds and reflection settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Agent type → tool list; extends or replaces the built-in registry
    #[serde(default)]
    pub capabilities: BTreeMap<String, Vec<String>>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_request_timeout() -> u64 {
    60
}

/// Redact a secret string for Debug output.
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
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("engine", &self.engine)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Bounds and heuristics of the plan/execute/reflect loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Planner passes before completion is forced
    #[serde(default = "default_max_outer_iterations")]
    pub max_outer_iterations: u32,

    /// Attempt ceiling given to every new task
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Optional node-execution cap; unset leaves termination to the
    /// outer and attempt ceilings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,

    /// Words in a critique that ask for a follow-up task
    #[serde(default = "default_continuation_cues")]
    pub continuation_cues: Vec<String>,

    /// Result length shown in summaries before truncation
    #[serde(default = "default_result_preview_chars")]
    pub result_preview_chars: usize,
}

fn default_max_outer_iterations() -> u32 {
    5
}
fn default_max_attempts() -> u32 {
    3
}
fn default_continuation_cues() -> Vec<String> {
    vec!["additional".into(), "more".into()]
}
fn default_result_preview_chars() -> usize {
    150
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_outer_iterations: default_max_outer_iterations(),
            max_attempts: default_max_attempts(),
            max_steps: None,
            continuation_cues: default_continuation_cues(),
            result_preview_chars: default_result_preview_chars(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.taskweave/config.toml).
    ///
    /// Also checks environment variables:
    /// - `TASKWEAVE_API_KEY` (highest priority), `GOOGLE_API_KEY`, `OPENAI_API_KEY`
    /// - `TASKWEAVE_PROVIDER`, `TASKWEAVE_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
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

    /// Apply environment overrides using the given lookup.
    ///
    /// API keys only fill a missing key; provider and model always win.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key().is_none() {
            self.api_key = ["TASKWEAVE_API_KEY", "GOOGLE_API_KEY", "OPENAI_API_KEY"]
                .into_iter()
                .filter_map(|key| lookup(key))
                .find(|value| !is_placeholder(value));
        }

        if let Some(provider) = lookup("TASKWEAVE_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = lookup("TASKWEAVE_MODEL") {
            self.model = model;
        }
    }

    /// The API key, unless missing, blank or a `YOUR_...` placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !is_placeholder(key))
    }

    /// Check if a usable API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".taskweave")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.engine.max_outer_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "engine.max_outer_iterations must be at least 1".into(),
            ));
        }

        if self.engine.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "engine.max_attempts must be at least 1".into(),
            ));
        }

        if self.engine.max_steps == Some(0) {
            return Err(ConfigError::ValidationError(
                "engine.max_steps must be at least 1".into(),
            ));
        }

        if self.engine.continuation_cues.iter().any(|cue| cue.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "engine.continuation_cues must not contain blank words".into(),
            ));
        }

        if self.provider == "custom" && self.api_url.is_none() {
            return Err(ConfigError::ValidationError(
                "provider 'custom' requires api_url".into(),
            ));
        }

        Ok(())
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
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            engine: EngineConfig::default(),
            capabilities: BTreeMap::new(),
        }
    }
}

fn is_placeholder(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || key.starts_with("YOUR_")
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
