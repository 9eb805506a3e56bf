//! Generator backends for taskweave.
//!
//! [`OpenAiCompatBackend`] talks to a model endpoint; [`FallbackGenerator`]
//! wraps it so that generation never fails. [`build_from_config`] assembles
//! the pair from the application config.

pub mod fallback;
pub mod openai_compat;

pub use fallback::{FallbackGenerator, fallback_response};
pub use openai_compat::OpenAiCompatBackend;

use std::sync::Arc;
use std::time::Duration;
use taskweave_config::AppConfig;
use taskweave_core::generator::Completion;
use tracing::{info, warn};

/// Build the backend named by `config.provider`, if it can be built.
///
/// Returns `None` when credentials are missing or the preset is unknown;
/// Ollama needs no key.
pub fn build_backend(config: &AppConfig) -> Option<OpenAiCompatBackend> {
    let key = config.api_key();
    let model = config.model.clone();

    let backend = match (config.provider.as_str(), config.api_url.as_deref()) {
        ("ollama", url) => OpenAiCompatBackend::ollama(url, model),
        ("custom", Some(url)) => {
            OpenAiCompatBackend::new("custom", url, key.unwrap_or_default(), model)
        }
        // An explicit URL overrides the preset's endpoint
        (preset @ ("gemini" | "openai" | "openrouter"), Some(url)) => {
            OpenAiCompatBackend::new(preset, url, key?, model)
        }
        ("gemini", None) => OpenAiCompatBackend::gemini(key?, model),
        ("openai", None) => OpenAiCompatBackend::openai(key?, model),
        ("openrouter", None) => OpenAiCompatBackend::openrouter(key?, model),
        (other, _) => {
            warn!(provider = %other, "Unsupported generator provider configuration");
            return None;
        }
    };

    Some(
        backend
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens),
    )
}

/// Build the generator used by the engine.
///
/// Availability is decided here, once: without a usable backend every prompt
/// is answered from the fallback table.
pub fn build_from_config(config: &AppConfig) -> FallbackGenerator {
    match build_backend(config) {
        Some(backend) => {
            info!(
                provider = %config.provider,
                model = %config.model,
                "Generator backend configured"
            );
            let backend: Arc<dyn Completion> = Arc::new(backend);
            FallbackGenerator::new(backend, Duration::from_secs(config.request_timeout_secs))
        }
        None => {
            warn!(provider = %config.provider, "No usable generator backend, using fallback mode");
            FallbackGenerator::offline()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskweave_core::generator::Generator;

    #[test]
    fn missing_key_means_offline() {
        let config = AppConfig::default();
        assert!(build_backend(&config).is_none());
        assert!(!build_from_config(&config).is_available());
    }

    #[test]
    fn gemini_with_key_is_available() {
        let config = AppConfig {
            api_key: Some("g-key".into()),
            ..AppConfig::default()
        };
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.name(), "gemini");
        assert!(build_from_config(&config).is_available());
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = AppConfig {
            provider: "ollama".into(),
            model: "llama3".into(),
            ..AppConfig::default()
        };
        let backend = build_backend(&config).unwrap();
        assert!(backend.base_url().contains("11434"));
    }

    #[test]
    fn api_url_overrides_preset() {
        let config = AppConfig {
            provider: "openai".into(),
            api_key: Some("k".into()),
            api_url: Some("http://proxy.local/v1".into()),
            ..AppConfig::default()
        };
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.base_url(), "http://proxy.local/v1");
        assert_eq!(backend.name(), "openai");
    }

    #[test]
    fn unknown_provider_is_offline() {
        let config = AppConfig {
            provider: "carrier_pigeon".into(),
            api_key: Some("k".into()),
            ..AppConfig::default()
        };
        assert!(build_backend(&config).is_none());
    }
}
