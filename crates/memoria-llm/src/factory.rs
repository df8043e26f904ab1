//! Factory for creating text generation providers.

use std::sync::Arc;

use memoria_core::config::{GeneratorProvider, GeneratorProviderConfig};
use memoria_core::error::{MemoriaError, MemoriaResult};
use memoria_core::traits::{GeneratorConfig, TextGenerator};

#[cfg(feature = "anthropic")]
use crate::anthropic::AnthropicGenerator;
#[cfg(feature = "gemini")]
use crate::gemini::GeminiGenerator;

/// Factory for creating text generation providers.
pub struct GeneratorFactory;

impl GeneratorFactory {
    /// Create a provider from the given configuration.
    pub fn create(
        provider: GeneratorProvider,
        config: GeneratorConfig,
    ) -> MemoriaResult<Arc<dyn TextGenerator>> {
        match provider {
            #[cfg(feature = "gemini")]
            GeneratorProvider::Gemini => Ok(Arc::new(GeminiGenerator::new(config)?)),
            #[cfg(feature = "anthropic")]
            GeneratorProvider::Anthropic => Ok(Arc::new(AnthropicGenerator::new(config)?)),
            #[allow(unreachable_patterns)]
            _ => Err(MemoriaError::UnsupportedProvider {
                provider: format!("{:?}", provider),
            }),
        }
    }

    /// Create a provider from a `[corrector]` configuration section.
    pub fn from_config(config: &GeneratorProviderConfig) -> MemoriaResult<Arc<dyn TextGenerator>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Create a Gemini provider with a specific model.
    pub fn gemini_with_model(model: impl Into<String>) -> MemoriaResult<Arc<dyn TextGenerator>> {
        let config = GeneratorConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(GeneratorProvider::Gemini, config)
    }

    /// Create an Anthropic provider with a specific model.
    pub fn anthropic_with_model(model: impl Into<String>) -> MemoriaResult<Arc<dyn TextGenerator>> {
        let config = GeneratorConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(GeneratorProvider::Anthropic, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_provider_and_model() {
        let config = GeneratorProviderConfig {
            provider: GeneratorProvider::Anthropic,
            config: GeneratorConfig {
                model: "claude-3-5-haiku-20241022".into(),
                api_key: Some("k".into()),
                ..Default::default()
            },
        };
        let generator = GeneratorFactory::from_config(&config).unwrap();
        assert_eq!(generator.model_name(), "claude-3-5-haiku-20241022");
    }

    #[test]
    fn test_default_corrector_is_gemini() {
        let mut config = GeneratorProviderConfig::default();
        config.config.api_key = Some("k".into());
        let generator = GeneratorFactory::from_config(&config).unwrap();
        assert_eq!(generator.model_name(), "gemini-2.5-flash");
    }
}
