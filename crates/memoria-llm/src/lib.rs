//! memoria-llm - Text generation providers for the memoria corrector.
//!
//! The corrector is optional: it asks a hosted model to fill unspecified
//! fields from the full text and fix OCR number formatting.
//!
//! # Supported Providers
//!
//! - **Gemini** (feature: `gemini`) - Gemini 2.5 Flash by default
//! - **Anthropic** (feature: `anthropic`) - Claude 3.5 and later
//!
//! # Example
//!
//! ```ignore
//! use memoria_llm::GeneratorFactory;
//! use memoria_core::LlmCorrector;
//!
//! let generator = GeneratorFactory::gemini_with_model("gemini-2.5-flash")?;
//! let corrector = LlmCorrector::new(generator);
//! ```

#[cfg(feature = "anthropic")]
mod anthropic;
mod factory;
#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicGenerator;
pub use factory::GeneratorFactory;
#[cfg(feature = "gemini")]
pub use gemini::GeminiGenerator;

// Re-export core types for convenience
pub use memoria_core::config::{GeneratorProvider, GeneratorProviderConfig};
pub use memoria_core::traits::{GenerationOptions, GeneratorConfig, TextGenerator};
