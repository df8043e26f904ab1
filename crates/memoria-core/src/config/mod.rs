//! Configuration system for memoria.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MemoriaError, MemoriaResult};
use crate::traits::GeneratorConfig;

/// Text generation provider type for the corrector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorProvider {
    #[default]
    Gemini,
    Anthropic,
}

/// Provider configuration with type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorProviderConfig {
    /// Provider type.
    pub provider: GeneratorProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: GeneratorConfig,
}

impl Default for GeneratorProviderConfig {
    fn default() -> Self {
        Self {
            provider: GeneratorProvider::Gemini,
            config: GeneratorConfig {
                model: "gemini-2.5-flash".to_string(),
                ..Default::default()
            },
        }
    }
}

/// Text acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Embedded text shorter than this (in characters) triggers optical recognition.
    pub min_text_length: usize,
    /// Whether optical recognition may be attempted at all.
    pub ocr_enabled: bool,
    /// Tesseract language code.
    pub ocr_language: String,
    /// Page render resolution for recognition.
    pub ocr_dpi: u32,
    /// Upper bound on the recognition step, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_timeout_secs: Option<u64>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 100,
            ocr_enabled: true,
            ocr_language: "spa".to_string(),
            ocr_dpi: 300,
            ocr_timeout_secs: None,
        }
    }
}

impl AcquisitionConfig {
    pub fn ocr_timeout(&self) -> Option<Duration> {
        self.ocr_timeout_secs.map(Duration::from_secs)
    }
}

/// Field extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Label-anchored values are cut at the first of these words.
    pub stop_keywords: Vec<String>,
    /// Boundary segments used to compose a missing description.
    pub description_segment_limit: usize,
    /// Characters of source text used when no segments exist.
    pub description_char_limit: usize,
    /// Source text shorter than this never becomes a description.
    pub description_fallback_min_chars: usize,
    /// Separator between "label = length" items in a composed description.
    pub description_separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            stop_keywords: ["PADRON", "LUGAR", "DOMINIO", "OBJETO", "TITULAR", "MINISTERIO"]
                .into_iter()
                .map(String::from)
                .collect(),
            description_segment_limit: 10,
            description_char_limit: 800,
            description_fallback_min_chars: 100,
            description_separator: "; ".to_string(),
        }
    }
}

/// Rendered document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub title: String,
    pub footer: String,
    /// Used in the closing line when no place was extracted.
    pub default_locality: String,
    pub closing_statement: String,
    pub font_family: String,
    pub font_size_pt: u32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            title: "MEMORIA DESCRIPTIVA".to_string(),
            footer: "Agrimensores SDE - Santiago del Estero".to_string(),
            default_locality: "Santiago del Estero".to_string(),
            closing_statement:
                "Con esto se dan por finalizadas las operaciones de mensura y división."
                    .to_string(),
            font_family: "Times New Roman".to_string(),
            font_size_pt: 12,
        }
    }
}

/// Output artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root under which `outputs/memorias/` is created.
    pub root: PathBuf,
    /// Documents processed in parallel by the batch runner.
    pub concurrency: usize,
    /// Also write the extraction JSON beside each document.
    pub write_data: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            concurrency: 4,
            write_data: true,
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// End the run in `error` when acquisition failed and produced no text.
    pub fail_on_empty_acquisition: bool,
}

/// Main memoria configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoriaConfig {
    pub acquisition: AcquisitionConfig,
    pub extraction: ExtractionConfig,
    pub rendering: RenderingConfig,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
    /// Corrector configuration (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrector: Option<GeneratorProviderConfig>,
}

impl MemoriaConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> MemoriaResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| MemoriaError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| MemoriaError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| MemoriaError::Configuration(e.to_string())),
            _ => Err(MemoriaError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `MEMORIA_*` environment variables on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        // Acquisition
        if let Some(n) = env_parse::<usize>("MEMORIA_MIN_TEXT_LENGTH") {
            self.acquisition.min_text_length = n;
        }
        if let Some(enabled) = env_parse::<bool>("MEMORIA_OCR_ENABLED") {
            self.acquisition.ocr_enabled = enabled;
        }
        if let Ok(lang) = std::env::var("MEMORIA_OCR_LANGUAGE") {
            self.acquisition.ocr_language = lang;
        }
        if let Some(secs) = env_parse::<u64>("MEMORIA_OCR_TIMEOUT_SECS") {
            self.acquisition.ocr_timeout_secs = Some(secs);
        }

        // Output
        if let Ok(root) = std::env::var("MEMORIA_OUTPUT_ROOT") {
            self.output.root = PathBuf::from(root);
        }
        if let Some(n) = env_parse::<usize>("MEMORIA_CONCURRENCY") {
            self.output.concurrency = n;
        }

        // Corrector
        if let Ok(provider) = std::env::var("MEMORIA_CORRECTOR_PROVIDER") {
            let mut corrector = self.corrector.take().unwrap_or_default();
            corrector.provider = match provider.to_lowercase().as_str() {
                "anthropic" => GeneratorProvider::Anthropic,
                _ => GeneratorProvider::Gemini,
            };
            self.corrector = Some(corrector);
        }
        if let Ok(model) = std::env::var("MEMORIA_CORRECTOR_MODEL") {
            if let Some(corrector) = self.corrector.as_mut() {
                corrector.config.model = model;
            }
        }

        self
    }

    /// Check values that would make a run meaningless.
    pub fn validate(&self) -> MemoriaResult<()> {
        if self.output.concurrency == 0 {
            return Err(MemoriaError::Configuration(
                "output.concurrency must be at least 1".to_string(),
            ));
        }
        if self.acquisition.ocr_language.trim().is_empty() {
            return Err(MemoriaError::Configuration(
                "acquisition.ocr_language must not be empty".to_string(),
            ));
        }
        if self.rendering.font_size_pt == 0 {
            return Err(MemoriaError::Configuration(
                "rendering.font_size_pt must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> MemoriaConfigBuilder {
        MemoriaConfigBuilder::default()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for MemoriaConfig.
#[derive(Default)]
pub struct MemoriaConfigBuilder {
    config: MemoriaConfig,
}

impl MemoriaConfigBuilder {
    /// Set acquisition configuration.
    pub fn acquisition(mut self, config: AcquisitionConfig) -> Self {
        self.config.acquisition = config;
        self
    }

    /// Set extraction configuration.
    pub fn extraction(mut self, config: ExtractionConfig) -> Self {
        self.config.extraction = config;
        self
    }

    /// Set rendering configuration.
    pub fn rendering(mut self, config: RenderingConfig) -> Self {
        self.config.rendering = config;
        self
    }

    /// Set output root directory.
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output.root = root.into();
        self
    }

    /// Set batch concurrency.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.output.concurrency = n;
        self
    }

    /// Set corrector configuration.
    pub fn corrector(mut self, config: GeneratorProviderConfig) -> Self {
        self.config.corrector = Some(config);
        self
    }

    /// Surface acquisitions without text as failed runs.
    pub fn fail_on_empty_acquisition(mut self, fail: bool) -> Self {
        self.config.pipeline.fail_on_empty_acquisition = fail;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MemoriaConfig {
        self.config
    }
}
