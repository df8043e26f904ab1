//! Optional correction post-pass.
//!
//! A corrector receives the extraction JSON and may return a corrected
//! object of the same shape. Anything else, including an `{"error": ...}`
//! payload, means no correction is available and the uncorrected result is
//! kept.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ErrorCode, MemoriaError, MemoriaResult};
use crate::normalize::Normalizer;
use crate::traits::{GenerationOptions, TextGenerator};
use crate::types::ExtractionResult;

/// Result of a correction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionOutcome {
    Corrected(ExtractionResult),
    Unavailable(String),
}

impl CorrectionOutcome {
    /// The corrected result, or `original` when none is available.
    pub fn into_result(self, original: ExtractionResult) -> ExtractionResult {
        match self {
            Self::Corrected(result) => result,
            Self::Unavailable(_) => original,
        }
    }

    pub fn is_corrected(&self) -> bool {
        matches!(self, Self::Corrected(_))
    }
}

/// External correction collaborator.
#[async_trait]
pub trait Corrector: Send + Sync {
    /// Attempt a correction. Never fails the run.
    async fn correct(&self, result: &ExtractionResult) -> CorrectionOutcome;
}

/// Build the validation prompt for a text generator.
pub fn correction_prompt(result: &ExtractionResult) -> MemoriaResult<String> {
    let data = serde_json::to_string_pretty(result)?;
    Ok(format!(
        r#"Analiza este objeto de datos extraídos de un plano de mensura.
- Completa los campos vacíos o "No especificado" usando el campo 'full_text'.
- Corrige errores de OCR (números mal formateados, coordenadas incompletas).
- Conserva exactamente las mismas claves y estructura.
- Devuelve únicamente un JSON válido y completo, sin explicaciones ni código extra.

Datos:
{data}"#
    ))
}

/// Strip an optional markdown code fence.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = match trimmed.find('\n') {
        Some(i) => &trimmed[i + 1..],
        None => return trimmed.trim_start_matches('`'),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a corrector response into an extraction result.
pub fn parse_correction(response: &str) -> MemoriaResult<ExtractionResult> {
    let body = strip_code_fence(response);
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        MemoriaError::correction(format!("response is not JSON: {e}"), ErrorCode::CorInvalidJson)
    })?;

    let object = value.as_object().ok_or_else(|| {
        MemoriaError::correction("response is not a JSON object", ErrorCode::CorInvalidJson)
    })?;
    if let Some(error) = object.get("error") {
        let message = error
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(MemoriaError::correction(message, ErrorCode::CorErrorPayload));
    }

    serde_json::from_value(value).map_err(|e| {
        MemoriaError::correction(
            format!("response does not match the extraction shape: {e}"),
            ErrorCode::CorInvalidJson,
        )
    })
}

/// Corrector backed by a text generator.
pub struct LlmCorrector {
    generator: Arc<dyn TextGenerator>,
    normalizer: Normalizer,
}

impl LlmCorrector {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            normalizer: Normalizer::new(),
        }
    }

    async fn try_correct(&self, result: &ExtractionResult) -> MemoriaResult<ExtractionResult> {
        let prompt = correction_prompt(result)?;
        let options = GenerationOptions {
            json_response: true,
            ..Default::default()
        };
        let response = self
            .generator
            .generate(&prompt, Some(options))
            .await
            .map_err(|e| MemoriaError::correction(e.to_string(), ErrorCode::CorProviderFailed))?;

        let mut corrected = parse_correction(&response)?;
        if corrected.full_text.trim().is_empty() {
            corrected.full_text = result.full_text.clone();
        }
        Ok(self.normalizer.normalize(corrected))
    }
}

#[async_trait]
impl Corrector for LlmCorrector {
    async fn correct(&self, result: &ExtractionResult) -> CorrectionOutcome {
        match self.try_correct(result).await {
            Ok(corrected) => {
                debug!(model = self.generator.model_name(), "correction applied");
                CorrectionOutcome::Corrected(corrected)
            }
            Err(e) => {
                warn!(
                    model = self.generator.model_name(),
                    code = e.code().as_str(),
                    error = %e,
                    "correction unavailable, keeping extracted data"
                );
                CorrectionOutcome::Unavailable(e.to_string())
            }
        }
    }
}
