//! Google Gemini text generation provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use memoria_core::error::{MemoriaError, MemoriaResult};
use memoria_core::traits::{GenerationOptions, GeneratorConfig, TextGenerator};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini text generation provider using the `generateContent` REST endpoint.
pub struct GeminiGenerator {
    client: Client,
    config: GeneratorConfig,
    api_key: SecretString,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Concatenated text parts of the first candidate.
fn parse_response(status: reqwest::StatusCode, body: &str) -> MemoriaResult<String> {
    if !status.is_success() {
        let message = serde_json::from_str::<GeminiError>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        return Err(MemoriaError::llm(format!(
            "Gemini API error ({}): {}",
            status, message
        )));
    }

    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| MemoriaError::parse(format!("Failed to parse response: {}", e)))?;

    if let Some(usage) = &response.usage_metadata {
        debug!(
            prompt_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            "gemini usage"
        );
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| MemoriaError::llm("Gemini response contained no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(MemoriaError::llm(format!(
            "Gemini returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

impl GeminiGenerator {
    /// Create a new Gemini provider.
    ///
    /// The key comes from the config, `GEMINI_API_KEY` or `GOOGLE_API_KEY`.
    pub fn new(config: GeneratorConfig) -> MemoriaResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                MemoriaError::Configuration(
                    "Gemini API key not found. Set GEMINI_API_KEY or GOOGLE_API_KEY environment variable or provide api_key in config.".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                MemoriaError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_API_URL.to_string());

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            client,
            config,
            api_key: SecretString::new(api_key),
            base_url,
        })
    }

    fn request(&self, prompt: &str, options: &GenerationOptions) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature.unwrap_or(self.config.temperature),
                max_output_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
                response_mime_type: options
                    .json_response
                    .then(|| "application/json".to_string()),
            },
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: Option<GenerationOptions>,
    ) -> MemoriaResult<String> {
        let options = options.unwrap_or_default();
        let request = self.request(prompt, &options);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| MemoriaError::llm(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MemoriaError::llm(format!("Failed to read response body: {}", e)))?;

        parse_response(status, &body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoria_core::error::ErrorCode;
    use reqwest::StatusCode;

    fn generator(model: &str) -> GeminiGenerator {
        GeminiGenerator::new(GeneratorConfig {
            model: model.to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some("http://localhost:9/v1beta/".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_and_default_model() {
        let gemini = generator("");
        assert_eq!(gemini.model_name(), DEFAULT_MODEL);
        assert_eq!(
            gemini.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_json_mode_sets_mime_type() {
        let request = generator("gemini-2.0-flash").request(
            "Datos",
            &GenerationOptions {
                json_response: true,
                temperature: Some(0.0),
                ..Default::default()
            },
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Datos");
    }

    #[test]
    fn test_parse_candidate_parts() {
        let body = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"lugar\":"}, {"text": "\"Campo\"}"}]},
                            "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }"#;
        assert_eq!(
            parse_response(StatusCode::OK, body).unwrap(),
            r#"{"lugar":"Campo"}"#
        );
    }

    #[test]
    fn test_parse_blocked_response() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = parse_response(StatusCode::OK, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseInvalidJson);
    }
}
