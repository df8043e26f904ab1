//! Anthropic (Claude) text generation provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use memoria_core::error::{MemoriaError, MemoriaResult};
use memoria_core::traits::{GenerationOptions, GeneratorConfig, TextGenerator};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
const JSON_ONLY: &str = "Respond with a single JSON object and nothing else.";

/// Anthropic text generation provider.
pub struct AnthropicGenerator {
    client: Client,
    config: GeneratorConfig,
    api_key: SecretString,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

/// First text block of a successful response, or the API error message.
fn parse_response(status: reqwest::StatusCode, body: &str) -> MemoriaResult<String> {
    if !status.is_success() {
        let message = serde_json::from_str::<AnthropicError>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        return Err(MemoriaError::llm(format!(
            "Anthropic API error ({}): {}",
            status, message
        )));
    }

    let response: AnthropicResponse = serde_json::from_str(body)
        .map_err(|e| MemoriaError::parse(format!("Failed to parse response: {}", e)))?;

    if let Some(usage) = &response.usage {
        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "anthropic usage"
        );
    }

    response
        .content
        .into_iter()
        .find(|c| c.content_type == "text")
        .and_then(|c| c.text)
        .ok_or_else(|| MemoriaError::llm("Anthropic response contained no text"))
}

impl AnthropicGenerator {
    /// Create a new Anthropic provider.
    pub fn new(config: GeneratorConfig) -> MemoriaResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                MemoriaError::Configuration("Anthropic API key not found. Set ANTHROPIC_API_KEY environment variable or provide api_key in config.".to_string())
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
            .unwrap_or_else(|| ANTHROPIC_API_URL.to_string());

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

    fn request(&self, prompt: &str, options: &GenerationOptions) -> AnthropicRequest {
        AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: Some(options.temperature.unwrap_or(self.config.temperature)),
            // No native JSON mode; ask for it in the system prompt.
            system: options.json_response.then(|| JSON_ONLY.to_string()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: Option<GenerationOptions>,
    ) -> MemoriaResult<String> {
        let options = options.unwrap_or_default();
        let request = self.request(prompt, &options);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| MemoriaError::llm(format!("Anthropic API request failed: {}", e)))?;

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
