//! GeminiWriter implementation using the Gemini REST API.

use proposal_core::{async_trait, GenerationError, TextGenerator};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::api_types::{ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::config::GeminiWriterConfig;

/// A text generator backed by Google Gemini.
pub struct GeminiWriter {
    client: Client,
    config: GeminiWriterConfig,
}

impl GeminiWriter {
    /// Create a new GeminiWriter with the given configuration.
    pub fn new(config: GeminiWriterConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::Configuration("Gemini API key is empty".to_string()));
        }

        let client = Client::builder().build().map_err(|e| {
            GenerationError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(model = %config.model, "GeminiWriter initialized");

        Ok(Self { client, config })
    }

    /// Create a GeminiWriter from environment variables.
    ///
    /// See [`GeminiWriterConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(GeminiWriterConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeminiWriterConfig {
        &self.config
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        let generation_config = (self.config.temperature.is_some()
            || self.config.max_output_tokens.is_some())
        .then(|| GenerationConfig {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        });

        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config,
        }
    }
}

/// Map a non-success response to a generation error.
fn status_error(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.describe())
        .unwrap_or_else(|_| body.to_string());
    let message = format!("API error ({}): {}", status.as_u16(), message);

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerationError::Unauthorized(message)
        }
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(message),
        _ => GenerationError::ProcessingFailed(message),
    }
}

/// Extract the generated text, reporting the finish reason when there is none.
fn response_text(completion: &GenerateContentResponse) -> Result<String, GenerationError> {
    if let Some(text) = completion.text() {
        return Ok(text);
    }

    let message = match completion.finish_reason() {
        Some(reason) => {
            warn!(finish_reason = reason, "Gemini returned no text");
            format!("Response contained no text (finish reason: {})", reason)
        }
        None => "Response contained no text".to_string(),
    };
    Err(GenerationError::ProcessingFailed(message))
}

#[async_trait]
impl TextGenerator for GeminiWriter {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = self.build_request(prompt);

        debug!(model = %self.config.model, prompt_len = prompt.len(), "Sending request to Gemini API");

        let response = self
            .client
            .post(self.config.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let completion: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::ProcessingFailed(format!("Failed to parse response: {}", e))
        })?;

        let text = response_text(&completion)?;

        debug!(text_len = text.len(), "Received response from Gemini API");

        Ok(text)
    }

    fn name(&self) -> &str {
        "GeminiWriter"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
