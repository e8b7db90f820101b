//! Configuration for GeminiWriter.

use proposal_core::GenerationError;
use std::env;

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration for GeminiWriter.
#[derive(Debug, Clone)]
pub struct GeminiWriterConfig {
    /// Gemini API base URL.
    pub api_url: String,

    /// API key, sent as the `key` query parameter.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum tokens in the generated text.
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiWriterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl GeminiWriterConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GEMINI_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `GEMINI_API_URL` - API URL (default: https://generativelanguage.googleapis.com)
    /// - `GEMINI_MODEL` - Model name (default: gemini-1.5-flash)
    /// - `GEMINI_TEMPERATURE` - Temperature (default: unset)
    /// - `GEMINI_MAX_OUTPUT_TOKENS` - Max output tokens (default: unset)
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = env::var("GEMINI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok());

        let max_output_tokens = env::var("GEMINI_MAX_OUTPUT_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok());

        Ok(Self {
            api_url,
            api_key,
            model,
            temperature,
            max_output_tokens,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> GeminiWriterConfigBuilder {
        GeminiWriterConfigBuilder::default()
    }

    /// Full `generateContent` URL for the configured model, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Builder for GeminiWriterConfig.
#[derive(Debug, Default)]
pub struct GeminiWriterConfigBuilder {
    config: GeminiWriterConfig,
}

impl GeminiWriterConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = Some(tokens);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiWriterConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiWriterConfig::default();
        assert_eq!(config.api_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.model, "gemini-1.5-flash");
        assert!(config.api_key.is_empty());
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_builder() {
        let config = GeminiWriterConfig::builder()
            .api_key("test-key")
            .api_url("http://localhost:9000/")
            .model("gemini-pro")
            .temperature(0.4)
            .max_output_tokens(2048)
            .build();

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.max_output_tokens, Some(2048));
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-pro:generateContent"
        );
    }
}
