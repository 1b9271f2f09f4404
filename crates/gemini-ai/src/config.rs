//! Configuration for the Gemini provider.

use ai_core::AiError;
use std::env;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model priority list.
pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

/// Configuration shared by every Gemini model in the chain.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL.
    pub api_url: String,

    /// API key, sent as `x-goog-api-key`.
    pub api_key: String,

    /// Model ids in priority order.
    pub models: Vec<String>,

    /// Maximum output tokens when the caller does not set one.
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            max_output_tokens: Some(8192),
        }
    }
}

impl GeminiConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GEMINI_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `GEMINI_API_URL` - API URL (default: https://generativelanguage.googleapis.com)
    /// - `GEMINI_MODELS` - Comma separated model ids in priority order
    /// - `GEMINI_MAX_OUTPUT_TOKENS` - Max output tokens (default: 8192)
    pub fn from_env() -> Result<Self, AiError> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let models = env::var("GEMINI_MODELS")
            .ok()
            .map(|v| parse_models(&v))
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());

        let max_output_tokens = env::var("GEMINI_MAX_OUTPUT_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(8192));

        Ok(Self {
            api_url,
            api_key,
            models,
            max_output_tokens,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }
}

/// Split a comma separated model list, dropping blanks.
pub(crate) fn parse_models(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builder for GeminiConfig.
#[derive(Debug, Default)]
pub struct GeminiConfigBuilder {
    config: GeminiConfig,
}

impl GeminiConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Replace the model priority list.
    pub fn models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Set the max output tokens.
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = Some(tokens);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_models() {
        assert_eq!(
            parse_models(" gemini-2.0-flash, ,gemini-1.5-pro "),
            vec!["gemini-2.0-flash".to_string(), "gemini-1.5-pro".to_string()]
        );
        assert!(parse_models(" , ").is_empty());
    }

    #[test]
    fn test_builder() {
        let config = GeminiConfig::builder()
            .api_key("k")
            .api_url("http://localhost:9999")
            .models(["m1"])
            .max_output_tokens(10)
            .build();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.api_url, "http://localhost:9999");
        assert_eq!(config.models, vec!["m1".to_string()]);
        assert_eq!(config.max_output_tokens, Some(10));
    }

    #[test]
    fn test_default_models() {
        let config = GeminiConfig::default();
        assert_eq!(config.models.len(), 3);
        assert_eq!(config.models[0], "gemini-2.0-flash");
    }
}
