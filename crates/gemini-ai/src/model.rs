//! A single Gemini model as a [`ModelProvider`].

use std::sync::Arc;

use ai_core::{async_trait, AiError, GenerationConfig, ModelProvider};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::api_types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, RequestGenerationConfig,
};
use crate::config::GeminiConfig;

/// One Gemini model id bound to a shared HTTP client.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    max_output_tokens: Option<u32>,
}

impl GeminiModel {
    /// Create a provider for `model` using a shared client.
    pub fn new(client: Client, config: &GeminiConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: model.into(),
            max_output_tokens: config.max_output_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_url, self.model)
    }

    fn request(&self, prompt: &str, config: &GenerationConfig) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: RequestGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens.or(self.max_output_tokens),
            },
        }
    }
}

#[async_trait]
impl ModelProvider for GeminiModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, AiError> {
        let request = self.request(prompt, config);
        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending request to Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);

            return Err(match status {
                StatusCode::NOT_FOUND
                | StatusCode::TOO_MANY_REQUESTS
                | StatusCode::SERVICE_UNAVAILABLE => AiError::Unavailable(format!(
                    "{} ({}): {}",
                    self.model,
                    status.as_u16(),
                    message
                )),
                _ => AiError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    message
                )),
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        body.text().ok_or_else(|| {
            AiError::ProcessingFailed(format!(
                "{} returned no text (finish reason: {})",
                self.model,
                body.finish_reason().unwrap_or("unknown")
            ))
        })
    }
}

/// Build one provider per configured model, in priority order.
pub fn models_from_config(config: &GeminiConfig) -> Result<Vec<Arc<dyn ModelProvider>>, AiError> {
    if config.api_key.trim().is_empty() {
        return Err(AiError::Configuration("Gemini API key is empty".to_string()));
    }

    let client = Client::builder()
        .build()
        .map_err(|e| AiError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

    Ok(config
        .models
        .iter()
        .map(|model| {
            Arc::new(GeminiModel::new(client.clone(), config, model.clone())) as Arc<dyn ModelProvider>
        })
        .collect())
}
