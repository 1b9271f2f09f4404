//! The ModelProvider trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Per-call generation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// Config with only a temperature set.
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Self::default()
        }
    }
}

/// A single named text generation backend.
///
/// This trait is object-safe and can be used with `Arc<dyn ModelProvider>`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Identifier recorded as `processed_by` when this model serves a call.
    fn model_id(&self) -> &str;

    /// Generate text for a fully rendered prompt.
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, AiError>;

    /// Cheap availability check.
    ///
    /// Default implementation issues a tiny generation request.
    async fn probe(&self) -> Result<(), AiError> {
        let config = GenerationConfig {
            temperature: None,
            max_output_tokens: Some(1),
        };
        self.generate("ping", &config).await.map(|_| ())
    }
}
