//! Recording model - remembers every call made to it.

use ai_core::{async_trait, AiError, GenerationConfig, ModelProvider};
use tokio::sync::Mutex;

/// A single recorded generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub config: GenerationConfig,
}

/// Wraps another model and records prompts and configs passed to it.
pub struct RecordingModel<M: ModelProvider> {
    inner: M,
    calls: Mutex<Vec<RecordedCall>>,
}

impl<M: ModelProvider> RecordingModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Generation calls seen so far, oldest first. Probes are not recorded.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl<M: ModelProvider> ModelProvider for RecordingModel<M> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, AiError> {
        self.calls.lock().await.push(RecordedCall {
            prompt: prompt.to_string(),
            config: *config,
        });
        self.inner.generate(prompt, config).await
    }

    async fn probe(&self) -> Result<(), AiError> {
        self.inner.probe().await
    }
}
