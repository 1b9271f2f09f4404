//! Delayed model - wraps another model with artificial delay.

use std::time::Duration;

use ai_core::{async_trait, AiError, GenerationConfig, ModelProvider};
use tokio::time::sleep;

/// A model that wraps another model and adds artificial delay.
///
/// Useful for testing timeout handling in the model chain.
pub struct DelayedModel<M: ModelProvider> {
    inner: M,
    delay: Duration,
}

impl<M: ModelProvider> DelayedModel<M> {
    /// Create a new DelayedModel wrapping the given model with the specified delay.
    pub fn new(inner: M, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a model with a delay in milliseconds.
    pub fn with_millis(inner: M, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<M: ModelProvider> ModelProvider for DelayedModel<M> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, AiError> {
        sleep(self.delay).await;
        self.inner.generate(prompt, config).await
    }

    async fn probe(&self) -> Result<(), AiError> {
        self.inner.probe().await
    }
}
