//! Ordered fallback over several model providers.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::AiError;
use crate::provider::{GenerationConfig, ModelProvider};

/// Text produced by the chain and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub text: String,
    pub model: String,
}

/// Providers in priority order.
///
/// Each call walks the list from the top and returns the first success.
/// A provider that errors or exceeds the timeout is skipped for that call
/// only; there is no circuit breaking between calls.
#[derive(Clone)]
pub struct ModelChain {
    providers: Vec<Arc<dyn ModelProvider>>,
    timeout: Duration,
}

impl std::fmt::Debug for ModelChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelChain")
            .field("models", &self.model_ids())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModelChain {
    pub fn new(providers: Vec<Arc<dyn ModelProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Configured model ids in priority order.
    pub fn model_ids(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.model_id().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Generate with the first provider that succeeds.
    ///
    /// Providers are probed first only when `config` is `None`; with an
    /// explicit config the generation call itself is the availability test.
    pub async fn generate(
        &self,
        prompt: &str,
        config: Option<GenerationConfig>,
    ) -> Result<Generation, AiError> {
        let mut attempted = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let model = provider.model_id().to_string();
            attempted.push(model.clone());

            if config.is_none() {
                if let Err(e) = self.bounded(provider.probe()).await {
                    warn!(model = %model, error = %e, "Model probe failed, trying next");
                    continue;
                }
            }

            let call_config = config.unwrap_or_default();
            debug!(model = %model, prompt_chars = prompt.len(), "Generating");

            match self.bounded(provider.generate(prompt, &call_config)).await {
                Ok(text) => {
                    info!(model = %model, response_chars = text.len(), "Generation succeeded");
                    return Ok(Generation { text, model });
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Generation failed, trying next");
                }
            }
        }

        Err(AiError::NoAvailableModel { attempted })
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, AiError>>,
    ) -> Result<T, AiError> {
        match timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AiError::Timeout),
        }
    }
}
