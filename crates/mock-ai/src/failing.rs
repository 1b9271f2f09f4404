//! Failing model - never available.

use ai_core::{async_trait, AiError, GenerationConfig, ModelProvider};

/// A model whose probe and generation always fail with `Unavailable`.
#[derive(Debug, Clone)]
pub struct FailingModel {
    id: String,
}

impl FailingModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl ModelProvider for FailingModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String, AiError> {
        Err(AiError::Unavailable(format!("{} is offline", self.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_fails() {
        let model = FailingModel::new("down");
        assert!(matches!(model.probe().await, Err(AiError::Unavailable(_))));
        assert!(matches!(
            model.generate("hi", &GenerationConfig::default()).await,
            Err(AiError::Unavailable(_))
        ));
    }
}
