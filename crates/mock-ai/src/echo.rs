//! Echo model - answers with the prompt.

use ai_core::{async_trait, AiError, GenerationConfig, ModelProvider};

/// A model that echoes the prompt back.
///
/// Useful for testing the processing flow without any network calls.
#[derive(Debug, Clone)]
pub struct EchoModel {
    id: String,
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoModel {
    /// Create a new EchoModel with no prefix.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prefix: None,
        }
    }

    /// Create a new EchoModel with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_ai::EchoModel;
    ///
    /// let model = EchoModel::with_prefix("echo-1", "<p>processed</p>");
    /// // Will answer "<p>processed</p><original prompt>"
    /// ```
    pub fn with_prefix(id: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl ModelProvider for EchoModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> Result<String, AiError> {
        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, prompt),
            None => prompt.to_string(),
        })
    }

    async fn probe(&self) -> Result<(), AiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let model = EchoModel::new("echo");
        let text = model.generate("Hello!", &GenerationConfig::default()).await.unwrap();
        assert_eq!(text, "Hello!");
        assert_eq!(model.model_id(), "echo");
    }

    #[tokio::test]
    async fn test_echo_with_prefix() {
        let model = EchoModel::with_prefix("echo", "Echo: ");
        let text = model.generate("Hello!", &GenerationConfig::default()).await.unwrap();
        assert_eq!(text, "Echo: Hello!");
    }
}
