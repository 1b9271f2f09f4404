//! Error types for model generation.

use thiserror::Error;

/// Errors that can occur while generating text.
#[derive(Debug, Error)]
pub enum AiError {
    /// Every provider in the chain failed or none were configured.
    #[error("no AI model available (tried: {})", attempted.join(", "))]
    NoAvailableModel { attempted: Vec<String> },

    /// The model is temporarily unavailable.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// The model answered with an error or an unusable response.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// A timeout occurred during generation.
    #[error("generation timed out")]
    Timeout,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network error talking to the backend.
    #[error("network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_available_model_lists_attempts() {
        let err = AiError::NoAvailableModel {
            attempted: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "no AI model available (tried: a, b)");
    }
}
