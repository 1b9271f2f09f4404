//! Core trait and types for generative model backends.
//!
//! This crate provides the shared interface used by the DocCraftAI API to
//! talk to text generation backends. It defines:
//!
//! - [`ModelProvider`] - The trait every model backend implements
//! - [`ModelChain`] - An ordered list of providers tried until one succeeds
//! - [`PromptKind`] / [`PromptTemplate`] - Named templates with static defaults
//! - [`AiError`] - Error types for generation
//!
//! # Example
//!
//! ```rust
//! use ai_core::{async_trait, AiError, GenerationConfig, ModelChain, ModelProvider};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl ModelProvider for Shout {
//!     fn model_id(&self) -> &str {
//!         "shout-1"
//!     }
//!
//!     async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> Result<String, AiError> {
//!         Ok(prompt.to_uppercase())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), AiError> {
//! let chain = ModelChain::new(vec![Arc::new(Shout)], Duration::from_secs(5));
//! let generation = chain.generate("hello", None).await?;
//! assert_eq!(generation.text, "HELLO");
//! assert_eq!(generation.model, "shout-1");
//! # Ok(())
//! # }
//! ```

mod chain;
mod error;
mod prompt;
mod provider;

pub use chain::{Generation, ModelChain};
pub use error::AiError;
pub use prompt::{
    hash_prompt, render, strip_code_fences, PromptConfiguration, PromptKind, PromptTemplate,
    CONTENT_PLACEHOLDER, OUTPUT_RULES,
};
pub use provider::{GenerationConfig, ModelProvider};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
