//! Mock model providers for testing.
//!
//! This crate provides deterministic implementations of the `ModelProvider`
//! trait:
//! - `EchoModel` - Answers with the prompt it was given
//! - `FailingModel` - Always unavailable
//! - `DelayedModel` - Wraps another model with artificial delay
//! - `RecordingModel` - Wraps another model and records every call
//!
//! For production use, see the `gemini-ai` crate.
//!
//! # Example
//!
//! ```rust
//! use mock_ai::{EchoModel, FailingModel, ModelChain, ModelProvider};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_ai::AiError> {
//!     let chain = ModelChain::new(
//!         vec![
//!             Arc::new(FailingModel::new("primary")) as Arc<dyn ModelProvider>,
//!             Arc::new(EchoModel::new("fallback")),
//!         ],
//!         Duration::from_secs(1),
//!     );
//!
//!     let generation = chain.generate("Hello!", None).await?;
//!     assert_eq!(generation.model, "fallback");
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;
mod recording;

// Re-export ai-core types for convenience
pub use ai_core::{async_trait, AiError, Generation, GenerationConfig, ModelChain, ModelProvider};

pub use delayed::DelayedModel;
pub use echo::EchoModel;
pub use failing::FailingModel;
pub use recording::{RecordedCall, RecordingModel};
