//! Google Gemini provider for the DocCraftAI model chain.
//!
//! One [`GeminiModel`] is created per configured model id; together they
//! form the priority list handed to [`ai_core::ModelChain`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ai_core::ModelChain;
//! use gemini_ai::{models_from_config, GeminiConfig};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), ai_core::AiError> {
//! let config = GeminiConfig::builder()
//!     .api_key("key")
//!     .models(["gemini-2.0-flash", "gemini-1.5-flash"])
//!     .build();
//! let chain = ModelChain::new(models_from_config(&config)?, Duration::from_secs(60));
//! assert_eq!(chain.model_ids().len(), 2);
//! # Ok(())
//! # }
//! ```

mod api_types;
mod config;
mod model;

pub use config::{GeminiConfig, GeminiConfigBuilder};
pub use model::{models_from_config, GeminiModel};
