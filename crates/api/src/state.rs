//! Application state shared across handlers.

use std::sync::Arc;

use ai_core::ModelChain;
use database::{Database, SchemaCapabilities};

use crate::ai::AiService;
use crate::config::Config;
use crate::identity::TokenVerifier;
use crate::rate_limit::AiRateLimiter;

/// Shared application state.
///
/// Every dependency is constructed by the entry point and injected here.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Optional columns present in the connected schema.
    pub caps: Arc<SchemaCapabilities>,
    /// Bearer token verifier.
    pub verifier: Arc<dyn TokenVerifier>,
    /// Prompt loading and model fallback.
    pub ai: AiService,
    /// Admission control for `/api/ai/*`.
    pub ai_limiter: Arc<AiRateLimiter>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        caps: SchemaCapabilities,
        verifier: Arc<dyn TokenVerifier>,
        models: ModelChain,
        config: Config,
    ) -> Self {
        let ai = AiService::new(db.clone(), models);
        let ai_limiter = Arc::new(AiRateLimiter::new(config.ai_rate_limit, config.ai_rate_window));
        Self {
            db,
            caps: Arc::new(caps),
            verifier,
            ai,
            ai_limiter,
            config: Arc::new(config),
        }
    }
}
