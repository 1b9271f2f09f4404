//! DocCraftAI API server.

use std::sync::Arc;

use ai_core::ModelChain;
use api::{app, AppState, Config, SupabaseVerifier};
use database::Database;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    info!(addr = %config.addr, environment = ?config.environment, "Starting DocCraftAI API");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    let caps = db.capabilities().await?;

    let verifier = SupabaseVerifier::new(&config.supabase_url, config.supabase_service_key.clone())?;

    let providers = match &config.gemini {
        Some(gemini) => gemini_ai::models_from_config(gemini)?,
        None => {
            warn!("GEMINI_API_KEY not set; AI endpoints will report no available model");
            Vec::new()
        }
    };
    let models = ModelChain::new(providers, config.ai_timeout);
    info!(models = ?models.model_ids(), "AI model chain ready");

    let addr = config.addr;
    let state = AppState::new(db, caps, Arc::new(verifier), models, config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
