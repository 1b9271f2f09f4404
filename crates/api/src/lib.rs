//! DocCraftAI HTTP API.
//!
//! Multi-tenant hubs of workspaces, topics and items, legacy
//! client/project/meeting records, and AI summarization, translation and
//! enrichment backed by an ordered chain of generative models.
//!
//! [`app`] builds the complete router from an injected [`AppState`]; the
//! `doccraft-api` binary wires real collaborators into it, tests wire fakes.

pub mod ai;
pub mod assembler;
pub mod config;
pub mod error;
pub mod extract;
pub mod identity;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod state;

use axum::http::{header, HeaderValue, Method};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use config::{Config, ConfigError, Environment};
pub use error::ApiError;
pub use identity::{AuthIdentity, SupabaseVerifier, TokenVerifier};
pub use state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    routes::router(&state)
        .fallback(error::route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), error::format_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for `*` or a comma-separated list of origins.
fn cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let mut parsed = Vec::new();
    for origin in origins.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        match HeaderValue::from_str(origin) {
            Ok(value) => parsed.push(value),
            Err(err) => warn!("ignoring invalid CORS origin '{origin}': {err}"),
        }
    }
    layer.allow_origin(parsed)
}
