//! Stateless AI endpoints. Mounted behind the rate limiter.

use axum::extract::State;
use axum::response::Response;
use ai_core::Generation;
use serde::{Deserialize, Serialize};

use super::content::{check_temperature, DEFAULT_LANGUAGE};
use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApprovedUser};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AiRequest {
    pub content: Option<String>,
    pub temperature: Option<f32>,
    pub target_language: Option<String>,
}

impl AiRequest {
    fn content(&self) -> Result<&str> {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("content is required".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct AiResult {
    pub content: String,
    pub model: String,
}

impl From<Generation> for AiResult {
    fn from(generation: Generation) -> Self {
        Self {
            content: generation.text,
            model: generation.model,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Models {
    pub models: Vec<String>,
}

pub async fn process(
    _user: ApprovedUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AiRequest>,
) -> Result<Response> {
    check_temperature(body.temperature)?;
    let generation = state.ai.process(body.content()?, body.temperature).await?;
    Ok(response::ok(AiResult::from(generation)))
}

pub async fn translate(
    _user: ApprovedUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AiRequest>,
) -> Result<Response> {
    let language = body
        .target_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    let generation = state.ai.translate(body.content()?, language).await?;
    Ok(response::ok(AiResult::from(generation)))
}

pub async fn enrich(
    _user: ApprovedUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AiRequest>,
) -> Result<Response> {
    let generation = state.ai.enrich(body.content()?).await?;
    Ok(response::ok(AiResult::from(generation)))
}

/// Configured model ids, highest priority first.
pub async fn models(_user: ApprovedUser, State(state): State<AppState>) -> Result<Response> {
    Ok(response::ok(Models {
        models: state.ai.model_ids(),
    }))
}
