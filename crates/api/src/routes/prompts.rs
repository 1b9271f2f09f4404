//! Prompt templates: stored overrides of the compiled-in defaults.

use ai_core::{PromptKind, CONTENT_PLACEHOLDER};
use axum::extract::{Path, State};
use axum::response::Response;
use database::{prompt, AiPrompt, PromptSettings};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::content::check_temperature;
use crate::ai::PromptSource;
use crate::error::{ApiError, Result};
use crate::extract::{AdminUser, ApiJson, ApprovedUser};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PromptView {
    pub id: &'static str,
    pub name: String,
    pub content: String,
    pub temperature: Option<f32>,
    pub source: PromptSource,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
}

impl PromptView {
    fn new(kind: PromptKind, stored: Option<AiPrompt>) -> Self {
        match stored {
            Some(row) => Self {
                id: kind.id(),
                name: row.name,
                content: row.content,
                temperature: row.configuration.temperature,
                source: PromptSource::Database,
                updated_by: row.updated_by,
                updated_at: Some(row.updated_at),
            },
            None => {
                let template = kind.static_template();
                Self {
                    id: kind.id(),
                    name: kind.display_name().to_string(),
                    content: template.content,
                    temperature: template.configuration.temperature,
                    source: PromptSource::Static,
                    updated_by: None,
                    updated_at: None,
                }
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePromptRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    pub temperature: Option<f32>,
}

fn kind(id: &str) -> Result<PromptKind> {
    PromptKind::from_id(id).ok_or_else(|| ApiError::NotFound(format!("Unknown prompt: {id}")))
}

pub async fn list(_user: ApprovedUser, State(state): State<AppState>) -> Result<Response> {
    let pool = state.db.pool();
    let mut views = Vec::with_capacity(PromptKind::ALL.len());
    for kind in PromptKind::ALL {
        views.push(PromptView::new(kind, prompt::get_prompt(pool, kind.id()).await?));
    }
    Ok(response::ok(views))
}

pub async fn get_one(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let kind = kind(&id)?;
    let stored = prompt::get_prompt(state.db.pool(), kind.id()).await?;
    Ok(response::ok(PromptView::new(kind, stored)))
}

/// Store a template override.
pub async fn update(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdatePromptRequest>,
) -> Result<Response> {
    let kind = kind(&id)?;
    let content = body
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("content is required".to_string()))?;
    if !content.contains(CONTENT_PLACEHOLDER) {
        return Err(ApiError::BadRequest(format!(
            "content must contain the {CONTENT_PLACEHOLDER} placeholder"
        )));
    }
    check_temperature(body.temperature)?;
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| kind.display_name().to_string());

    let stored = prompt::upsert_prompt(
        state.db.pool(),
        kind.id(),
        &name,
        &content,
        &PromptSettings {
            temperature: body.temperature,
        },
        admin.id(),
    )
    .await?;

    info!(prompt = kind.id(), by = %admin.id(), "Prompt updated");
    Ok(response::ok(PromptView::new(kind, Some(stored))))
}

/// Drop the stored override; the compiled-in default applies again.
pub async fn delete(admin: AdminUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let kind = kind(&id)?;
    if prompt::delete_prompt(state.db.pool(), kind.id()).await? {
        info!(prompt = kind.id(), by = %admin.id(), "Prompt reverted to default");
    }
    Ok(response::ok(PromptView::new(kind, None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_view() {
        let view = PromptView::new(PromptKind::Translate, None);
        assert_eq!(view.id, "TRANSLATE");
        assert_eq!(view.source, PromptSource::Static);
        assert_eq!(view.temperature, Some(0.2));
        assert!(view.content.contains(CONTENT_PLACEHOLDER));
    }

    #[test]
    fn test_unknown_kind() {
        assert!(matches!(kind("summary"), Err(ApiError::NotFound(_))));
        assert_eq!(kind("enrich").unwrap(), PromptKind::Enrich);
    }
}
