//! Hub-scoped topics.

use axum::extract::{Path, State};
use axum::response::Response;
use database::topic::{self, NewTopic, TopicChanges, TopicFilter};
use database::validation::normalize_reference;
use database::{workspace, Page, Topic};
use serde::{Deserialize, Serialize};

use super::{bad_reference, optional, required_name};
use crate::error::{ApiError, Result};
use crate::extract::{ApiQuery, HubContext, HubJson};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: Topic,
    pub workspace_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicListQuery {
    pub workspace_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicRequest {
    pub workspace_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub estimated_hours: Option<f64>,
}

fn check_amounts(body: &TopicRequest) -> Result<()> {
    let negative = |v: Option<f64>| v.is_some_and(|v| v < 0.0 || !v.is_finite());
    if negative(body.budget) || negative(body.estimated_hours) {
        return Err(ApiError::BadRequest(
            "budget and estimated_hours must be non-negative numbers".to_string(),
        ));
    }
    Ok(())
}

pub async fn list(
    ctx: HubContext,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TopicListQuery>,
) -> Result<Response> {
    let page = Page::new(query.page, query.limit);
    let filter = TopicFilter {
        workspace_id: normalize_reference(query.workspace_id),
        status: query.status.filter(|s| !s.trim().is_empty()),
        search: query.search,
    };
    let result = topic::list_topics(state.db.pool(), &ctx.hub_id, &filter, page).await?;
    let info = result.info(page);
    Ok(response::paginated(result.rows, info))
}

/// Create a topic in one of the hub's workspaces.
pub async fn create(State(state): State<AppState>, HubJson { ctx, body }: HubJson<TopicRequest>) -> Result<Response> {
    check_amounts(&body)?;
    let name = required_name("name", body.name.as_deref())?;
    let workspace_id = normalize_reference(body.workspace_id)
        .ok_or_else(|| ApiError::BadRequest("workspace_id is required".to_string()))?;

    let pool = state.db.pool();
    bad_reference(
        workspace::get_workspace(pool, &ctx.hub_id, &workspace_id).await,
        "Workspace not found in this hub",
    )?;

    let topic = topic::create_topic(
        pool,
        &NewTopic {
            hub_id: ctx.hub_id.clone(),
            workspace_id,
            name,
            description: body.description,
            status: body.status,
            budget: body.budget,
            estimated_hours: body.estimated_hours,
            created_by: ctx.user_id().to_string(),
        },
    )
    .await?;
    Ok(response::created(topic))
}

pub async fn get_one(ctx: HubContext, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let pool = state.db.pool();
    let topic = topic::get_topic(pool, &ctx.hub_id, &id).await?;
    let workspace_name =
        optional(workspace::get_workspace(pool, &ctx.hub_id, &topic.workspace_id).await)?.map(|w| w.name);
    Ok(response::ok(TopicDetail {
        topic,
        workspace_name,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HubJson { ctx, body }: HubJson<TopicRequest>,
) -> Result<Response> {
    check_amounts(&body)?;
    let pool = state.db.pool();

    let workspace_id = normalize_reference(body.workspace_id);
    if let Some(ws) = workspace_id.as_deref() {
        bad_reference(
            workspace::get_workspace(pool, &ctx.hub_id, ws).await,
            "Workspace not found in this hub",
        )?;
    }
    let name = match body.name {
        Some(name) => Some(required_name("name", Some(&name))?),
        None => None,
    };

    let topic = topic::update_topic(
        pool,
        &ctx.hub_id,
        &id,
        &TopicChanges {
            workspace_id,
            name,
            description: body.description,
            status: body.status,
            budget: body.budget,
            estimated_hours: body.estimated_hours,
        },
    )
    .await?;
    Ok(response::ok(topic))
}

pub async fn delete(ctx: HubContext, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    topic::delete_topic(state.db.pool(), &ctx.hub_id, &id).await?;
    Ok(response::message("Topic deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_amounts() {
        assert!(check_amounts(&TopicRequest::default()).is_ok());
        assert!(check_amounts(&TopicRequest {
            budget: Some(1200.0),
            estimated_hours: Some(0.0),
            ..Default::default()
        })
        .is_ok());
        assert!(check_amounts(&TopicRequest {
            budget: Some(-1.0),
            ..Default::default()
        })
        .is_err());
        assert!(check_amounts(&TopicRequest {
            estimated_hours: Some(f64::NAN),
            ..Default::default()
        })
        .is_err());
    }
}
