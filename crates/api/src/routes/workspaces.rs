//! Hub-scoped workspaces.

use axum::extract::{Path, State};
use axum::response::Response;
use database::workspace::{self, NewWorkspace, WorkspaceChanges};
use database::Page;
use serde::Deserialize;

use super::required_name;
use crate::error::Result;
use crate::extract::{ApiQuery, HubContext, HubJson};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WorkspaceListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub async fn list(
    ctx: HubContext,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WorkspaceListQuery>,
) -> Result<Response> {
    let page = Page::new(query.page, query.limit);
    let result =
        workspace::list_workspaces(state.db.pool(), &ctx.hub_id, query.search.as_deref(), page).await?;
    let info = result.info(page);
    Ok(response::paginated(result.rows, info))
}

pub async fn create(State(state): State<AppState>, HubJson { ctx, body }: HubJson<WorkspaceRequest>) -> Result<Response> {
    let name = required_name("name", body.name.as_deref())?;
    let workspace = workspace::create_workspace(
        state.db.pool(),
        &NewWorkspace {
            hub_id: ctx.hub_id.clone(),
            name,
            description: body.description,
            color: body.color,
            created_by: ctx.user_id().to_string(),
        },
    )
    .await?;
    Ok(response::created(workspace))
}

pub async fn get_one(ctx: HubContext, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let workspace = workspace::get_workspace(state.db.pool(), &ctx.hub_id, &id).await?;
    Ok(response::ok(workspace))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HubJson { ctx, body }: HubJson<WorkspaceRequest>,
) -> Result<Response> {
    let name = match body.name {
        Some(name) => Some(required_name("name", Some(&name))?),
        None => None,
    };
    let workspace = workspace::update_workspace(
        state.db.pool(),
        &ctx.hub_id,
        &id,
        &WorkspaceChanges {
            name,
            description: body.description,
            color: body.color,
        },
    )
    .await?;
    Ok(response::ok(workspace))
}

pub async fn delete(ctx: HubContext, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    workspace::delete_workspace(state.db.pool(), &ctx.hub_id, &id).await?;
    Ok(response::message("Workspace deleted"))
}
