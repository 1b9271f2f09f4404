//! Legacy projects, optionally owned by a client.

use axum::extract::{Path, State};
use axum::response::Response;
use database::project::{self, ProjectFields, ProjectFilter};
use database::validation::normalize_reference;
use database::{client, Page};
use serde::Deserialize;

use super::{bad_reference, required_name};
use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery, ApprovedUser};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub client_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectRequest {
    pub client_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

async fn check_client(state: &AppState, client_id: Option<&str>) -> Result<()> {
    if let Some(id) = client_id {
        bad_reference(client::get_client(state.db.pool(), id).await, "Client not found")?;
    }
    Ok(())
}

pub async fn list(
    _user: ApprovedUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> Result<Response> {
    let page = Page::new(query.page, query.limit);
    let filter = ProjectFilter {
        client_id: normalize_reference(query.client_id),
        status: query.status.filter(|s| !s.trim().is_empty()),
        search: query.search,
    };
    let result = project::list_projects(state.db.pool(), &filter, page).await?;
    let info = result.info(page);
    Ok(response::paginated(result.rows, info))
}

pub async fn create(
    user: ApprovedUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProjectRequest>,
) -> Result<Response> {
    let name = required_name("name", body.name.as_deref())?;
    let client_id = normalize_reference(body.client_id);
    check_client(&state, client_id.as_deref()).await?;

    let project = project::create_project(
        state.db.pool(),
        &ProjectFields {
            client_id,
            name: Some(name),
            description: body.description,
            status: body.status,
        },
        user.id(),
    )
    .await?;
    Ok(response::created(project))
}

/// Get a project with its client's name.
pub async fn get_one(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let project = project::get_project_with_client(state.db.pool(), &id).await?;
    Ok(response::ok(project))
}

pub async fn update(
    _user: ApprovedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProjectRequest>,
) -> Result<Response> {
    let name = match body.name {
        Some(name) => Some(required_name("name", Some(&name))?),
        None => None,
    };
    let client_id = normalize_reference(body.client_id);
    check_client(&state, client_id.as_deref()).await?;

    let project = project::update_project(
        state.db.pool(),
        &id,
        &ProjectFields {
            client_id,
            name,
            description: body.description,
            status: body.status,
        },
    )
    .await?;
    Ok(response::ok(project))
}

pub async fn delete(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    project::delete_project(state.db.pool(), &id).await?;
    Ok(response::message("Project deleted"))
}
