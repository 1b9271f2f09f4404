//! Hubs and hub membership.

use axum::extract::{Path, State};
use axum::response::Response;
use database::hub::{self, HubChanges, NewHub};
use database::{profile, DatabaseError, HubRole, HubType, HubWithRole, Page};
use serde::Deserialize;
use tracing::info;

use super::required_name;
use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, ApprovedUser, HubContext, HubJson};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HubListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateHubRequest {
    pub name: Option<String>,
    pub color_theme: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHubRequest {
    pub name: Option<String>,
    pub color_theme: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddMemberRequest {
    pub email: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<HubRole>,
}

/// Hubs the caller belongs to, with their role.
pub async fn list(
    user: ApprovedUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HubListQuery>,
) -> Result<Response> {
    let page = Page::new(query.page, query.limit);
    let result = hub::page_hubs_for_user(state.db.pool(), user.id(), page).await?;
    let info = result.info(page);
    Ok(response::paginated(result.rows, info))
}

/// Create a shared hub owned by the caller.
pub async fn create(
    user: ApprovedUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateHubRequest>,
) -> Result<Response> {
    let name = required_name("name", body.name.as_deref())?;
    let hub = hub::create_hub(
        state.db.pool(),
        &NewHub {
            name,
            hub_type: HubType::Shared,
            color_theme: body.color_theme,
            icon: body.icon,
        },
        user.id(),
    )
    .await?;

    info!(hub_id = %hub.id, owner = %user.id(), "Hub created");
    Ok(response::created(HubWithRole {
        hub,
        role: HubRole::Owner,
    }))
}

pub async fn get_one(ctx: HubContext, State(state): State<AppState>) -> Result<Response> {
    let hub = hub::get_hub(state.db.pool(), &ctx.hub_id).await?;
    Ok(response::ok(HubWithRole { hub, role: ctx.role }))
}

pub async fn update(State(state): State<AppState>, HubJson { ctx, body }: HubJson<UpdateHubRequest>) -> Result<Response> {
    ctx.require_owner()?;
    let name = match body.name {
        Some(name) => Some(required_name("name", Some(&name))?),
        None => None,
    };
    let hub = hub::update_hub(
        state.db.pool(),
        &ctx.hub_id,
        &HubChanges {
            name,
            color_theme: body.color_theme,
            icon: body.icon,
        },
    )
    .await?;
    Ok(response::ok(HubWithRole { hub, role: ctx.role }))
}

/// Delete a shared hub; its content goes with it.
pub async fn delete(ctx: HubContext, State(state): State<AppState>) -> Result<Response> {
    ctx.require_owner()?;
    let pool = state.db.pool();
    let hub = hub::get_hub(pool, &ctx.hub_id).await?;
    if hub.hub_type == HubType::Personal {
        return Err(ApiError::BadRequest("Personal hubs cannot be deleted".to_string()));
    }
    hub::delete_hub(pool, &ctx.hub_id).await?;
    info!(hub_id = %ctx.hub_id, "Hub deleted");
    Ok(response::message("Hub deleted"))
}

pub async fn list_members(ctx: HubContext, State(state): State<AppState>) -> Result<Response> {
    let members = hub::list_members(state.db.pool(), &ctx.hub_id).await?;
    Ok(response::ok(members))
}

/// Add a user, found by id or email, to the hub.
pub async fn add_member(State(state): State<AppState>, HubJson { ctx, body }: HubJson<AddMemberRequest>) -> Result<Response> {
    ctx.require_owner()?;
    let pool = state.db.pool();

    let hub = hub::get_hub(pool, &ctx.hub_id).await?;
    if hub.hub_type == HubType::Personal {
        return Err(ApiError::BadRequest(
            "Members cannot be added to a personal hub".to_string(),
        ));
    }

    let user_id = body.user_id.filter(|id| !id.trim().is_empty());
    let email = body.email.filter(|e| !e.trim().is_empty());
    let target = match (user_id, email) {
        (Some(id), _) => profile::get_profile(pool, &id).await?,
        (None, Some(email)) => profile::get_profile_by_email(pool, email.trim()).await?,
        (None, None) => {
            return Err(ApiError::BadRequest("email or user_id is required".to_string()));
        }
    }
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let role = body.role.unwrap_or(HubRole::Member);
    let member = match hub::add_member(pool, &ctx.hub_id, &target.id, role).await {
        Ok(member) => member,
        Err(DatabaseError::AlreadyExists { .. }) => {
            return Err(ApiError::BadRequest(
                "User is already a member of this hub".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(hub_id = %ctx.hub_id, user_id = %target.id, ?role, "Member added");
    Ok(response::created(member))
}

/// Remove a non-owner member.
pub async fn remove_member(
    ctx: HubContext,
    State(state): State<AppState>,
    Path((_hub_id, user_id)): Path<(String, String)>,
) -> Result<Response> {
    ctx.require_owner()?;
    let pool = state.db.pool();

    let membership = hub::get_membership(pool, &ctx.hub_id, &user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;
    if membership.role == HubRole::Owner {
        return Err(ApiError::BadRequest("Cannot remove a hub owner".to_string()));
    }

    hub::remove_member(pool, &ctx.hub_id, &user_id).await?;
    info!(hub_id = %ctx.hub_id, %user_id, "Member removed");
    Ok(response::message("Member removed"))
}
