//! User approval workflow. Every handler requires an administrator.

use axum::extract::{Path, State};
use axum::response::Response;
use database::{profile, ProfileStatus};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::extract::{AdminUser, ApiQuery};
use crate::response;
use crate::state::AppState;

/// Name given to the hub provisioned on approval.
pub const PERSONAL_HUB_NAME: &str = "Personal Hub";

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub status: Option<ProfileStatus>,
}

pub async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Response> {
    let users = profile::list_profiles(state.db.pool(), query.status).await?;
    Ok(response::ok(users))
}

pub async fn pending_users(_admin: AdminUser, State(state): State<AppState>) -> Result<Response> {
    let users = profile::list_profiles(state.db.pool(), Some(ProfileStatus::Pending)).await?;
    Ok(response::ok(users))
}

/// Approve a user and provision their personal hub if they have none.
pub async fn approve(admin: AdminUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let (user, provisioned) = profile::approve_profile(state.db.pool(), &id, PERSONAL_HUB_NAME).await?;

    if let Some(hub_id) = provisioned {
        info!(user_id = %user.id, hub_id = %hub_id, "Provisioned personal hub");
    }

    info!(user_id = %user.id, by = %admin.id(), "User approved");
    Ok(response::ok(user))
}

pub async fn reject(admin: AdminUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let user = profile::set_status(state.db.pool(), &id, ProfileStatus::Rejected).await?;
    info!(user_id = %user.id, by = %admin.id(), "User rejected");
    Ok(response::ok(user))
}

pub async fn make_admin(admin: AdminUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let user = profile::set_admin(state.db.pool(), &id, true).await?;
    info!(user_id = %user.id, by = %admin.id(), "User promoted to admin");
    Ok(response::ok(user))
}
