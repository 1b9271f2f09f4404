//! The caller's own profile.

use axum::extract::State;
use axum::response::Response;
use database::{hub, profile, HubWithRole, Profile, ProfileStatus};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, CurrentUser, HubJson};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Me {
    pub profile: Profile,
    /// Empty until the account is approved.
    pub hubs: Vec<HubWithRole>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile and hub memberships; available to pending users too.
pub async fn me(user: CurrentUser, State(state): State<AppState>) -> Result<Response> {
    let hubs = if user.profile.status == ProfileStatus::Approved {
        hub::list_hubs_for_user(state.db.pool(), user.id()).await?
    } else {
        Vec::new()
    };
    Ok(response::ok(Me {
        profile: user.profile,
        hubs,
    }))
}

pub async fn update_profile(
    user: CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Response> {
    let full_name = match body.full_name.as_deref() {
        Some(name) => Some(database::validation::validate_name("full_name", name)?),
        None => None,
    };
    let profile = profile::update_details(
        state.db.pool(),
        user.id(),
        full_name.as_deref(),
        body.avatar_url.as_deref(),
    )
    .await?;
    Ok(response::ok(profile))
}

/// Remember the hub the caller last opened. Membership is checked by the extractor.
pub async fn set_active_hub(State(state): State<AppState>, HubJson { ctx, .. }: HubJson<IgnoredAny>) -> Result<Response> {
    let pool = state.db.pool();
    profile::set_last_active_hub(pool, ctx.user_id(), &ctx.hub_id).await?;
    let profile = profile::get_profile(pool, ctx.user_id())
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
    Ok(response::ok(profile))
}
