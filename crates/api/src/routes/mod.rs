//! Route handlers and the router.

pub mod admin;
pub mod ai;
pub mod auth;
pub mod clients;
mod content;
pub mod health;
pub mod hubs;
pub mod items;
pub mod meetings;
pub mod projects;
pub mod prompts;
pub mod topics;
pub mod workspaces;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use database::{profile, Profile};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::error::{ApiError, Result};
use crate::rate_limit::limit_ai_requests;
use crate::state::AppState;

/// Build the router with all routes.
pub fn router(state: &AppState) -> Router<AppState> {
    let ai = Router::new()
        .route("/process", post(ai::process))
        .route("/translate", post(ai::translate))
        .route("/enrich", post(ai::enrich))
        .route("/models", get(ai::models))
        .route_layer(middleware::from_fn_with_state(state.clone(), limit_ai_requests));

    Router::new()
        .route("/health", get(health::health))
        // Identity
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/profile", put(auth::update_profile))
        .route("/api/auth/active-hub", put(auth::set_active_hub))
        // Administration
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/pending", get(admin::pending_users))
        .route("/api/admin/users/:id/approve", post(admin::approve))
        .route("/api/admin/users/:id/reject", post(admin::reject))
        .route("/api/admin/users/:id/make-admin", post(admin::make_admin))
        // Hubs and membership
        .route("/api/hubs", get(hubs::list).post(hubs::create))
        .route(
            "/api/hubs/:hub_id",
            get(hubs::get_one).put(hubs::update).delete(hubs::delete),
        )
        .route(
            "/api/hubs/:hub_id/members",
            get(hubs::list_members).post(hubs::add_member),
        )
        .route(
            "/api/hubs/:hub_id/members/:user_id",
            axum::routing::delete(hubs::remove_member),
        )
        // Hub content
        .route("/api/workspaces", get(workspaces::list).post(workspaces::create))
        .route(
            "/api/workspaces/:id",
            get(workspaces::get_one)
                .put(workspaces::update)
                .delete(workspaces::delete),
        )
        .route("/api/topics", get(topics::list).post(topics::create))
        .route(
            "/api/topics/:id",
            get(topics::get_one).put(topics::update).delete(topics::delete),
        )
        .route("/api/items", get(items::list).post(items::create))
        .route(
            "/api/items/:id",
            get(items::get_one).put(items::update).delete(items::delete),
        )
        .route("/api/items/:id/process", post(items::process))
        .route("/api/items/:id/translate", post(items::translate))
        .route("/api/items/:id/translations", get(items::translations))
        // Legacy records
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/:id",
            get(clients::get_one).put(clients::update).delete(clients::delete),
        )
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/:id",
            get(projects::get_one).put(projects::update).delete(projects::delete),
        )
        .route("/api/meetings", get(meetings::list).post(meetings::create))
        .route(
            "/api/meetings/:id",
            get(meetings::get_one).put(meetings::update).delete(meetings::delete),
        )
        .route("/api/meetings/:id/process", post(meetings::process))
        .route("/api/meetings/:id/translate", post(meetings::translate))
        .route("/api/meetings/:id/translations", get(meetings::translations))
        // AI
        .nest("/api/ai", ai)
        .route("/api/prompts", get(prompts::list))
        .route(
            "/api/prompts/:id",
            get(prompts::get_one).put(prompts::update).delete(prompts::delete),
        )
}

/// Public fields of the profile that created a record.
#[derive(Debug, Clone, Serialize)]
pub struct Creator {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<Profile> for Creator {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
        }
    }
}

/// Load the creators of a set of records with one query.
pub(crate) async fn load_creators<'a>(
    state: &AppState,
    ids: impl IntoIterator<Item = Option<&'a String>>,
) -> Result<Vec<Creator>> {
    let ids: Vec<String> = ids
        .into_iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let profiles = profile::get_profiles_by_ids(state.db.pool(), &ids).await?;
    Ok(profiles.into_iter().map(Creator::from).collect())
}

/// Pick the creator of one record out of a batch.
pub(crate) fn creator_of(creators: &[Creator], created_by: Option<&String>) -> Option<Creator> {
    let id = created_by?;
    creators.iter().find(|c| &c.id == id).cloned()
}

/// The creator of a single record, if the profile still exists.
pub(crate) async fn load_creator(state: &AppState, created_by: Option<&String>) -> Result<Option<Creator>> {
    let creators = load_creators(state, [created_by]).await?;
    Ok(creator_of(&creators, created_by))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Require a non-empty name-like field and trim it.
pub(crate) fn required_name(field: &str, value: Option<&str>) -> Result<String> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))?;
    Ok(database::validation::validate_name(field, value)?)
}

/// Map a failed lookup of a referenced row to 400 instead of 404.
pub(crate) fn bad_reference<T>(result: database::Result<T>, message: &str) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(database::DatabaseError::NotFound { .. }) => Err(ApiError::BadRequest(message.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Treat a missing row as `None`.
pub(crate) fn optional<T>(result: database::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(database::DatabaseError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
