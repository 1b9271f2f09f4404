//! Typed request context: who is calling and in which hub.
//!
//! Each extractor builds on the previous one. Verification order is token
//! (401), then approval or hub id (403 / 400), then membership (403).

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use database::{hub, profile, HubRole, NewProfile, Profile, ProfileStatus};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Any authenticated caller, approved or not.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub profile: Profile,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid authorization header".to_string())
        })?;

        let identity = state
            .verifier
            .verify(token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        let pool = state.db.pool();
        let profile = match profile::get_profile(pool, &identity.id).await? {
            Some(profile) => profile,
            None => {
                info!(user_id = %identity.id, "Creating profile on first sign-in");
                profile::create_profile(
                    pool,
                    &NewProfile {
                        id: identity.id.clone(),
                        email: identity.email.clone(),
                        full_name: identity.display_name(),
                        avatar_url: identity.avatar_url(),
                    },
                )
                .await?
            }
        };

        let user = CurrentUser { profile };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// An approved caller.
#[derive(Debug, Clone)]
pub struct ApprovedUser {
    pub profile: Profile,
}

impl ApprovedUser {
    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ApprovedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.profile.status != ProfileStatus::Approved {
            return Err(ApiError::Forbidden(format!(
                "Account is {}; approval required",
                user.profile.status.as_str()
            )));
        }
        Ok(ApprovedUser {
            profile: user.profile,
        })
    }
}

/// An approved administrator.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub profile: Profile,
}

impl AdminUser {
    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = ApprovedUser::from_request_parts(parts, state).await?;
        if !user.profile.is_admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser {
            profile: user.profile,
        })
    }
}

/// An approved caller with a membership in the hub named by the request.
///
/// Rejecting a profile revokes its hub access without touching memberships.
#[derive(Debug, Clone)]
pub struct HubContext {
    pub user: Profile,
    pub hub_id: String,
    pub role: HubRole,
}

impl HubContext {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn require_owner(&self) -> Result<(), ApiError> {
        match self.role {
            HubRole::Owner => Ok(()),
            HubRole::Member => Err(ApiError::Forbidden(
                "Only hub owners can perform this action".to_string(),
            )),
        }
    }

    async fn authorize(state: &AppState, user: Profile, hub_id: Option<String>) -> Result<Self, ApiError> {
        let hub_id = hub_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("hub_id is required".to_string()))?;

        let membership = hub::get_membership(state.db.pool(), &hub_id, &user.id)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Access denied: not a member of this hub".to_string()))?;

        Ok(HubContext {
            user,
            hub_id,
            role: membership.role,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct HubIdQuery {
    hub_id: Option<String>,
}

async fn path_hub_id(parts: &mut Parts, state: &AppState) -> Option<String> {
    Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .ok()
        .and_then(|Path(params)| params.get("hub_id").cloned())
}

fn query_hub_id(parts: &Parts) -> Option<String> {
    Query::<HubIdQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.hub_id)
}

#[async_trait]
impl FromRequestParts<AppState> for HubContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = ApprovedUser::from_request_parts(parts, state).await?;
        let hub_id = match path_hub_id(parts, state).await {
            Some(id) => Some(id),
            None => query_hub_id(parts),
        };
        HubContext::authorize(state, user.profile, hub_id).await
    }
}

/// Hub context plus a JSON body.
///
/// The hub id is taken from the path, then a `hub_id` field of the body,
/// then the query string.
#[derive(Debug)]
pub struct HubJson<T> {
    pub ctx: HubContext,
    pub body: T,
}

#[async_trait]
impl<T> FromRequest<AppState> for HubJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let user = ApprovedUser::from_request_parts(&mut parts, state).await?;
        let path_hub = path_hub_id(&mut parts, state).await;
        let query_hub = query_hub_id(&parts);

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;
        let value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?
        };

        let body_hub = value
            .get("hub_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let hub_id = path_hub.or(body_hub).or(query_hub);
        let ctx = HubContext::authorize(state, user.profile, hub_id).await?;

        let body = serde_json::from_value(value)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

        Ok(HubJson { ctx, body })
    }
}

/// `Json<T>` whose rejection uses the API error envelope.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for ApiJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// `Query<T>` whose rejection uses the API error envelope.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T> FromRequestParts<AppState> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-1"));
        assert_eq!(bearer_token(&headers), Some("tok-1"));
    }
}
