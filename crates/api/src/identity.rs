//! Bearer token verification against the external auth provider.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// A user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthIdentity {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Provider-side profile hints used when creating a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
}

impl AuthIdentity {
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .full_name
            .clone()
            .or_else(|| self.user_metadata.name.clone())
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user_metadata
            .avatar_url
            .clone()
            .or_else(|| self.user_metadata.picture.clone())
    }
}

/// The auth provider could not give a verdict.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("auth provider request failed: {0}")]
    Network(String),

    #[error("unexpected auth provider response ({status}): {message}")]
    Provider { status: u16, message: String },
}

/// Verifies opaque bearer tokens.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Ok(None)` means the token was checked and is not valid.
    async fn verify(&self, token: &str) -> Result<Option<AuthIdentity>, IdentityError>;
}

/// Verifies tokens with Supabase Auth (`GET /auth/v1/user`).
#[derive(Debug, Clone)]
pub struct SupabaseVerifier {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseVerifier {
    pub fn new(base_url: &str, service_key: impl Into<String>) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .build()
            .map_err(|e| IdentityError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }
}

#[async_trait]
impl TokenVerifier for SupabaseVerifier {
    async fn verify(&self, token: &str) -> Result<Option<AuthIdentity>, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(status = status.as_u16(), "Token rejected by auth provider");
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let identity = response
            .json::<AuthIdentity>()
            .await
            .map_err(|e| IdentityError::Provider {
                status: status.as_u16(),
                message: format!("Failed to parse user: {}", e),
            })?;

        Ok(Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_provider_json() {
        let identity: AuthIdentity = serde_json::from_str(
            r#"{"id":"u1","email":"dana@example.com","user_metadata":{"name":"Dana","picture":"http://img"}}"#,
        )
        .unwrap();

        assert_eq!(identity.display_name().as_deref(), Some("Dana"));
        assert_eq!(identity.avatar_url().as_deref(), Some("http://img"));
    }

    #[test]
    fn test_identity_without_metadata() {
        let identity: AuthIdentity = serde_json::from_str(r#"{"id":"u1","email":null}"#).unwrap();
        assert!(identity.display_name().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_error() {
        let verifier = SupabaseVerifier::new("http://127.0.0.1:9/", "key").unwrap();
        assert!(matches!(
            verifier.verify("token").await,
            Err(IdentityError::Network(_))
        ));
    }
}
