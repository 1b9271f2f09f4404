//! Shared helpers: an in-memory app with a static token verifier.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ai_core::{async_trait, ModelChain, ModelProvider};
use api::identity::IdentityError;
use api::{app, AppState, AuthIdentity, Config, TokenVerifier};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use database::{profile, Database, NewProfile, ProfileStatus};
use mock_ai::EchoModel;
use serde_json::{json, Value};
use tower::ServiceExt; // for `.oneshot()`

/// Accepts tokens of the form `token-<user id>`.
pub struct StaticVerifier;

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Option<AuthIdentity>, IdentityError> {
        Ok(token.strip_prefix("token-").map(|id| AuthIdentity {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            user_metadata: Default::default(),
        }))
    }
}

pub fn token(user_id: &str) -> String {
    format!("token-{user_id}")
}

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    /// App whose only model echoes the prompt behind a fixed prefix.
    pub async fn new() -> Self {
        Self::with_models(vec![Arc::new(EchoModel::with_prefix("echo-1", "<p>סיכום</p>"))]).await
    }

    pub async fn with_models(models: Vec<Arc<dyn ModelProvider>>) -> Self {
        Self::with_config(models, Config::default()).await
    }

    pub async fn with_config(models: Vec<Arc<dyn ModelProvider>>, config: Config) -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let caps = db.capabilities().await.unwrap();

        let chain = ModelChain::new(models, Duration::from_secs(5));
        let state = AppState::new(db.clone(), caps, Arc::new(StaticVerifier), chain, config);

        Self {
            router: app(state),
            db,
        }
    }

    /// Send a request; returns the status and the JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Insert an approved user and return their token.
    pub async fn approved_user(&self, id: &str) -> String {
        profile::create_profile(
            self.db.pool(),
            &NewProfile {
                id: id.to_string(),
                email: Some(format!("{id}@example.com")),
                full_name: Some(id.to_string()),
                avatar_url: None,
            },
        )
        .await
        .unwrap();
        profile::set_status(self.db.pool(), id, ProfileStatus::Approved)
            .await
            .unwrap();
        token(id)
    }

    /// Insert an approved administrator and return their token.
    pub async fn admin_user(&self, id: &str) -> String {
        let token = self.approved_user(id).await;
        profile::set_admin(self.db.pool(), id, true).await.unwrap();
        token
    }

    /// Create a shared hub through the API and return its id.
    pub async fn shared_hub(&self, owner_token: &str, name: &str) -> String {
        let (status, body) = self
            .post("/api/hubs", owner_token, json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create an item through the API and return its id.
    pub async fn item(&self, token: &str, hub_id: &str, title: &str, content: &str) -> String {
        let (status, body) = self
            .post(
                "/api/items",
                token,
                json!({ "hub_id": hub_id, "title": title, "content": content }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

/// Assert the failure envelope and return the error message.
pub fn error_message(body: &Value) -> String {
    assert_eq!(body["success"], json!(false), "{body}");
    assert!(body["timestamp"].is_string(), "{body}");
    body["error"]["message"].as_str().unwrap().to_string()
}
