//! Persistence gateway for DocCraftAI.
//!
//! This crate provides async database operations for profiles, hubs and
//! their members, the workspace/topic/item hierarchy, the legacy
//! client/project/meeting records and configurable AI prompts, using SQLx.
//!
//! Every table has its own module of free functions taking a pool, so
//! callers compose queries without a shared mutable client.
//!
//! # Example
//!
//! ```no_run
//! use database::{profile, Database, NewProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:doccraft.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let profile = profile::create_profile(
//!         db.pool(),
//!         &NewProfile {
//!             id: "c27fb365-0c84-4cf2-8555-814bb065e448".to_string(),
//!             email: Some("dana@example.com".to_string()),
//!             full_name: Some("Dana".to_string()),
//!             avatar_url: None,
//!         },
//!     )
//!     .await?;
//!     assert!(!profile.is_admin);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod hub;
pub mod item;
pub mod meeting;
pub mod models;
pub mod page;
pub mod processing;
pub mod profile;
pub mod project;
pub mod prompt;
pub mod schema;
pub mod topic;
pub mod translation;
pub mod validation;
pub mod workspace;

pub use error::{DatabaseError, Result};
pub use models::{
    ActionItem, AiPrompt, Client, ContentType, Hub, HubMember, HubRole, HubType, HubWithRole,
    Item, ItemStatus, Meeting, MemberWithProfile, Profile, ProfileStatus, Project,
    ProjectWithClient, PromptSettings, Topic, Translation, Workspace,
};
pub use page::{Page, PageInfo, Paginated, SortOrder};
pub use profile::NewProfile;
pub use schema::{ContentTable, OptionalColumn, SchemaCapabilities};
pub use validation::ValidationError;

pub use sqlx::types::Json;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for an in-memory database in tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(pool_size, "Connected to database");

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Probe which optional columns the connected schema has.
    pub async fn capabilities(&self) -> Result<SchemaCapabilities> {
        schema::probe(&self.pool).await
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Generate a new row id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    /// Insert an approved profile and return its id.
    pub async fn approved_user(db: &Database, id: &str) -> String {
        profile::create_profile(
            db.pool(),
            &NewProfile {
                id: id.to_string(),
                email: Some(format!("{id}@example.com")),
                full_name: Some(id.to_string()),
                avatar_url: None,
            },
        )
        .await
        .unwrap();
        profile::set_status(db.pool(), id, ProfileStatus::Approved)
            .await
            .unwrap();
        id.to_string()
    }

    /// Create a shared hub owned by `owner` and return its id.
    pub async fn shared_hub(db: &Database, owner: &str) -> String {
        hub::create_hub(
            db.pool(),
            &hub::NewHub {
                name: "Team".to_string(),
                hub_type: HubType::Shared,
                color_theme: None,
                icon: None,
            },
            owner,
        )
        .await
        .unwrap()
        .id
    }
}
