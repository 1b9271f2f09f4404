//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Approval state of a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProfileStatus {
    Pending,
    Approved,
    Rejected,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Pending => "pending",
            ProfileStatus::Approved => "approved",
            ProfileStatus::Rejected => "rejected",
        }
    }
}

/// Kind of hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum HubType {
    /// Single-user hub provisioned on approval.
    Personal,
    /// Hub created explicitly and shared with other members.
    Shared,
}

/// Role of a user inside a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum HubRole {
    Owner,
    Member,
}

/// What kind of record an item holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Meeting,
    WorkLog,
    Knowledge,
}

/// Lifecycle state of an item or meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Draft,
    Processing,
    Processed,
    Final,
    Archived,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Draft => "draft",
            ItemStatus::Processing => "processing",
            ItemStatus::Processed => "processed",
            ItemStatus::Final => "final",
            ItemStatus::Archived => "archived",
        }
    }
}

/// A follow-up task recorded on an item or meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Identity record keyed by the auth provider's user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: ProfileStatus,
    pub is_admin: bool,
    pub last_active_hub_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A tenant container owning members and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Hub {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub hub_type: HubType,
    pub color_theme: Option<String>,
    pub icon: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A hub together with the caller's role in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct HubWithRole {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub hub: Hub,
    pub role: HubRole,
}

/// Membership of a user in a hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct HubMember {
    pub id: String,
    pub hub_id: String,
    pub user_id: String,
    pub role: HubRole,
    pub joined_at: String,
}

/// Membership row joined with the member's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MemberWithProfile {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub member: HubMember,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A grouping of topics inside a hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Workspace {
    pub id: String,
    pub hub_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A grouping of items inside a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: String,
    pub hub_id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub budget: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The core content record of a hub.
///
/// Columns added by later migrations are `#[sqlx(default)]` so rows from an
/// older schema still decode.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: String,
    pub hub_id: String,
    pub workspace_id: Option<String>,
    pub topic_id: Option<String>,
    pub title: String,
    pub meeting_date: Option<String>,
    pub meeting_time: Option<String>,
    pub participants: Json<Vec<String>>,
    pub content: String,
    pub content_type: ContentType,
    pub full_raw_content: Option<String>,
    pub processed_content: Option<String>,
    #[sqlx(default)]
    pub processed_by: Option<String>,
    #[sqlx(default)]
    pub is_processed_manually_updated: bool,
    pub status: ItemStatus,
    pub action_items: Json<Vec<ActionItem>>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
    pub follow_up_time: Option<String>,
    #[sqlx(default)]
    pub follow_up_tbd: bool,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A legacy customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A legacy project, optionally belonging to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub client_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A project joined with its client's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProjectWithClient {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub project: Project,
    pub client_name: Option<String>,
}

/// Legacy meeting record, the predecessor of [`Item`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meeting {
    pub id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub meeting_date: Option<String>,
    pub meeting_time: Option<String>,
    pub participants: Json<Vec<String>>,
    pub content: String,
    pub full_raw_content: Option<String>,
    pub processed_content: Option<String>,
    #[sqlx(default)]
    pub processed_by: Option<String>,
    #[sqlx(default)]
    pub is_processed_manually_updated: bool,
    pub status: ItemStatus,
    pub action_items: Json<Vec<ActionItem>>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
    pub follow_up_time: Option<String>,
    #[sqlx(default)]
    pub follow_up_tbd: bool,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A translated copy of an item or meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Translation {
    pub id: String,
    pub record_id: String,
    pub language: String,
    pub content: String,
    pub translated_by: Option<String>,
    pub created_at: String,
}

/// Prompt configuration stored alongside a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A database-configured prompt template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiPrompt {
    /// Logical id: `PROCESS`, `TRANSLATE` or `ENRICH`.
    pub id: String,
    pub name: String,
    pub content: String,
    pub configuration: Json<PromptSettings>,
    pub updated_by: Option<String>,
    pub updated_at: String,
}
