//! Item CRUD operations. Every query is scoped to a hub.

use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{ActionItem, ContentType, Item, ItemStatus};
use crate::new_id;
use crate::page::{push_search, Page, Paginated, SortOrder};
use crate::schema::{ContentTable, OptionalColumn, SchemaCapabilities};

/// Fields for a new item. Items always start as drafts.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub hub_id: String,
    pub workspace_id: Option<String>,
    pub topic_id: Option<String>,
    pub title: String,
    pub meeting_date: Option<String>,
    pub meeting_time: Option<String>,
    pub participants: Vec<String>,
    pub content: String,
    pub content_type: ContentType,
    pub full_raw_content: String,
    pub action_items: Vec<ActionItem>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
    pub follow_up_time: Option<String>,
    pub follow_up_tbd: bool,
    pub created_by: String,
}

/// Sortable item columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemSort {
    MeetingDate,
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl ItemSort {
    /// Parse a client-supplied sort key; unknown keys fall back to `created_at`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("meeting_date") => ItemSort::MeetingDate,
            Some("updated_at") => ItemSort::UpdatedAt,
            Some("title") => ItemSort::Title,
            _ => ItemSort::CreatedAt,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            ItemSort::MeetingDate => "meeting_date",
            ItemSort::CreatedAt => "created_at",
            ItemSort::UpdatedAt => "updated_at",
            ItemSort::Title => "title",
        }
    }
}

/// Filters for [`list_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub status: Option<ItemStatus>,
    pub content_type: Option<ContentType>,
    pub workspace_id: Option<String>,
    pub topic_id: Option<String>,
    pub sort: ItemSort,
    pub order: SortOrder,
}

/// Create an item in `draft` status.
pub async fn create_item(
    pool: &SqlitePool,
    caps: &SchemaCapabilities,
    item: &NewItem,
) -> Result<Item> {
    let id = new_id();
    let with_tbd = caps.supports(ContentTable::Items, OptionalColumn::FollowUpTbd);

    let mut qb = QueryBuilder::<Sqlite>::new(
        "INSERT INTO items (id, hub_id, workspace_id, topic_id, title, meeting_date, meeting_time, \
         participants, content, content_type, full_raw_content, status, action_items, \
         follow_up_required, follow_up_date, follow_up_time, created_by",
    );
    if with_tbd {
        qb.push(", follow_up_tbd");
    }
    qb.push(") VALUES (");
    {
        let mut values = qb.separated(", ");
        values
            .push_bind(id.clone())
            .push_bind(item.hub_id.clone())
            .push_bind(item.workspace_id.clone())
            .push_bind(item.topic_id.clone())
            .push_bind(item.title.clone())
            .push_bind(item.meeting_date.clone())
            .push_bind(item.meeting_time.clone())
            .push_bind(Json(item.participants.clone()))
            .push_bind(item.content.clone())
            .push_bind(item.content_type)
            .push_bind(item.full_raw_content.clone())
            .push_bind(ItemStatus::Draft)
            .push_bind(Json(item.action_items.clone()))
            .push_bind(item.follow_up_required)
            .push_bind(item.follow_up_date.clone())
            .push_bind(item.follow_up_time.clone())
            .push_bind(item.created_by.clone());
        if with_tbd {
            values.push_bind(item.follow_up_tbd);
        }
    }
    qb.push(")");
    qb.build().execute(pool).await?;

    get_item(pool, &item.hub_id, &id).await
}

/// Get an item inside a hub.
pub async fn get_item(pool: &SqlitePool, hub_id: &str, id: &str) -> Result<Item> {
    sqlx::query_as::<_, Item>(
        r#"
        SELECT *
        FROM items
        WHERE id = ? AND hub_id = ?
        "#,
    )
    .bind(id)
    .bind(hub_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, hub_id: &str, filter: &ItemFilter) {
    qb.push(" WHERE hub_id = ").push_bind(hub_id.to_string());
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND ");
        push_search(qb, &["title", "content"], term);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(content_type) = filter.content_type {
        qb.push(" AND content_type = ").push_bind(content_type);
    }
    if let Some(workspace_id) = &filter.workspace_id {
        qb.push(" AND workspace_id = ").push_bind(workspace_id.clone());
    }
    if let Some(topic_id) = &filter.topic_id {
        qb.push(" AND topic_id = ").push_bind(topic_id.clone());
    }
}

/// List one page of a hub's items.
pub async fn list_items(
    pool: &SqlitePool,
    hub_id: &str,
    filter: &ItemFilter,
    page: Page,
) -> Result<Paginated<Item>> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM items");
    push_filters(&mut count, hub_id, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM items");
    push_filters(&mut qb, hub_id, filter);
    qb.push(format!(
        " ORDER BY {} {}, id",
        filter.sort.column(),
        filter.order.as_sql()
    ));
    qb.push(" LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = qb.build_query_as::<Item>().fetch_all(pool).await?;
    Ok(Paginated { rows, total })
}

/// Write every mutable column of an item back.
///
/// Callers merge partial updates into the fetched row first; optional
/// columns missing from the schema are skipped.
pub async fn update_item(pool: &SqlitePool, caps: &SchemaCapabilities, item: &Item) -> Result<Item> {
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
    {
        let mut set = qb.separated(", ");
        set.push("workspace_id = ").push_bind_unseparated(item.workspace_id.clone());
        set.push("topic_id = ").push_bind_unseparated(item.topic_id.clone());
        set.push("title = ").push_bind_unseparated(item.title.clone());
        set.push("meeting_date = ").push_bind_unseparated(item.meeting_date.clone());
        set.push("meeting_time = ").push_bind_unseparated(item.meeting_time.clone());
        set.push("participants = ").push_bind_unseparated(item.participants.clone());
        set.push("content = ").push_bind_unseparated(item.content.clone());
        set.push("content_type = ").push_bind_unseparated(item.content_type);
        set.push("full_raw_content = ").push_bind_unseparated(item.full_raw_content.clone());
        set.push("processed_content = ").push_bind_unseparated(item.processed_content.clone());
        set.push("status = ").push_bind_unseparated(item.status);
        set.push("action_items = ").push_bind_unseparated(item.action_items.clone());
        set.push("follow_up_required = ").push_bind_unseparated(item.follow_up_required);
        set.push("follow_up_date = ").push_bind_unseparated(item.follow_up_date.clone());
        set.push("follow_up_time = ").push_bind_unseparated(item.follow_up_time.clone());
        if caps.supports(ContentTable::Items, OptionalColumn::ProcessedBy) {
            set.push("processed_by = ").push_bind_unseparated(item.processed_by.clone());
        }
        if caps.supports(ContentTable::Items, OptionalColumn::ManualUpdateFlag) {
            set.push("is_processed_manually_updated = ")
                .push_bind_unseparated(item.is_processed_manually_updated);
        }
        if caps.supports(ContentTable::Items, OptionalColumn::FollowUpTbd) {
            set.push("follow_up_tbd = ").push_bind_unseparated(item.follow_up_tbd);
        }
        set.push("updated_at = datetime('now')");
    }
    qb.push(" WHERE id = ")
        .push_bind(item.id.clone())
        .push(" AND hub_id = ")
        .push_bind(item.hub_id.clone());

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(not_found(&item.id));
    }

    get_item(pool, &item.hub_id, &item.id).await
}

/// Delete an item inside a hub.
pub async fn delete_item(pool: &SqlitePool, hub_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM items
        WHERE id = ? AND hub_id = ?
        "#,
    )
    .bind(id)
    .bind(hub_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    Ok(())
}

fn not_found(id: &str) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "Item",
        id: id.to_string(),
    }
}
