//! Topic CRUD operations. Every query is scoped to a hub.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::Topic;
use crate::new_id;
use crate::page::{push_search, Page, Paginated};

/// Fields for a new topic.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopic {
    pub hub_id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub created_by: String,
}

/// Partial topic update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicChanges {
    pub workspace_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub estimated_hours: Option<f64>,
}

/// Filters for [`list_topics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
    pub workspace_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Create a topic.
pub async fn create_topic(pool: &SqlitePool, topic: &NewTopic) -> Result<Topic> {
    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO topics (id, hub_id, workspace_id, name, description, status, budget, estimated_hours, created_by)
        VALUES (?, ?, ?, ?, ?, COALESCE(?, 'active'), ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&topic.hub_id)
    .bind(&topic.workspace_id)
    .bind(&topic.name)
    .bind(&topic.description)
    .bind(&topic.status)
    .bind(topic.budget)
    .bind(topic.estimated_hours)
    .bind(&topic.created_by)
    .execute(pool)
    .await?;

    get_topic(pool, &topic.hub_id, &id).await
}

/// Get a topic inside a hub.
pub async fn get_topic(pool: &SqlitePool, hub_id: &str, id: &str) -> Result<Topic> {
    sqlx::query_as::<_, Topic>(
        r#"
        SELECT *
        FROM topics
        WHERE id = ? AND hub_id = ?
        "#,
    )
    .bind(id)
    .bind(hub_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, hub_id: &str, filter: &TopicFilter) {
    qb.push(" WHERE hub_id = ").push_bind(hub_id.to_string());
    if let Some(workspace_id) = &filter.workspace_id {
        qb.push(" AND workspace_id = ").push_bind(workspace_id.clone());
    }
    if let Some(status) = &filter.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND ");
        push_search(qb, &["name", "description"], term);
    }
}

/// List one page of a hub's topics ordered by name.
pub async fn list_topics(
    pool: &SqlitePool,
    hub_id: &str,
    filter: &TopicFilter,
    page: Page,
) -> Result<Paginated<Topic>> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM topics");
    push_filters(&mut count, hub_id, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM topics");
    push_filters(&mut qb, hub_id, filter);
    qb.push(" ORDER BY name, id LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = qb.build_query_as::<Topic>().fetch_all(pool).await?;
    Ok(Paginated { rows, total })
}

/// Update a topic inside a hub.
///
/// Moving a topic to another workspace moves its items with it.
pub async fn update_topic(
    pool: &SqlitePool,
    hub_id: &str,
    id: &str,
    changes: &TopicChanges,
) -> Result<Topic> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE topics
        SET workspace_id = COALESCE(?, workspace_id),
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            status = COALESCE(?, status),
            budget = COALESCE(?, budget),
            estimated_hours = COALESCE(?, estimated_hours),
            updated_at = datetime('now')
        WHERE id = ? AND hub_id = ?
        "#,
    )
    .bind(&changes.workspace_id)
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(&changes.status)
    .bind(changes.budget)
    .bind(changes.estimated_hours)
    .bind(id)
    .bind(hub_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    if let Some(workspace_id) = &changes.workspace_id {
        sqlx::query(
            r#"
            UPDATE items
            SET workspace_id = ?, updated_at = datetime('now')
            WHERE topic_id = ? AND hub_id = ? AND workspace_id IS NOT ?
            "#,
        )
        .bind(workspace_id)
        .bind(id)
        .bind(hub_id)
        .bind(workspace_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_topic(pool, hub_id, id).await
}

/// Delete a topic inside a hub.
pub async fn delete_topic(pool: &SqlitePool, hub_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM topics
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
        entity: "Topic",
        id: id.to_string(),
    }
}
