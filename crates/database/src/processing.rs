//! AI processing state transitions shared by items and meetings.
//!
//! A processing run claims the row with a compare-and-swap on `status`, so
//! two concurrent runs on the same record cannot both start.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::ItemStatus;
use crate::schema::{ContentTable, OptionalColumn, SchemaCapabilities};

/// Move a record to `processing` if its status is still `expected`.
///
/// Returns `false` when another writer changed the status first.
pub async fn mark_processing(
    pool: &SqlitePool,
    table: ContentTable,
    id: &str,
    expected: ItemStatus,
) -> Result<bool> {
    let query = format!(
        "UPDATE {} SET status = ?, updated_at = datetime('now') WHERE id = ? AND status = ?",
        table.table_name()
    );
    let result = sqlx::query(&query)
        .bind(ItemStatus::Processing)
        .bind(id)
        .bind(expected)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Store a successful processing result and mark the record `processed`.
///
/// Clears the manual-edit flag, since the stored text is fresh model output.
pub async fn complete_processing(
    pool: &SqlitePool,
    caps: &SchemaCapabilities,
    table: ContentTable,
    id: &str,
    processed_content: &str,
    processed_by: &str,
) -> Result<()> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", table.table_name()));
    {
        let mut set = qb.separated(", ");
        set.push("status = ").push_bind_unseparated(ItemStatus::Processed);
        set.push("processed_content = ")
            .push_bind_unseparated(processed_content.to_string());
        if caps.supports(table, OptionalColumn::ProcessedBy) {
            set.push("processed_by = ").push_bind_unseparated(processed_by.to_string());
        }
        if caps.supports(table, OptionalColumn::ManualUpdateFlag) {
            set.push("is_processed_manually_updated = 0");
        }
        set.push("updated_at = datetime('now')");
    }
    qb.push(" WHERE id = ").push_bind(id.to_string());

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: table.entity(),
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Put back the status a record had before a failed processing run.
pub async fn restore_status(
    pool: &SqlitePool,
    table: ContentTable,
    id: &str,
    status: ItemStatus,
) -> Result<()> {
    let query = format!(
        "UPDATE {} SET status = ?, updated_at = datetime('now') WHERE id = ?",
        table.table_name()
    );
    sqlx::query(&query)
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{create_item, get_item, tests::new_item};
    use crate::schema::probe;
    use crate::test_support::{approved_user, shared_hub, test_db};
    use crate::Database;

    #[tokio::test]
    async fn test_processing_lifecycle() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let hub = shared_hub(&db, &owner).await;
        let caps = SchemaCapabilities::full();
        let item = create_item(db.pool(), &caps, &new_item(&hub, "Kickoff"))
            .await
            .unwrap();

        assert!(mark_processing(db.pool(), ContentTable::Items, &item.id, ItemStatus::Draft)
            .await
            .unwrap());
        // A second run reading the stale draft status loses the race.
        assert!(!mark_processing(db.pool(), ContentTable::Items, &item.id, ItemStatus::Draft)
            .await
            .unwrap());

        complete_processing(
            db.pool(),
            &caps,
            ContentTable::Items,
            &item.id,
            "<p>summary</p>",
            "gemini-2.0-flash",
        )
        .await
        .unwrap();

        let done = get_item(db.pool(), &hub, &item.id).await.unwrap();
        assert_eq!(done.status, ItemStatus::Processed);
        assert_eq!(done.processed_content.as_deref(), Some("<p>summary</p>"));
        assert_eq!(done.processed_by.as_deref(), Some("gemini-2.0-flash"));
    }

    #[tokio::test]
    async fn test_restore_status_after_failure() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let hub = shared_hub(&db, &owner).await;
        let caps = SchemaCapabilities::full();
        let item = create_item(db.pool(), &caps, &new_item(&hub, "Kickoff"))
            .await
            .unwrap();

        mark_processing(db.pool(), ContentTable::Items, &item.id, ItemStatus::Draft)
            .await
            .unwrap();
        restore_status(db.pool(), ContentTable::Items, &item.id, ItemStatus::Draft)
            .await
            .unwrap();

        let restored = get_item(db.pool(), &hub, &item.id).await.unwrap();
        assert_eq!(restored.status, ItemStatus::Draft);
    }

    #[tokio::test]
    async fn test_complete_processing_on_legacy_schema() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        // Meetings table as created before processed_by and the manual-edit
        // flag existed.
        sqlx::query(
            r#"
            CREATE TABLE meetings (
                id TEXT PRIMARY KEY NOT NULL,
                project_id TEXT,
                title TEXT NOT NULL,
                meeting_date TEXT,
                meeting_time TEXT,
                participants TEXT NOT NULL DEFAULT '[]',
                content TEXT NOT NULL DEFAULT '',
                full_raw_content TEXT,
                processed_content TEXT,
                status TEXT NOT NULL DEFAULT 'draft',
                action_items TEXT NOT NULL DEFAULT '[]',
                follow_up_required INTEGER NOT NULL DEFAULT 0,
                follow_up_date TEXT,
                follow_up_time TEXT,
                created_by TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query("CREATE TABLE items (id TEXT PRIMARY KEY NOT NULL)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO meetings (id, title, status) VALUES ('m1', 'Legacy', 'processing')")
            .execute(db.pool())
            .await
            .unwrap();

        let caps = probe(db.pool()).await.unwrap();
        assert!(!caps.supports(ContentTable::Meetings, OptionalColumn::ProcessedBy));

        complete_processing(db.pool(), &caps, ContentTable::Meetings, "m1", "<p>ok</p>", "m")
            .await
            .unwrap();

        let meeting = crate::meeting::get_meeting(db.pool(), "m1").await.unwrap();
        assert_eq!(meeting.status, ItemStatus::Processed);
        assert!(meeting.processed_by.is_none());
        assert!(!meeting.follow_up_tbd);
    }
}
