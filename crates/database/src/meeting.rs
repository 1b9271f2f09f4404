//! Legacy meeting CRUD operations.

use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{ActionItem, ItemStatus, Meeting};
use crate::new_id;
use crate::page::{push_search, Page, Paginated, SortOrder};
use crate::schema::{ContentTable, OptionalColumn, SchemaCapabilities};

/// Fields for a new meeting. Meetings always start as drafts.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeeting {
    pub project_id: Option<String>,
    pub title: String,
    pub meeting_date: Option<String>,
    pub meeting_time: Option<String>,
    pub participants: Vec<String>,
    pub content: String,
    pub full_raw_content: String,
    pub action_items: Vec<ActionItem>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
    pub follow_up_time: Option<String>,
    pub follow_up_tbd: bool,
    pub created_by: String,
}

/// Filters for [`list_meetings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingFilter {
    pub project_id: Option<String>,
    pub status: Option<ItemStatus>,
    pub search: Option<String>,
    pub order: SortOrder,
}

/// Create a meeting in `draft` status.
pub async fn create_meeting(
    pool: &SqlitePool,
    caps: &SchemaCapabilities,
    meeting: &NewMeeting,
) -> Result<Meeting> {
    let id = new_id();
    let with_tbd = caps.supports(ContentTable::Meetings, OptionalColumn::FollowUpTbd);

    let mut qb = QueryBuilder::<Sqlite>::new(
        "INSERT INTO meetings (id, project_id, title, meeting_date, meeting_time, participants, \
         content, full_raw_content, status, action_items, follow_up_required, follow_up_date, \
         follow_up_time, created_by",
    );
    if with_tbd {
        qb.push(", follow_up_tbd");
    }
    qb.push(") VALUES (");
    {
        let mut values = qb.separated(", ");
        values
            .push_bind(id.clone())
            .push_bind(meeting.project_id.clone())
            .push_bind(meeting.title.clone())
            .push_bind(meeting.meeting_date.clone())
            .push_bind(meeting.meeting_time.clone())
            .push_bind(Json(meeting.participants.clone()))
            .push_bind(meeting.content.clone())
            .push_bind(meeting.full_raw_content.clone())
            .push_bind(ItemStatus::Draft)
            .push_bind(Json(meeting.action_items.clone()))
            .push_bind(meeting.follow_up_required)
            .push_bind(meeting.follow_up_date.clone())
            .push_bind(meeting.follow_up_time.clone())
            .push_bind(meeting.created_by.clone());
        if with_tbd {
            values.push_bind(meeting.follow_up_tbd);
        }
    }
    qb.push(")");
    qb.build().execute(pool).await?;

    get_meeting(pool, &id).await
}

/// Get a meeting by id.
pub async fn get_meeting(pool: &SqlitePool, id: &str) -> Result<Meeting> {
    sqlx::query_as::<_, Meeting>(
        r#"
        SELECT *
        FROM meetings
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &MeetingFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(project_id) = &filter.project_id {
        qb.push(" AND project_id = ").push_bind(project_id.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND ");
        push_search(qb, &["title", "content"], term);
    }
}

/// List one page of meetings ordered by meeting date.
pub async fn list_meetings(
    pool: &SqlitePool,
    filter: &MeetingFilter,
    page: Page,
) -> Result<Paginated<Meeting>> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM meetings");
    push_filters(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM meetings");
    push_filters(&mut qb, filter);
    qb.push(format!(
        " ORDER BY meeting_date {order}, created_at {order}, id",
        order = filter.order.as_sql()
    ));
    qb.push(" LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = qb.build_query_as::<Meeting>().fetch_all(pool).await?;
    Ok(Paginated { rows, total })
}

/// Write every mutable column of a meeting back.
pub async fn update_meeting(
    pool: &SqlitePool,
    caps: &SchemaCapabilities,
    meeting: &Meeting,
) -> Result<Meeting> {
    let table = ContentTable::Meetings;
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE meetings SET ");
    {
        let mut set = qb.separated(", ");
        set.push("project_id = ").push_bind_unseparated(meeting.project_id.clone());
        set.push("title = ").push_bind_unseparated(meeting.title.clone());
        set.push("meeting_date = ").push_bind_unseparated(meeting.meeting_date.clone());
        set.push("meeting_time = ").push_bind_unseparated(meeting.meeting_time.clone());
        set.push("participants = ").push_bind_unseparated(meeting.participants.clone());
        set.push("content = ").push_bind_unseparated(meeting.content.clone());
        set.push("full_raw_content = ").push_bind_unseparated(meeting.full_raw_content.clone());
        set.push("processed_content = ").push_bind_unseparated(meeting.processed_content.clone());
        set.push("status = ").push_bind_unseparated(meeting.status);
        set.push("action_items = ").push_bind_unseparated(meeting.action_items.clone());
        set.push("follow_up_required = ").push_bind_unseparated(meeting.follow_up_required);
        set.push("follow_up_date = ").push_bind_unseparated(meeting.follow_up_date.clone());
        set.push("follow_up_time = ").push_bind_unseparated(meeting.follow_up_time.clone());
        if caps.supports(table, OptionalColumn::ProcessedBy) {
            set.push("processed_by = ").push_bind_unseparated(meeting.processed_by.clone());
        }
        if caps.supports(table, OptionalColumn::ManualUpdateFlag) {
            set.push("is_processed_manually_updated = ")
                .push_bind_unseparated(meeting.is_processed_manually_updated);
        }
        if caps.supports(table, OptionalColumn::FollowUpTbd) {
            set.push("follow_up_tbd = ").push_bind_unseparated(meeting.follow_up_tbd);
        }
        set.push("updated_at = datetime('now')");
    }
    qb.push(" WHERE id = ").push_bind(meeting.id.clone());

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(not_found(&meeting.id));
    }

    get_meeting(pool, &meeting.id).await
}

/// Delete a meeting.
pub async fn delete_meeting(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM meetings
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    Ok(())
}

fn not_found(id: &str) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "Meeting",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn new_meeting(title: &str, date: &str) -> NewMeeting {
        NewMeeting {
            project_id: None,
            title: title.to_string(),
            meeting_date: Some(date.to_string()),
            meeting_time: Some("10:00".to_string()),
            participants: vec!["Dana".to_string()],
            content: "Notes".to_string(),
            full_raw_content: "<div dir=\"rtl\">Notes</div>".to_string(),
            action_items: Vec::new(),
            follow_up_required: true,
            follow_up_date: None,
            follow_up_time: None,
            follow_up_tbd: true,
            created_by: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_meeting_crud() {
        let db = test_db().await;
        let caps = SchemaCapabilities::full();
        let mut meeting = create_meeting(db.pool(), &caps, &new_meeting("Weekly", "2025-01-15"))
            .await
            .unwrap();
        assert_eq!(meeting.status, ItemStatus::Draft);
        assert!(meeting.follow_up_tbd);

        meeting.status = ItemStatus::Final;
        let updated = update_meeting(db.pool(), &caps, &meeting).await.unwrap();
        assert_eq!(updated.status, ItemStatus::Final);

        delete_meeting(db.pool(), &meeting.id).await.unwrap();
        assert!(matches!(
            get_meeting(db.pool(), &meeting.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_meetings_newest_first() {
        let db = test_db().await;
        let caps = SchemaCapabilities::full();
        for (title, date) in [("Jan", "2025-01-15"), ("Mar", "2025-03-01"), ("Feb", "2025-02-10")] {
            create_meeting(db.pool(), &caps, &new_meeting(title, date)).await.unwrap();
        }

        let listed = list_meetings(db.pool(), &MeetingFilter::default(), Page::default())
            .await
            .unwrap();
        let titles: Vec<_> = listed.rows.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Mar", "Feb", "Jan"]);
    }
}
