//! Workspace CRUD operations. Every query is scoped to a hub.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::Workspace;
use crate::new_id;
use crate::page::{push_search, Page, Paginated};

/// Fields for a new workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkspace {
    pub hub_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub created_by: String,
}

/// Partial workspace update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Create a workspace.
pub async fn create_workspace(pool: &SqlitePool, workspace: &NewWorkspace) -> Result<Workspace> {
    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO workspaces (id, hub_id, name, description, color, created_by)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&workspace.hub_id)
    .bind(&workspace.name)
    .bind(&workspace.description)
    .bind(&workspace.color)
    .bind(&workspace.created_by)
    .execute(pool)
    .await?;

    get_workspace(pool, &workspace.hub_id, &id).await
}

/// Get a workspace inside a hub.
pub async fn get_workspace(pool: &SqlitePool, hub_id: &str, id: &str) -> Result<Workspace> {
    sqlx::query_as::<_, Workspace>(
        r#"
        SELECT *
        FROM workspaces
        WHERE id = ? AND hub_id = ?
        "#,
    )
    .bind(id)
    .bind(hub_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, hub_id: &str, search: Option<&str>) {
    qb.push(" WHERE hub_id = ").push_bind(hub_id.to_string());
    if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
        qb.push(" AND ");
        push_search(qb, &["name", "description"], term);
    }
}

/// List one page of a hub's workspaces ordered by name.
pub async fn list_workspaces(
    pool: &SqlitePool,
    hub_id: &str,
    search: Option<&str>,
    page: Page,
) -> Result<Paginated<Workspace>> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM workspaces");
    push_filters(&mut count, hub_id, search);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM workspaces");
    push_filters(&mut qb, hub_id, search);
    qb.push(" ORDER BY name, id LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = qb.build_query_as::<Workspace>().fetch_all(pool).await?;
    Ok(Paginated { rows, total })
}

/// Update a workspace inside a hub.
pub async fn update_workspace(
    pool: &SqlitePool,
    hub_id: &str,
    id: &str,
    changes: &WorkspaceChanges,
) -> Result<Workspace> {
    let result = sqlx::query(
        r#"
        UPDATE workspaces
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            color = COALESCE(?, color),
            updated_at = datetime('now')
        WHERE id = ? AND hub_id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(&changes.color)
    .bind(id)
    .bind(hub_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    get_workspace(pool, hub_id, id).await
}

/// Delete a workspace inside a hub.
pub async fn delete_workspace(pool: &SqlitePool, hub_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM workspaces
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
        entity: "Workspace",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{approved_user, shared_hub, test_db};

    fn new_workspace(hub_id: &str, name: &str) -> NewWorkspace {
        NewWorkspace {
            hub_id: hub_id.to_string(),
            name: name.to_string(),
            description: None,
            color: None,
            created_by: "owner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_workspace_crud_is_hub_scoped() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let hub_a = shared_hub(&db, &owner).await;
        let hub_b = shared_hub(&db, &owner).await;

        let ws = create_workspace(db.pool(), &new_workspace(&hub_a, "Marketing"))
            .await
            .unwrap();

        assert!(get_workspace(db.pool(), &hub_a, &ws.id).await.is_ok());
        assert!(matches!(
            get_workspace(db.pool(), &hub_b, &ws.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            delete_workspace(db.pool(), &hub_b, &ws.id).await,
            Err(DatabaseError::NotFound { .. })
        ));

        let updated = update_workspace(
            db.pool(),
            &hub_a,
            &ws.id,
            &WorkspaceChanges {
                color: Some("#ff0000".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Marketing");
        assert_eq!(updated.color.as_deref(), Some("#ff0000"));

        delete_workspace(db.pool(), &hub_a, &ws.id).await.unwrap();
        let left = list_workspaces(db.pool(), &hub_a, None, Page::default()).await.unwrap();
        assert_eq!(left.total, 0);
    }

    #[tokio::test]
    async fn test_list_workspaces_search() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let hub = shared_hub(&db, &owner).await;
        for name in ["Marketing", "Engineering", "Market research"] {
            create_workspace(db.pool(), &new_workspace(&hub, name))
                .await
                .unwrap();
        }

        let found = list_workspaces(db.pool(), &hub, Some("market"), Page::default())
            .await
            .unwrap();
        assert_eq!(found.total, 2);

        let second = list_workspaces(db.pool(), &hub, None, Page::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(second.total, 3);
        assert_eq!(second.rows.len(), 1);
        assert_eq!(second.rows[0].name, "Marketing");
    }
}
