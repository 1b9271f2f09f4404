//! Project CRUD operations.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Project, ProjectWithClient};
use crate::new_id;
use crate::page::{push_search, Page, Paginated};

/// Project fields supplied on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFields {
    pub client_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Filters for [`list_projects`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub client_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

const SELECT_WITH_CLIENT: &str =
    "SELECT p.*, c.name AS client_name FROM projects p LEFT JOIN clients c ON c.id = p.client_id";

/// Create a project. `fields.name` must be set by the caller.
pub async fn create_project(pool: &SqlitePool, fields: &ProjectFields, created_by: &str) -> Result<Project> {
    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO projects (id, client_id, name, description, status, created_by)
        VALUES (?, ?, ?, ?, COALESCE(?, 'active'), ?)
        "#,
    )
    .bind(&id)
    .bind(&fields.client_id)
    .bind(fields.name.as_deref().unwrap_or_default())
    .bind(&fields.description)
    .bind(&fields.status)
    .bind(created_by)
    .execute(pool)
    .await?;

    get_project(pool, &id).await
}

/// Get a project by id.
pub async fn get_project(pool: &SqlitePool, id: &str) -> Result<Project> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT *
        FROM projects
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

/// Get a project together with its client's name.
pub async fn get_project_with_client(pool: &SqlitePool, id: &str) -> Result<ProjectWithClient> {
    sqlx::query_as::<_, ProjectWithClient>(&format!("{SELECT_WITH_CLIENT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProjectFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(client_id) = &filter.client_id {
        qb.push(" AND p.client_id = ").push_bind(client_id.clone());
    }
    if let Some(status) = &filter.status {
        qb.push(" AND p.status = ").push_bind(status.clone());
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND ");
        push_search(qb, &["p.name", "p.description"], term);
    }
}

/// List one page of projects with client names, newest first.
pub async fn list_projects(
    pool: &SqlitePool,
    filter: &ProjectFilter,
    page: Page,
) -> Result<Paginated<ProjectWithClient>> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM projects p");
    push_filters(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_WITH_CLIENT);
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY p.created_at DESC, p.id LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = qb.build_query_as::<ProjectWithClient>().fetch_all(pool).await?;
    Ok(Paginated { rows, total })
}

/// Update a project. `None` fields are left unchanged.
pub async fn update_project(pool: &SqlitePool, id: &str, fields: &ProjectFields) -> Result<Project> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET client_id = COALESCE(?, client_id),
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            status = COALESCE(?, status),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&fields.client_id)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(&fields.status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    get_project(pool, id).await
}

/// Delete a project.
pub async fn delete_project(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM projects
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
        entity: "Project",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{create_client, ClientFields};
    use crate::test_support::test_db;

    #[tokio::test]
    async fn test_project_with_client_name() {
        let db = test_db().await;
        let client = create_client(
            db.pool(),
            &ClientFields {
                name: Some("Acme".to_string()),
                ..Default::default()
            },
            "u1",
        )
        .await
        .unwrap();

        let project = create_project(
            db.pool(),
            &ProjectFields {
                client_id: Some(client.id.clone()),
                name: Some("Website".to_string()),
                ..Default::default()
            },
            "u1",
        )
        .await
        .unwrap();
        assert_eq!(project.status, "active");

        let joined = get_project_with_client(db.pool(), &project.id).await.unwrap();
        assert_eq!(joined.client_name.as_deref(), Some("Acme"));

        let listed = list_projects(
            db.pool(),
            &ProjectFilter {
                client_id: Some(client.id),
                ..Default::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
        assert_eq!(listed.total, 1);
    }

    #[tokio::test]
    async fn test_project_with_unknown_client_is_rejected() {
        let db = test_db().await;
        let result = create_project(
            db.pool(),
            &ProjectFields {
                client_id: Some("missing".to_string()),
                name: Some("Orphan".to_string()),
                ..Default::default()
            },
            "u1",
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::InvalidReference(_))));
    }
}
