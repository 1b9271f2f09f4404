//! Client CRUD operations.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::Client;
use crate::new_id;
use crate::page::{push_search, Page, Paginated};

/// Client fields supplied on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

/// Create a client. `fields.name` must be set by the caller.
pub async fn create_client(pool: &SqlitePool, fields: &ClientFields, created_by: &str) -> Result<Client> {
    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO clients (id, name, email, phone, company, notes, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(fields.name.as_deref().unwrap_or_default())
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(&fields.company)
    .bind(&fields.notes)
    .bind(created_by)
    .execute(pool)
    .await?;

    get_client(pool, &id).await
}

/// Get a client by id.
pub async fn get_client(pool: &SqlitePool, id: &str) -> Result<Client> {
    sqlx::query_as::<_, Client>(
        r#"
        SELECT *
        FROM clients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, search: Option<&str>) {
    if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
        qb.push(" WHERE ");
        push_search(qb, &["name", "email", "company"], term);
    }
}

/// List one page of clients ordered by name.
pub async fn list_clients(pool: &SqlitePool, search: Option<&str>, page: Page) -> Result<Paginated<Client>> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM clients");
    push_filters(&mut count, search);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM clients");
    push_filters(&mut qb, search);
    qb.push(" ORDER BY name, id LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = qb.build_query_as::<Client>().fetch_all(pool).await?;
    Ok(Paginated { rows, total })
}

/// Update a client. `None` fields are left unchanged.
pub async fn update_client(pool: &SqlitePool, id: &str, fields: &ClientFields) -> Result<Client> {
    let result = sqlx::query(
        r#"
        UPDATE clients
        SET name = COALESCE(?, name),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone),
            company = COALESCE(?, company),
            notes = COALESCE(?, notes),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(&fields.company)
    .bind(&fields.notes)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    get_client(pool, id).await
}

/// Delete a client.
pub async fn delete_client(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM clients
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
        entity: "Client",
        id: id.to_string(),
    }
}
