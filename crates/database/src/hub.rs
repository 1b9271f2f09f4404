//! Hub and hub membership operations.

use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use crate::error::{map_unique, DatabaseError, Result};
use crate::models::{Hub, HubMember, HubRole, HubType, HubWithRole, MemberWithProfile};
use crate::new_id;
use crate::page::{Page, Paginated};

/// Fields for a new hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHub {
    pub name: String,
    pub hub_type: HubType,
    pub color_theme: Option<String>,
    pub icon: Option<String>,
}

/// Partial hub update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubChanges {
    pub name: Option<String>,
    pub color_theme: Option<String>,
    pub icon: Option<String>,
}

/// Create a hub and make `owner_id` its owner in one transaction.
pub async fn create_hub(pool: &SqlitePool, hub: &NewHub, owner_id: &str) -> Result<Hub> {
    let mut tx = pool.begin().await?;
    let id = insert_hub(&mut *tx, hub, owner_id).await?;
    tx.commit().await?;

    tracing::info!(hub_id = %id, owner = %owner_id, "Created hub");
    get_hub(pool, &id).await
}

/// Insert a hub row and its owner membership on an open connection.
pub(crate) async fn insert_hub(
    conn: &mut SqliteConnection,
    hub: &NewHub,
    owner_id: &str,
) -> Result<String> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO hubs (id, name, type, color_theme, icon, created_by)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&hub.name)
    .bind(hub.hub_type)
    .bind(&hub.color_theme)
    .bind(&hub.icon)
    .bind(owner_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO hub_members (id, hub_id, user_id, role)
        VALUES (?, ?, ?, 'owner')
        "#,
    )
    .bind(new_id())
    .bind(&id)
    .bind(owner_id)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

/// Get a hub by id.
pub async fn get_hub(pool: &SqlitePool, id: &str) -> Result<Hub> {
    sqlx::query_as::<_, Hub>(
        r#"
        SELECT *
        FROM hubs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Hub",
        id: id.to_string(),
    })
}

/// Update hub attributes.
pub async fn update_hub(pool: &SqlitePool, id: &str, changes: &HubChanges) -> Result<Hub> {
    let result = sqlx::query(
        r#"
        UPDATE hubs
        SET name = COALESCE(?, name),
            color_theme = COALESCE(?, color_theme),
            icon = COALESCE(?, icon),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.color_theme)
    .bind(&changes.icon)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Hub",
            id: id.to_string(),
        });
    }

    get_hub(pool, id).await
}

/// Delete a hub. Memberships and content cascade in the schema.
pub async fn delete_hub(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM hubs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Hub",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List the hubs a user belongs to, with the user's role in each.
pub async fn list_hubs_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<HubWithRole>> {
    let hubs = sqlx::query_as::<_, HubWithRole>(
        r#"
        SELECT h.*, m.role
        FROM hubs h
        JOIN hub_members m ON m.hub_id = h.id
        WHERE m.user_id = ?
        ORDER BY h.type = 'personal' DESC, h.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(hubs)
}

/// One page of the hubs a user belongs to, personal hub first.
pub async fn page_hubs_for_user(pool: &SqlitePool, user_id: &str, page: Page) -> Result<Paginated<HubWithRole>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hub_members WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, HubWithRole>(
        r#"
        SELECT h.*, m.role
        FROM hubs h
        JOIN hub_members m ON m.hub_id = h.id
        WHERE m.user_id = ?
        ORDER BY h.type = 'personal' DESC, h.created_at, h.id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(i64::from(page.limit))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated { rows, total })
}

/// Find the personal hub created by a user, if any.
pub async fn find_personal_hub<'e, E>(executor: E, user_id: &str) -> Result<Option<Hub>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let hub = sqlx::query_as::<_, Hub>(
        r#"
        SELECT *
        FROM hubs
        WHERE created_by = ? AND type = 'personal'
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(hub)
}

/// Get the membership row for a (hub, user) pair.
pub async fn get_membership(
    pool: &SqlitePool,
    hub_id: &str,
    user_id: &str,
) -> Result<Option<HubMember>> {
    let member = sqlx::query_as::<_, HubMember>(
        r#"
        SELECT *
        FROM hub_members
        WHERE hub_id = ? AND user_id = ?
        "#,
    )
    .bind(hub_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(member)
}

/// Add a user to a hub.
///
/// Returns [`DatabaseError::AlreadyExists`] when the user is already a member.
pub async fn add_member(
    pool: &SqlitePool,
    hub_id: &str,
    user_id: &str,
    role: HubRole,
) -> Result<HubMember> {
    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO hub_members (id, hub_id, user_id, role)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(hub_id)
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await
    .map_err(map_unique("HubMember", format!("{}/{}", hub_id, user_id)))?;

    get_membership(pool, hub_id, user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "HubMember",
            id,
        })
}

/// List the members of a hub with their profile details.
pub async fn list_members(pool: &SqlitePool, hub_id: &str) -> Result<Vec<MemberWithProfile>> {
    let members = sqlx::query_as::<_, MemberWithProfile>(
        r#"
        SELECT m.*, p.email, p.full_name, p.avatar_url
        FROM hub_members m
        LEFT JOIN profiles p ON p.id = m.user_id
        WHERE m.hub_id = ?
        ORDER BY m.role = 'owner' DESC, m.joined_at
        "#,
    )
    .bind(hub_id)
    .fetch_all(pool)
    .await?;

    Ok(members)
}

/// Remove a user from a hub.
pub async fn remove_member(pool: &SqlitePool, hub_id: &str, user_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM hub_members
        WHERE hub_id = ? AND user_id = ?
        "#,
    )
    .bind(hub_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "HubMember",
            id: format!("{}/{}", hub_id, user_id),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{approved_user, shared_hub, test_db};

    #[tokio::test]
    async fn test_create_hub_makes_creator_owner() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let hub_id = shared_hub(&db, &owner).await;

        let membership = get_membership(db.pool(), &hub_id, &owner)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.role, HubRole::Owner);

        let hubs = list_hubs_for_user(db.pool(), &owner).await.unwrap();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].hub.id, hub_id);
        assert_eq!(hubs[0].role, HubRole::Owner);

        let second = create_hub(
            db.pool(),
            &NewHub {
                name: "Second".to_string(),
                hub_type: HubType::Shared,
                color_theme: None,
                icon: None,
            },
            &owner,
        )
        .await
        .unwrap();
        let page = page_hubs_for_user(db.pool(), &owner, Page::new(Some(2), Some(1)))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.rows.len(), 1);
        assert!([hub_id.as_str(), second.id.as_str()].contains(&page.rows[0].hub.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_member_rejected() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let other = approved_user(&db, "other").await;
        let hub_id = shared_hub(&db, &owner).await;

        add_member(db.pool(), &hub_id, &other, HubRole::Member)
            .await
            .unwrap();
        let again = add_member(db.pool(), &hub_id, &other, HubRole::Member).await;
        assert!(matches!(again, Err(DatabaseError::AlreadyExists { .. })));

        let members = list_members(db.pool(), &hub_id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].member.role, HubRole::Owner);
    }

    #[tokio::test]
    async fn test_remove_member() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let other = approved_user(&db, "other").await;
        let hub_id = shared_hub(&db, &owner).await;
        add_member(db.pool(), &hub_id, &other, HubRole::Member)
            .await
            .unwrap();

        remove_member(db.pool(), &hub_id, &other).await.unwrap();
        assert!(get_membership(db.pool(), &hub_id, &other)
            .await
            .unwrap()
            .is_none());

        let again = remove_member(db.pool(), &hub_id, &other).await;
        assert!(matches!(again, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_hub_cascades_memberships() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let hub_id = shared_hub(&db, &owner).await;

        delete_hub(db.pool(), &hub_id).await.unwrap();
        assert!(get_membership(db.pool(), &hub_id, &owner)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            get_hub(db.pool(), &hub_id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_hub_partial() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        let hub_id = shared_hub(&db, &owner).await;

        let updated = update_hub(
            db.pool(),
            &hub_id,
            &HubChanges {
                icon: Some("rocket".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Team");
        assert_eq!(updated.icon.as_deref(), Some("rocket"));
    }

    #[tokio::test]
    async fn test_find_personal_hub() {
        let db = test_db().await;
        let owner = approved_user(&db, "owner").await;
        assert!(find_personal_hub(db.pool(), &owner).await.unwrap().is_none());

        create_hub(
            db.pool(),
            &NewHub {
                name: "Mine".to_string(),
                hub_type: HubType::Personal,
                color_theme: None,
                icon: None,
            },
            &owner,
        )
        .await
        .unwrap();

        let personal = find_personal_hub(db.pool(), &owner).await.unwrap().unwrap();
        assert_eq!(personal.hub_type, HubType::Personal);
    }
}
