//! Profile storage for authenticated users.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::hub::{find_personal_hub, insert_hub, NewHub};
use crate::models::{HubType, Profile, ProfileStatus};

/// Fields captured from the auth provider when a profile is first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Create a pending, non-admin profile.
///
/// Concurrent first requests from the same user may race here; the insert
/// is ignored when the row already exists and the stored row is returned.
pub async fn create_profile(pool: &SqlitePool, profile: &NewProfile) -> Result<Profile> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, full_name, avatar_url, status, is_admin)
        VALUES (?, ?, ?, ?, 'pending', 0)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.avatar_url)
    .execute(pool)
    .await?;

    get_profile(pool, &profile.id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Profile",
            id: profile.id.clone(),
        })
}

/// Get a profile by user id.
pub async fn get_profile(pool: &SqlitePool, id: &str) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT *
        FROM profiles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

/// Get a profile by email (case-insensitive).
pub async fn get_profile_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT *
        FROM profiles
        WHERE lower(email) = lower(?)
        "#,
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

/// Fetch several profiles in one round trip.
pub async fn get_profiles_by_ids(pool: &SqlitePool, ids: &[String]) -> Result<Vec<Profile>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM profiles WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");

    let profiles = qb.build_query_as::<Profile>().fetch_all(pool).await?;
    Ok(profiles)
}

/// List profiles, optionally filtered by status, newest first.
pub async fn list_profiles(pool: &SqlitePool, status: Option<ProfileStatus>) -> Result<Vec<Profile>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM profiles");
    if let Some(status) = status {
        qb.push(" WHERE status = ").push_bind(status);
    }
    qb.push(" ORDER BY created_at DESC");

    let profiles = qb.build_query_as::<Profile>().fetch_all(pool).await?;
    Ok(profiles)
}

/// Set the approval status of a profile.
pub async fn set_status(pool: &SqlitePool, id: &str, status: ProfileStatus) -> Result<Profile> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET status = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    get_profile(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Approve a profile and give it a personal hub named `hub_name` if it
/// has none, in one transaction.
///
/// Returns the approved profile and the id of a newly provisioned hub.
pub async fn approve_profile(
    pool: &SqlitePool,
    id: &str,
    hub_name: &str,
) -> Result<(Profile, Option<String>)> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET status = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(ProfileStatus::Approved)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    let existing = find_personal_hub(&mut *tx, id).await?;

    let provisioned = match existing {
        Some(_) => None,
        None => {
            let hub = NewHub {
                name: hub_name.to_string(),
                hub_type: HubType::Personal,
                color_theme: None,
                icon: None,
            };
            Some(insert_hub(&mut *tx, &hub, id).await?)
        }
    };

    tx.commit().await?;

    let profile = get_profile(pool, id).await?.ok_or_else(|| not_found(id))?;
    Ok((profile, provisioned))
}

/// Grant or revoke admin rights.
pub async fn set_admin(pool: &SqlitePool, id: &str, is_admin: bool) -> Result<Profile> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET is_admin = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(is_admin)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    get_profile(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Update the user-editable profile fields. `None` leaves a field unchanged.
pub async fn update_details(
    pool: &SqlitePool,
    id: &str,
    full_name: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<Profile> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET full_name = COALESCE(?, full_name),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(full_name)
    .bind(avatar_url)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    get_profile(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Remember the hub the user last worked in.
pub async fn set_last_active_hub(pool: &SqlitePool, id: &str, hub_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET last_active_hub_id = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(hub_id)
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
        entity: "Profile",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn new_profile(id: &str, email: &str) -> NewProfile {
        NewProfile {
            id: id.to_string(),
            email: Some(email.to_string()),
            full_name: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_created_profile_is_pending() {
        let db = test_db().await;
        let profile = create_profile(db.pool(), &new_profile("u1", "a@example.com"))
            .await
            .unwrap();

        assert_eq!(profile.status, ProfileStatus::Pending);
        assert!(!profile.is_admin);
        assert!(profile.last_active_hub_id.is_none());
    }

    #[tokio::test]
    async fn test_create_twice_keeps_first_row() {
        let db = test_db().await;
        create_profile(db.pool(), &new_profile("u1", "a@example.com"))
            .await
            .unwrap();
        set_status(db.pool(), "u1", ProfileStatus::Approved).await.unwrap();

        let again = create_profile(db.pool(), &new_profile("u1", "other@example.com"))
            .await
            .unwrap();
        assert_eq!(again.status, ProfileStatus::Approved);
        assert_eq!(again.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_lookup_by_email_ignores_case() {
        let db = test_db().await;
        create_profile(db.pool(), &new_profile("u1", "Dana@Example.com"))
            .await
            .unwrap();

        let found = get_profile_by_email(db.pool(), "dana@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "u1");
    }

    #[tokio::test]
    async fn test_batched_lookup_and_status_filter() {
        let db = test_db().await;
        for id in ["u1", "u2", "u3"] {
            create_profile(db.pool(), &new_profile(id, &format!("{id}@example.com")))
                .await
                .unwrap();
        }
        set_status(db.pool(), "u2", ProfileStatus::Approved).await.unwrap();

        let found = get_profiles_by_ids(db.pool(), &["u1".to_string(), "u3".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(get_profiles_by_ids(db.pool(), &[]).await.unwrap().is_empty());

        let pending = list_profiles(db.pool(), Some(ProfileStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|p| p.status == ProfileStatus::Pending));
    }

    #[tokio::test]
    async fn test_update_details_and_admin() {
        let db = test_db().await;
        create_profile(db.pool(), &new_profile("u1", "a@example.com"))
            .await
            .unwrap();

        let updated = update_details(db.pool(), "u1", Some("Dana"), None).await.unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Dana"));

        let admin = set_admin(db.pool(), "u1", true).await.unwrap();
        assert!(admin.is_admin);

        let missing = set_status(db.pool(), "nobody", ProfileStatus::Approved).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_approval_provisions_one_personal_hub() {
        let db = test_db().await;
        create_profile(db.pool(), &new_profile("u1", "a@example.com"))
            .await
            .unwrap();

        let (profile, hub_id) = approve_profile(db.pool(), "u1", "Personal Hub").await.unwrap();
        assert_eq!(profile.status, ProfileStatus::Approved);
        let hub_id = hub_id.unwrap();

        let hub = find_personal_hub(db.pool(), "u1").await.unwrap().unwrap();
        assert_eq!(hub.id, hub_id);
        assert_eq!(hub.name, "Personal Hub");
        let membership = crate::hub::get_membership(db.pool(), &hub_id, "u1").await.unwrap();
        assert!(membership.is_some());

        // Approving again keeps the existing hub.
        let (_, again) = approve_profile(db.pool(), "u1", "Personal Hub").await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_failed_approval_leaves_no_trace() {
        let db = test_db().await;

        let missing = approve_profile(db.pool(), "nobody", "Personal Hub").await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
        assert!(find_personal_hub(db.pool(), "nobody")
            .await
            .unwrap()
            .is_none());
    }
}
