//! Storage for configurable AI prompt templates.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::{AiPrompt, PromptSettings};
use crate::Result;

/// Get a prompt by its logical id.
pub async fn get_prompt(pool: &SqlitePool, id: &str) -> Result<Option<AiPrompt>> {
    let prompt = sqlx::query_as::<_, AiPrompt>(
        r#"
        SELECT *
        FROM ai_prompts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(prompt)
}

/// List all stored prompts.
pub async fn list_prompts(pool: &SqlitePool) -> Result<Vec<AiPrompt>> {
    let prompts = sqlx::query_as::<_, AiPrompt>(
        r#"
        SELECT *
        FROM ai_prompts
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(prompts)
}

/// Create or replace a prompt.
pub async fn upsert_prompt(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    content: &str,
    configuration: &PromptSettings,
    updated_by: &str,
) -> Result<AiPrompt> {
    sqlx::query(
        r#"
        INSERT INTO ai_prompts (id, name, content, configuration, updated_by)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            content = excluded.content,
            configuration = excluded.configuration,
            updated_by = excluded.updated_by,
            updated_at = datetime('now')
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(content)
    .bind(Json(configuration))
    .bind(updated_by)
    .execute(pool)
    .await?;

    let prompt = sqlx::query_as::<_, AiPrompt>("SELECT * FROM ai_prompts WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(prompt)
}

/// Delete a stored prompt.
///
/// Returns true if a prompt was deleted, false if none existed.
pub async fn delete_prompt(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM ai_prompts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
