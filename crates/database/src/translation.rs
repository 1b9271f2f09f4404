//! Translations of items and meetings.

use sqlx::SqlitePool;

use crate::models::Translation;
use crate::new_id;
use crate::schema::ContentTable;
use crate::Result;

/// Append a translation for a record.
pub async fn save_translation(
    pool: &SqlitePool,
    table: ContentTable,
    record_id: &str,
    language: &str,
    content: &str,
    translated_by: Option<&str>,
) -> Result<Translation> {
    let id = new_id();
    let query = format!(
        "INSERT INTO {} (id, {}, language, content, translated_by) VALUES (?, ?, ?, ?, ?)",
        table.translation_table(),
        table.translation_fk()
    );
    sqlx::query(&query)
        .bind(&id)
        .bind(record_id)
        .bind(language)
        .bind(content)
        .bind(translated_by)
        .execute(pool)
        .await?;

    let select = format!(
        "SELECT id, {} AS record_id, language, content, translated_by, created_at FROM {} WHERE id = ?",
        table.translation_fk(),
        table.translation_table()
    );
    let translation = sqlx::query_as::<_, Translation>(&select)
        .bind(&id)
        .fetch_one(pool)
        .await?;

    Ok(translation)
}

/// List a record's translations, newest first.
pub async fn list_translations(
    pool: &SqlitePool,
    table: ContentTable,
    record_id: &str,
) -> Result<Vec<Translation>> {
    let query = format!(
        "SELECT id, {fk} AS record_id, language, content, translated_by, created_at \
         FROM {table} WHERE {fk} = ? ORDER BY created_at DESC, rowid DESC",
        fk = table.translation_fk(),
        table = table.translation_table()
    );
    let translations = sqlx::query_as::<_, Translation>(&query)
        .bind(record_id)
        .fetch_all(pool)
        .await?;

    Ok(translations)
}
