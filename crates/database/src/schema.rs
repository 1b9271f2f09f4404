//! Schema capability probe.
//!
//! Some columns were added to `items` and `meetings` after the first
//! deployments. Instead of reacting to "column does not exist" errors, the
//! gateway reads the live column list once and writers only touch the
//! optional columns the schema actually has.

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::Result;

/// Tables holding processable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentTable {
    Items,
    Meetings,
}

impl ContentTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            ContentTable::Items => "items",
            ContentTable::Meetings => "meetings",
        }
    }

    pub(crate) fn translation_table(&self) -> &'static str {
        match self {
            ContentTable::Items => "item_translations",
            ContentTable::Meetings => "meeting_translations",
        }
    }

    pub(crate) fn translation_fk(&self) -> &'static str {
        match self {
            ContentTable::Items => "item_id",
            ContentTable::Meetings => "meeting_id",
        }
    }

    pub(crate) fn entity(&self) -> &'static str {
        match self {
            ContentTable::Items => "Item",
            ContentTable::Meetings => "Meeting",
        }
    }
}

/// Columns that may be missing on databases migrated by older releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalColumn {
    ProcessedBy,
    ManualUpdateFlag,
    FollowUpTbd,
}

impl OptionalColumn {
    pub const ALL: [OptionalColumn; 3] = [
        OptionalColumn::ProcessedBy,
        OptionalColumn::ManualUpdateFlag,
        OptionalColumn::FollowUpTbd,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            OptionalColumn::ProcessedBy => "processed_by",
            OptionalColumn::ManualUpdateFlag => "is_processed_manually_updated",
            OptionalColumn::FollowUpTbd => "follow_up_tbd",
        }
    }
}

/// Which optional columns exist in the connected database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCapabilities {
    supported: HashSet<(ContentTable, OptionalColumn)>,
}

impl SchemaCapabilities {
    /// Capabilities of a database at the latest migration.
    pub fn full() -> Self {
        let supported = [ContentTable::Items, ContentTable::Meetings]
            .into_iter()
            .flat_map(|table| OptionalColumn::ALL.into_iter().map(move |col| (table, col)))
            .collect();
        Self { supported }
    }

    pub fn supports(&self, table: ContentTable, column: OptionalColumn) -> bool {
        self.supported.contains(&(table, column))
    }
}

/// Read the column lists of the content tables.
pub async fn probe(pool: &SqlitePool) -> Result<SchemaCapabilities> {
    let mut supported = HashSet::new();

    for table in [ContentTable::Items, ContentTable::Meetings] {
        // Table names come from a closed enum, never from input.
        let query = format!(
            "SELECT name FROM pragma_table_info('{}')",
            table.table_name()
        );
        let columns: Vec<String> = sqlx::query_scalar(&query).fetch_all(pool).await?;

        for column in OptionalColumn::ALL {
            if columns.iter().any(|c| c == column.column_name()) {
                supported.insert((table, column));
            } else {
                tracing::warn!(
                    table = table.table_name(),
                    column = column.column_name(),
                    "Optional column missing, writes will skip it"
                );
            }
        }
    }

    Ok(SchemaCapabilities { supported })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_probe_migrated_schema_is_full() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let caps = probe(db.pool()).await.unwrap();
        assert_eq!(caps, SchemaCapabilities::full());
    }

    #[tokio::test]
    async fn test_probe_legacy_schema() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE items (id TEXT PRIMARY KEY, processed_by TEXT)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("CREATE TABLE meetings (id TEXT PRIMARY KEY)")
            .execute(db.pool())
            .await
            .unwrap();

        let caps = probe(db.pool()).await.unwrap();
        assert!(caps.supports(ContentTable::Items, OptionalColumn::ProcessedBy));
        assert!(!caps.supports(ContentTable::Items, OptionalColumn::ManualUpdateFlag));
        assert!(!caps.supports(ContentTable::Meetings, OptionalColumn::ProcessedBy));
    }
}
