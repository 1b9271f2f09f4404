//! Processing and translation shared by items and meetings.

use database::{processing, translation, ContentTable, ItemStatus, Translation};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;

pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    pub temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslateRequest {
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslationResult {
    pub language: String,
    pub translated_content: String,
    pub model: String,
    /// `None` when the translation could not be stored.
    pub translation: Option<Translation>,
}

/// Sampling temperatures outside `0..=2` are rejected.
pub fn check_temperature(temperature: Option<f32>) -> Result<()> {
    match temperature {
        Some(t) if !(0.0..=2.0).contains(&t) => Err(ApiError::BadRequest(
            "temperature must be between 0 and 2".to_string(),
        )),
        _ => Ok(()),
    }
}

/// The text sent to the model: the assembled document, else the raw content.
pub fn source_text<'a>(full_raw_content: Option<&'a str>, content: &'a str) -> Option<&'a str> {
    full_raw_content
        .filter(|html| !html.trim().is_empty())
        .or(Some(content))
        .filter(|text| !text.trim().is_empty())
}

/// Claim a record, generate its summary and store the result.
///
/// The record is claimed with a compare-and-swap on `status`; a lost race
/// is a 409. When generation or the final write fails, `previous` is put back.
pub async fn process_record(
    state: &AppState,
    table: ContentTable,
    id: &str,
    previous: ItemStatus,
    source: &str,
    temperature: Option<f32>,
) -> Result<()> {
    check_temperature(temperature)?;

    let pool = state.db.pool();
    if previous == ItemStatus::Processing
        || !processing::mark_processing(pool, table, id, previous).await?
    {
        return Err(ApiError::Conflict(
            "This record is already being processed".to_string(),
        ));
    }

    info!(table = table.table_name(), id, "Processing started");

    let outcome: Result<String> = async {
        let generation = state.ai.process(source, temperature).await?;
        processing::complete_processing(
            pool,
            &state.caps,
            table,
            id,
            &generation.text,
            &generation.model,
        )
        .await?;
        Ok(generation.model)
    }
    .await;

    match outcome {
        Ok(model) => {
            info!(table = table.table_name(), id, model = %model, "Processing complete");
            Ok(())
        }
        Err(e) => {
            if let Err(restore) = processing::restore_status(pool, table, id, previous).await {
                error!(table = table.table_name(), id, error = %restore, "Failed to restore status");
            }
            Err(e)
        }
    }
}

/// Translate a record's text and store the translation best-effort.
pub async fn translate_record(
    state: &AppState,
    table: ContentTable,
    id: &str,
    source: &str,
    target_language: Option<String>,
) -> Result<TranslationResult> {
    let language = target_language
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let generation = state.ai.translate(source, &language).await?;

    let translation = match translation::save_translation(
        state.db.pool(),
        table,
        id,
        &language,
        &generation.text,
        Some(generation.model.as_str()),
    )
    .await
    {
        Ok(saved) => Some(saved),
        Err(e) => {
            warn!(table = table.table_name(), id, error = %e, "Failed to save translation");
            None
        }
    };

    Ok(TranslationResult {
        language,
        translated_content: generation.text,
        model: generation.model,
        translation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_temperature() {
        assert!(check_temperature(None).is_ok());
        assert!(check_temperature(Some(0.0)).is_ok());
        assert!(check_temperature(Some(2.0)).is_ok());
        assert!(check_temperature(Some(2.5)).is_err());
        assert!(check_temperature(Some(f32::NAN)).is_err());
    }

    #[test]
    fn test_source_text_prefers_document() {
        assert_eq!(source_text(Some("<div>doc</div>"), "raw"), Some("<div>doc</div>"));
        assert_eq!(source_text(Some("  "), "raw"), Some("raw"));
        assert_eq!(source_text(None, "raw"), Some("raw"));
        assert_eq!(source_text(None, " "), None);
    }
}
