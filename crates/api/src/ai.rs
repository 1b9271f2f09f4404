//! AI processing service: prompt loading, rendering and model fallback.

use ai_core::{
    hash_prompt, render, strip_code_fences, AiError, Generation, GenerationConfig, ModelChain,
    PromptConfiguration, PromptKind, PromptTemplate,
};
use database::{prompt, Database};
use serde::Serialize;
use tracing::{debug, warn};

/// Where a prompt template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSource {
    Database,
    Static,
}

/// A template ready for rendering.
#[derive(Debug, Clone)]
pub struct LoadedPrompt {
    pub template: PromptTemplate,
    pub source: PromptSource,
}

/// Generates summaries, translations and enrichments.
#[derive(Clone, Debug)]
pub struct AiService {
    db: Database,
    models: ModelChain,
}

impl AiService {
    pub fn new(db: Database, models: ModelChain) -> Self {
        Self { db, models }
    }

    /// Configured model ids in priority order.
    pub fn model_ids(&self) -> Vec<String> {
        self.models.model_ids()
    }

    /// Load a template from the prompt store, or the compiled-in default.
    ///
    /// A store failure is logged and treated like a missing row.
    pub async fn load_prompt(&self, kind: PromptKind) -> LoadedPrompt {
        let loaded = match prompt::get_prompt(self.db.pool(), kind.id()).await {
            Ok(Some(row)) => LoadedPrompt {
                template: PromptTemplate {
                    content: row.content,
                    configuration: PromptConfiguration {
                        temperature: row.configuration.temperature,
                    },
                },
                source: PromptSource::Database,
            },
            Ok(None) => LoadedPrompt {
                template: kind.static_template(),
                source: PromptSource::Static,
            },
            Err(e) => {
                warn!(prompt = kind.id(), error = %e, "Prompt store unavailable, using static prompt");
                LoadedPrompt {
                    template: kind.static_template(),
                    source: PromptSource::Static,
                }
            }
        };

        debug!(
            prompt = kind.id(),
            source = ?loaded.source,
            fingerprint = %hash_prompt(&loaded.template.content),
            "Loaded prompt"
        );
        loaded
    }

    /// Summarize raw content into structured HTML.
    pub async fn process(&self, content: &str, temperature: Option<f32>) -> Result<Generation, AiError> {
        self.run(PromptKind::Process, content, None, temperature).await
    }

    /// Translate HTML content into `language`.
    pub async fn translate(&self, content: &str, language: &str) -> Result<Generation, AiError> {
        self.run(PromptKind::Translate, content, Some(language), None).await
    }

    /// Clarify and tidy raw notes.
    pub async fn enrich(&self, content: &str) -> Result<Generation, AiError> {
        self.run(PromptKind::Enrich, content, None, None).await
    }

    async fn run(
        &self,
        kind: PromptKind,
        content: &str,
        language: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<Generation, AiError> {
        let loaded = self.load_prompt(kind).await;
        let prompt = render(&loaded.template.content, content, language);

        // A per-call temperature wins over the template's; with neither the
        // chain probes each model before generating.
        let config = temperature
            .or(loaded.template.configuration.temperature)
            .map(GenerationConfig::with_temperature);

        let generation = self.models.generate(&prompt, config).await?;
        let text = strip_code_fences(&generation.text);
        if text.is_empty() {
            return Err(AiError::ProcessingFailed(format!(
                "{} returned an empty response",
                generation.model
            )));
        }

        Ok(Generation {
            text,
            model: generation.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_core::{async_trait, ModelProvider};
    use database::PromptSettings;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Answers with a fenced copy of the prompt and remembers the config.
    #[derive(Default)]
    struct Fenced {
        seen: Mutex<Vec<GenerationConfig>>,
    }

    #[async_trait]
    impl ModelProvider for Fenced {
        fn model_id(&self) -> &str {
            "fenced"
        }

        async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, AiError> {
            self.seen.lock().unwrap().push(*config);
            Ok(format!("```html\n{}\n```", prompt))
        }
    }

    async fn service(model: Arc<Fenced>) -> AiService {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let models: Vec<Arc<dyn ModelProvider>> = vec![model];
        AiService::new(db, ModelChain::new(models, Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn test_static_fallback_and_fence_stripping() {
        let model = Arc::new(Fenced::default());
        let ai = service(model.clone()).await;

        let loaded = ai.load_prompt(PromptKind::Process).await;
        assert_eq!(loaded.source, PromptSource::Static);

        let generation = ai.process("Hello team", None).await.unwrap();
        assert!(generation.text.contains("Hello team"));
        assert!(!generation.text.starts_with("```"));
        assert_eq!(generation.model, "fenced");
    }

    #[tokio::test]
    async fn test_database_prompt_wins() {
        let model = Arc::new(Fenced::default());
        let ai = service(model.clone()).await;
        prompt::upsert_prompt(
            ai.db.pool(),
            "TRANSLATE",
            "Translation",
            "Into {language}: {content}",
            &PromptSettings {
                temperature: Some(0.9),
            },
            "admin",
        )
        .await
        .unwrap();

        let generation = ai.translate("שלום", "English").await.unwrap();
        assert_eq!(generation.text, "Into English: שלום");
        assert_eq!(model.seen.lock().unwrap()[0].temperature, Some(0.9));
    }

    #[tokio::test]
    async fn test_call_temperature_overrides_template() {
        let model = Arc::new(Fenced::default());
        let ai = service(model.clone()).await;

        ai.process("notes", Some(0.1)).await.unwrap();
        assert_eq!(model.seen.lock().unwrap()[0].temperature, Some(0.1));
    }

    #[tokio::test]
    async fn test_store_failure_falls_back() {
        let model = Arc::new(Fenced::default());
        let ai = service(model).await;
        ai.db.close().await;

        let loaded = ai.load_prompt(PromptKind::Enrich).await;
        assert_eq!(loaded.source, PromptSource::Static);
    }
}
