//! Named prompt templates, rendering and output cleanup.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder replaced with the subject text.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Placeholder replaced with the target language in translation prompts.
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Logical prompt ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PromptKind {
    Process,
    Translate,
    Enrich,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [PromptKind::Process, PromptKind::Translate, PromptKind::Enrich];

    /// Storage id of this prompt.
    pub fn id(&self) -> &'static str {
        match self {
            PromptKind::Process => "PROCESS",
            PromptKind::Translate => "TRANSLATE",
            PromptKind::Enrich => "ENRICH",
        }
    }

    /// Human readable name shown in the prompt editor.
    pub fn display_name(&self) -> &'static str {
        match self {
            PromptKind::Process => "Meeting summary",
            PromptKind::Translate => "Translation",
            PromptKind::Enrich => "Content enrichment",
        }
    }

    /// Parse a storage id, case-insensitively.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(id))
    }

    /// Compiled-in template used when no stored prompt exists.
    pub fn static_template(&self) -> PromptTemplate {
        let (content, temperature) = match self {
            PromptKind::Process => (PROCESS_TEMPLATE, 0.4),
            PromptKind::Translate => (TRANSLATE_TEMPLATE, 0.2),
            PromptKind::Enrich => (ENRICH_TEMPLATE, 0.7),
        };
        PromptTemplate {
            content: content.to_string(),
            configuration: PromptConfiguration {
                temperature: Some(temperature),
            },
        }
    }
}

/// Generation settings stored with a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A template with a `{content}` substitution point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub content: String,
    #[serde(default)]
    pub configuration: PromptConfiguration,
}

/// Substitute the content and, if present, the language placeholder.
///
/// A template without `{content}` gets the subject appended after a blank
/// line so stored prompts missing the placeholder still see the text.
pub fn render(template: &str, content: &str, language: Option<&str>) -> String {
    let mut rendered = if template.contains(CONTENT_PLACEHOLDER) {
        template.replace(CONTENT_PLACEHOLDER, content)
    } else {
        format!("{template}\n\n{content}")
    };
    if let Some(language) = language {
        rendered = rendered.replace(LANGUAGE_PLACEHOLDER, language);
    }
    rendered
}

/// Remove a surrounding markdown code fence (```` ```html ```` … ```` ``` ````).
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (e.g. "html") on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Output contract shared by the HTML-producing templates.
pub const OUTPUT_RULES: &str = "\
Return only HTML, no markdown and no code fences.
Do not use <ul>, <ol> or <li>. Write every bullet as <p align=\"right\">• text</p>.
Use <font color=\"...\"> and <font size=\"...\"> attributes instead of CSS classes.
Wrap the whole answer in <div dir=\"rtl\" style=\"direction: rtl; text-align: right;\">.";

const PROCESS_TEMPLATE: &str = "\
You are an assistant that turns raw meeting notes into a clear, structured summary in Hebrew.
Produce these sections, each with a bold heading: summary, decisions, action items, open issues.
Keep names, dates and numbers exactly as written.

Formatting rules:
Return only HTML, no markdown and no code fences.
Do not use <ul>, <ol> or <li>. Write every bullet as <p align=\"right\">• text</p>.
Use <font color=\"...\"> and <font size=\"...\"> attributes instead of CSS classes.
Wrap the whole answer in <div dir=\"rtl\" style=\"direction: rtl; text-align: right;\">.

Meeting notes:
{content}";

const TRANSLATE_TEMPLATE: &str = "\
Translate the following HTML document into {language}.
Keep every tag and attribute, translating only the visible text.
Because the result is left-to-right, replace align=\"right\" with align=\"left\",
dir=\"rtl\" with dir=\"ltr\" and margin-right with margin-left.
Return only HTML, no markdown and no code fences.

Document:
{content}";

const ENRICH_TEMPLATE: &str = "\
Improve the following notes: fix grammar, complete obvious abbreviations and
add short clarifications where the meaning is ambiguous. Do not invent facts.

Formatting rules:
Return only HTML, no markdown and no code fences.
Do not use <ul>, <ol> or <li>. Write every bullet as <p align=\"right\">• text</p>.
Use <font color=\"...\"> and <font size=\"...\"> attributes instead of CSS classes.
Wrap the whole answer in <div dir=\"rtl\" style=\"direction: rtl; text-align: right;\">.

Notes:
{content}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_templates_have_placeholder() {
        for kind in PromptKind::ALL {
            let template = kind.static_template();
            assert!(template.content.contains(CONTENT_PLACEHOLDER), "{:?}", kind);
            assert!(template.configuration.temperature.is_some());
        }
        assert!(PromptKind::Translate
            .static_template()
            .content
            .contains(LANGUAGE_PLACEHOLDER));
    }

    #[test]
    fn test_html_contract_in_templates() {
        for kind in [PromptKind::Process, PromptKind::Enrich] {
            let content = kind.static_template().content;
            assert!(content.contains(OUTPUT_RULES));
            assert!(content.contains("<p align=\"right\">•"));
        }
        let translate = PromptKind::Translate.static_template().content;
        assert!(translate.contains("dir=\"ltr\""));
        assert!(translate.contains("margin-left"));
    }

    #[test]
    fn test_from_id() {
        assert_eq!(PromptKind::from_id("PROCESS"), Some(PromptKind::Process));
        assert_eq!(PromptKind::from_id("translate"), Some(PromptKind::Translate));
        assert_eq!(PromptKind::from_id("SUMMARIZE"), None);
    }

    #[test]
    fn test_render() {
        assert_eq!(render("Summarize: {content}", "notes", None), "Summarize: notes");
        assert_eq!(
            render("To {language}: {content}", "שלום", Some("English")),
            "To English: שלום"
        );
        assert_eq!(render("Summarize", "notes", None), "Summarize\n\nnotes");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```html\n<p>hi</p>\n```"), "<p>hi</p>");
        assert_eq!(strip_code_fences("```\n<p>hi</p>```"), "<p>hi</p>");
        assert_eq!(strip_code_fences("  <p>hi</p>  "), "<p>hi</p>");
    }

    #[test]
    fn test_hash_prompt_stable() {
        let first = hash_prompt("test prompt");
        assert_eq!(first, hash_prompt("test prompt"));
        assert_ne!(first, hash_prompt("another prompt"));
        assert_eq!(first.len(), 64);
    }
}
