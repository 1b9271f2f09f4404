//! Builds the right-to-left HTML document stored as `full_raw_content`.
//!
//! The builder is pure: the caller resolves names (project, topic) before
//! calling it. Dates are calendar dates, never shifted between time zones.

use askama::Template;
use chrono::{Datelike, NaiveDate};
use database::ActionItem;

const HEBREW_MONTHS: [&str; 12] = [
    "ינואר", "פברואר", "מרץ", "אפריל", "מאי", "יוני", "יולי", "אוגוסט", "ספטמבר", "אוקטובר",
    "נובמבר", "דצמבר",
];

/// Which layout to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentVariant {
    /// Legacy meetings: a metadata block precedes the content.
    Meeting,
    /// Items: metadata is rendered by the client, not embedded.
    Item,
}

/// Structured fields of a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFields<'a> {
    pub title: &'a str,
    /// Project (meetings) or topic (items) name.
    pub context_name: Option<&'a str>,
    pub meeting_date: Option<&'a str>,
    pub meeting_time: Option<&'a str>,
    pub participants: &'a [String],
    pub content: &'a str,
    pub action_items: &'a [ActionItem],
    pub follow_up_required: bool,
    pub follow_up_date: Option<&'a str>,
    pub follow_up_time: Option<&'a str>,
    pub follow_up_tbd: bool,
}

/// Text values are escaped by the template; only `html_content` is trusted.
#[derive(Template)]
#[template(path = "document.html")]
struct DocumentTemplate<'a> {
    metadata: Option<Metadata<'a>>,
    html_content: Option<&'a str>,
    text_content: Option<&'a str>,
    action_items: Vec<ActionRow<'a>>,
    follow_up: Option<String>,
}

struct Metadata<'a> {
    title: &'a str,
    project: Option<&'a str>,
    when: Option<String>,
    participants: Option<String>,
}

struct ActionRow<'a> {
    task: &'a str,
    assignee: &'a str,
    due: String,
}

/// Assemble the display document.
pub fn build_document(
    fields: &DocumentFields<'_>,
    variant: DocumentVariant,
) -> Result<String, askama::Error> {
    let content = fields.content.trim();
    let (html_content, text_content) = if content.starts_with('<') {
        (Some(content), None)
    } else if content.is_empty() {
        (None, None)
    } else {
        (None, Some(content))
    };

    let template = DocumentTemplate {
        metadata: (variant == DocumentVariant::Meeting).then(|| metadata(fields)),
        html_content,
        text_content,
        action_items: fields.action_items.iter().map(action_row).collect(),
        follow_up: fields.follow_up_required.then(|| follow_up(fields)),
    };
    template.render()
}

fn metadata<'a>(fields: &DocumentFields<'a>) -> Metadata<'a> {
    Metadata {
        title: fields.title,
        project: non_blank(fields.context_name),
        when: non_blank(fields.meeting_date)
            .map(|date| with_time(display_date(date), fields.meeting_time)),
        participants: (!fields.participants.is_empty()).then(|| fields.participants.join(", ")),
    }
}

fn action_row(item: &ActionItem) -> ActionRow<'_> {
    ActionRow {
        task: &item.task,
        assignee: &item.assignee,
        due: non_blank(item.due_date.as_deref())
            .map(display_date)
            .unwrap_or_default(),
    }
}

fn follow_up(fields: &DocumentFields<'_>) -> String {
    match non_blank(fields.follow_up_date) {
        Some(date) if !fields.follow_up_tbd => with_time(display_date(date), fields.follow_up_time),
        _ => "מועד ייקבע בהמשך".to_string(),
    }
}

fn with_time(mut when: String, time: Option<&str>) -> String {
    if let Some(time) = non_blank(time) {
        when.push_str(" בשעה ");
        when.push_str(time);
    }
    when
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Long-form Hebrew date, e.g. `2025-01-15` → `15 בינואר 2025`.
///
/// Accepts a bare date or the date prefix of an ISO timestamp.
pub fn format_hebrew_date(value: &str) -> Option<String> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let month = HEBREW_MONTHS[date.month0() as usize];
    Some(format!("{} ב{} {}", date.day(), month, date.year()))
}

/// Formatted date, or the input when it does not parse.
fn display_date(value: &str) -> String {
    format_hebrew_date(value).unwrap_or_else(|| value.to_string())
}

/// Visible text of an HTML fragment: tags dropped, basic entities decoded.
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
