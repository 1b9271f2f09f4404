//! Hub-scoped items: the core content records.

use axum::extract::{Path, State};
use axum::response::Response;
use database::item::{self, ItemFilter, ItemSort, NewItem};
use database::validation::normalize_reference;
use database::{
    topic, translation, workspace, ActionItem, ContentTable, ContentType, Item, ItemStatus, Json,
    Page, SortOrder,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::content::{self, ProcessRequest, TranslateRequest};
use super::{bad_reference, creator_of, load_creator, load_creators, nullable, optional, required_name, Creator};
use crate::assembler::{build_document, DocumentFields, DocumentVariant};
use crate::error::{ApiError, Result};
use crate::extract::{ApiQuery, HubContext, HubJson};
use crate::response;
use crate::state::AppState;

/// An item with its creator attached.
#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub creator: Option<Creator>,
}

/// An item with its creator and hierarchy names.
#[derive(Debug, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub creator: Option<Creator>,
    pub workspace_name: Option<String>,
    pub topic_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemListQuery {
    pub search: Option<String>,
    pub status: Option<ItemStatus>,
    pub content_type: Option<ContentType>,
    pub workspace_id: Option<String>,
    pub topic_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateItemRequest {
    pub title: Option<String>,
    pub workspace_id: Option<String>,
    pub topic_id: Option<String>,
    pub meeting_date: Option<String>,
    pub meeting_time: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
    pub follow_up_time: Option<String>,
    #[serde(default)]
    pub follow_up_tbd: bool,
}

/// Partial update; absent fields are left unchanged, `null` clears.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub workspace_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub topic_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub meeting_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub meeting_time: Option<Option<String>>,
    pub participants: Option<Vec<String>>,
    pub content: Option<String>,
    pub content_type: Option<ContentType>,
    #[serde(default, deserialize_with = "nullable")]
    pub processed_content: Option<Option<String>>,
    pub status: Option<ItemStatus>,
    pub action_items: Option<Vec<ActionItem>>,
    pub follow_up_required: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub follow_up_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub follow_up_time: Option<Option<String>>,
    pub follow_up_tbd: Option<bool>,
}

/// Check that the referenced workspace and topic live in the hub and agree.
///
/// A topic without a workspace inherits the topic's workspace; a topic from
/// a different workspace is rejected. Returns the resolved workspace id and
/// the topic name.
async fn resolve_hierarchy(
    state: &AppState,
    hub_id: &str,
    workspace_id: Option<String>,
    topic_id: Option<&str>,
) -> Result<(Option<String>, Option<String>)> {
    let pool = state.db.pool();
    let mut workspace_id = workspace_id;

    if let Some(id) = workspace_id.as_deref() {
        bad_reference(
            workspace::get_workspace(pool, hub_id, id).await,
            "Workspace not found in this hub",
        )?;
    }

    let topic_name = match topic_id {
        Some(id) => {
            let topic = bad_reference(
                topic::get_topic(pool, hub_id, id).await,
                "Topic not found in this hub",
            )?;
            match workspace_id.as_deref() {
                None => workspace_id = Some(topic.workspace_id.clone()),
                Some(ws) if ws != topic.workspace_id => {
                    return Err(ApiError::BadRequest(
                        "Topic does not belong to the given workspace".to_string(),
                    ));
                }
                Some(_) => {}
            }
            Some(topic.name)
        }
        None => None,
    };

    Ok((workspace_id, topic_name))
}

fn assemble(item: &Item, topic_name: Option<&str>) -> Result<String> {
    let html = build_document(
        &DocumentFields {
            title: &item.title,
            context_name: topic_name,
            meeting_date: item.meeting_date.as_deref(),
            meeting_time: item.meeting_time.as_deref(),
            participants: &item.participants,
            content: &item.content,
            action_items: &item.action_items,
            follow_up_required: item.follow_up_required,
            follow_up_date: item.follow_up_date.as_deref(),
            follow_up_time: item.follow_up_time.as_deref(),
            follow_up_tbd: item.follow_up_tbd,
        },
        DocumentVariant::Item,
    )?;
    Ok(html)
}

/// List one page of the hub's items.
pub async fn list(ctx: HubContext, State(state): State<AppState>, ApiQuery(query): ApiQuery<ItemListQuery>) -> Result<Response> {
    let page = Page::new(query.page, query.limit);
    let filter = ItemFilter {
        search: query.search,
        status: query.status,
        content_type: query.content_type,
        workspace_id: normalize_reference(query.workspace_id),
        topic_id: normalize_reference(query.topic_id),
        sort: ItemSort::parse(query.sort_by.as_deref()),
        order: SortOrder::parse(query.sort_order.as_deref()),
    };

    let result = item::list_items(state.db.pool(), &ctx.hub_id, &filter, page).await?;
    let info = result.info(page);
    let creators = load_creators(&state, result.rows.iter().map(|i| i.created_by.as_ref())).await?;

    let rows = result
        .rows
        .into_iter()
        .map(|item| ItemView {
            creator: creator_of(&creators, item.created_by.as_ref()),
            item,
        })
        .collect();

    Ok(response::paginated(rows, info))
}

/// Get one item with its creator, workspace and topic names.
pub async fn get_one(ctx: HubContext, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let pool = state.db.pool();
    let item = item::get_item(pool, &ctx.hub_id, &id).await?;

    let workspace_name = match item.workspace_id.as_deref() {
        Some(ws) => optional(workspace::get_workspace(pool, &ctx.hub_id, ws).await)?.map(|w| w.name),
        None => None,
    };
    let topic_name = match item.topic_id.as_deref() {
        Some(t) => optional(topic::get_topic(pool, &ctx.hub_id, t).await)?.map(|t| t.name),
        None => None,
    };
    let creator = load_creator(&state, item.created_by.as_ref()).await?;

    Ok(response::ok(ItemDetail {
        item,
        creator,
        workspace_name,
        topic_name,
    }))
}

/// Create a draft item.
pub async fn create(State(state): State<AppState>, HubJson { ctx, body }: HubJson<CreateItemRequest>) -> Result<Response> {
    let title = required_name("title", body.title.as_deref())?;
    let topic_id = normalize_reference(body.topic_id);
    let (workspace_id, topic_name) = resolve_hierarchy(
        &state,
        &ctx.hub_id,
        normalize_reference(body.workspace_id),
        topic_id.as_deref(),
    )
    .await?;

    let meeting_date = normalize_reference(body.meeting_date);
    let meeting_time = normalize_reference(body.meeting_time);
    let follow_up_date = normalize_reference(body.follow_up_date);
    let follow_up_time = normalize_reference(body.follow_up_time);

    let full_raw_content = build_document(
        &DocumentFields {
            title: &title,
            context_name: topic_name.as_deref(),
            meeting_date: meeting_date.as_deref(),
            meeting_time: meeting_time.as_deref(),
            participants: &body.participants,
            content: &body.content,
            action_items: &body.action_items,
            follow_up_required: body.follow_up_required,
            follow_up_date: follow_up_date.as_deref(),
            follow_up_time: follow_up_time.as_deref(),
            follow_up_tbd: body.follow_up_tbd,
        },
        DocumentVariant::Item,
    )?;

    let item = item::create_item(
        state.db.pool(),
        &state.caps,
        &NewItem {
            hub_id: ctx.hub_id.clone(),
            workspace_id,
            topic_id,
            title,
            meeting_date,
            meeting_time,
            participants: body.participants,
            content: body.content,
            content_type: body.content_type,
            full_raw_content,
            action_items: body.action_items,
            follow_up_required: body.follow_up_required,
            follow_up_date,
            follow_up_time,
            follow_up_tbd: body.follow_up_tbd,
            created_by: ctx.user_id().to_string(),
        },
    )
    .await?;

    info!(hub_id = %ctx.hub_id, item_id = %item.id, "Item created");
    Ok(response::created(item))
}

/// Merge a partial update and re-assemble the document.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HubJson { ctx, body }: HubJson<UpdateItemRequest>,
) -> Result<Response> {
    let pool = state.db.pool();
    let mut item = item::get_item(pool, &ctx.hub_id, &id).await?;

    if let Some(title) = body.title {
        item.title = required_name("title", Some(&title))?;
    }
    if let Some(status) = body.status {
        if status == ItemStatus::Processing {
            return Err(ApiError::BadRequest(
                "status 'processing' is set by the processing endpoint".to_string(),
            ));
        }
        item.status = status;
    }
    let workspace_given = body.workspace_id.is_some();
    if let Some(topic_id) = body.topic_id {
        item.topic_id = normalize_reference(topic_id);
        if !workspace_given && item.topic_id.is_some() {
            // The workspace follows a newly chosen topic.
            item.workspace_id = None;
        }
    }
    if let Some(workspace_id) = body.workspace_id {
        item.workspace_id = normalize_reference(workspace_id);
    }
    if let Some(date) = body.meeting_date {
        item.meeting_date = normalize_reference(date);
    }
    if let Some(time) = body.meeting_time {
        item.meeting_time = normalize_reference(time);
    }
    if let Some(participants) = body.participants {
        item.participants = Json(participants);
    }
    if let Some(content) = body.content {
        item.content = content;
    }
    if let Some(content_type) = body.content_type {
        item.content_type = content_type;
    }
    if let Some(processed) = body.processed_content {
        if processed != item.processed_content {
            item.is_processed_manually_updated = true;
        }
        item.processed_content = processed;
    }
    if let Some(action_items) = body.action_items {
        item.action_items = Json(action_items);
    }
    if let Some(required) = body.follow_up_required {
        item.follow_up_required = required;
    }
    if let Some(date) = body.follow_up_date {
        item.follow_up_date = normalize_reference(date);
    }
    if let Some(time) = body.follow_up_time {
        item.follow_up_time = normalize_reference(time);
    }
    if let Some(tbd) = body.follow_up_tbd {
        item.follow_up_tbd = tbd;
    }

    let (workspace_id, topic_name) = resolve_hierarchy(
        &state,
        &ctx.hub_id,
        item.workspace_id.take(),
        item.topic_id.as_deref(),
    )
    .await?;
    item.workspace_id = workspace_id;
    item.full_raw_content = Some(assemble(&item, topic_name.as_deref())?);

    let item = item::update_item(pool, &state.caps, &item).await?;
    Ok(response::ok(item))
}

/// Delete an item.
pub async fn delete(ctx: HubContext, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    item::delete_item(state.db.pool(), &ctx.hub_id, &id).await?;
    info!(hub_id = %ctx.hub_id, item_id = %id, "Item deleted");
    Ok(response::message("Item deleted"))
}

/// Summarize an item with the model chain.
pub async fn process(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HubJson { ctx, body }: HubJson<ProcessRequest>,
) -> Result<Response> {
    let pool = state.db.pool();
    let item = item::get_item(pool, &ctx.hub_id, &id).await?;
    let source = content::source_text(item.full_raw_content.as_deref(), &item.content)
        .ok_or_else(|| ApiError::BadRequest("Item has no content to process".to_string()))?;

    content::process_record(&state, ContentTable::Items, &item.id, item.status, source, body.temperature).await?;

    let item = item::get_item(pool, &ctx.hub_id, &id).await?;
    Ok(response::ok(item))
}

/// Translate an item's processed content, or its document if unprocessed.
pub async fn translate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HubJson { ctx, body }: HubJson<TranslateRequest>,
) -> Result<Response> {
    let item = item::get_item(state.db.pool(), &ctx.hub_id, &id).await?;
    let source = item
        .processed_content
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .or_else(|| content::source_text(item.full_raw_content.as_deref(), &item.content))
        .ok_or_else(|| ApiError::BadRequest("Item has no content to translate".to_string()))?;

    let result = content::translate_record(&state, ContentTable::Items, &item.id, source, body.target_language).await?;
    Ok(response::ok(result))
}

/// List an item's stored translations, newest first.
pub async fn translations(ctx: HubContext, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let pool = state.db.pool();
    let item = item::get_item(pool, &ctx.hub_id, &id).await?;
    let rows = translation::list_translations(pool, ContentTable::Items, &item.id).await?;
    Ok(response::ok(rows))
}
