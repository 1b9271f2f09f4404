//! Legacy meetings: project-linked records predating hubs.

use axum::extract::{Path, State};
use axum::response::Response;
use database::meeting::{self, MeetingFilter, NewMeeting};
use database::validation::normalize_reference;
use database::{
    project, translation, ActionItem, ContentTable, ItemStatus, Json, Meeting, Page, SortOrder,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::content::{self, ProcessRequest, TranslateRequest};
use super::{bad_reference, creator_of, load_creator, load_creators, nullable, optional, required_name, Creator};
use crate::assembler::{build_document, DocumentFields, DocumentVariant};
use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, ApprovedUser};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MeetingView {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub creator: Option<Creator>,
}

#[derive(Debug, Serialize)]
pub struct MeetingDetail {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub creator: Option<Creator>,
    pub project_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MeetingListQuery {
    pub project_id: Option<String>,
    pub status: Option<ItemStatus>,
    pub search: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateMeetingRequest {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub meeting_date: Option<String>,
    pub meeting_time: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
    pub follow_up_time: Option<String>,
    #[serde(default)]
    pub follow_up_tbd: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeetingRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub project_id: Option<Option<String>>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub meeting_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub meeting_time: Option<Option<String>>,
    pub participants: Option<Vec<String>>,
    pub content: Option<String>,
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

/// Name of the referenced project; an unknown project is a bad request.
async fn project_name(state: &AppState, project_id: Option<&str>) -> Result<Option<String>> {
    match project_id {
        Some(id) => {
            let project = bad_reference(project::get_project(state.db.pool(), id).await, "Project not found")?;
            Ok(Some(project.name))
        }
        None => Ok(None),
    }
}

fn assemble(meeting: &Meeting, project_name: Option<&str>) -> Result<String> {
    let html = build_document(
        &DocumentFields {
            title: &meeting.title,
            context_name: project_name,
            meeting_date: meeting.meeting_date.as_deref(),
            meeting_time: meeting.meeting_time.as_deref(),
            participants: &meeting.participants,
            content: &meeting.content,
            action_items: &meeting.action_items,
            follow_up_required: meeting.follow_up_required,
            follow_up_date: meeting.follow_up_date.as_deref(),
            follow_up_time: meeting.follow_up_time.as_deref(),
            follow_up_tbd: meeting.follow_up_tbd,
        },
        DocumentVariant::Meeting,
    )?;
    Ok(html)
}

pub async fn list(
    _user: ApprovedUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MeetingListQuery>,
) -> Result<Response> {
    let page = Page::new(query.page, query.limit);
    let filter = MeetingFilter {
        project_id: normalize_reference(query.project_id),
        status: query.status,
        search: query.search,
        order: SortOrder::parse(query.sort_order.as_deref()),
    };

    let result = meeting::list_meetings(state.db.pool(), &filter, page).await?;
    let info = result.info(page);
    let creators = load_creators(&state, result.rows.iter().map(|m| m.created_by.as_ref())).await?;

    let rows = result
        .rows
        .into_iter()
        .map(|meeting| MeetingView {
            creator: creator_of(&creators, meeting.created_by.as_ref()),
            meeting,
        })
        .collect();

    Ok(response::paginated(rows, info))
}

pub async fn get_one(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let pool = state.db.pool();
    let meeting = meeting::get_meeting(pool, &id).await?;
    let project_name = match meeting.project_id.as_deref() {
        Some(p) => optional(project::get_project(pool, p).await)?.map(|p| p.name),
        None => None,
    };
    let creator = load_creator(&state, meeting.created_by.as_ref()).await?;

    Ok(response::ok(MeetingDetail {
        meeting,
        creator,
        project_name,
    }))
}

pub async fn create(
    user: ApprovedUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateMeetingRequest>,
) -> Result<Response> {
    let title = required_name("title", body.title.as_deref())?;
    let project_id = normalize_reference(body.project_id);
    let project_name = project_name(&state, project_id.as_deref()).await?;

    let meeting_date = normalize_reference(body.meeting_date);
    let meeting_time = normalize_reference(body.meeting_time);
    let follow_up_date = normalize_reference(body.follow_up_date);
    let follow_up_time = normalize_reference(body.follow_up_time);

    let full_raw_content = build_document(
        &DocumentFields {
            title: &title,
            context_name: project_name.as_deref(),
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
        DocumentVariant::Meeting,
    )?;

    let meeting = meeting::create_meeting(
        state.db.pool(),
        &state.caps,
        &NewMeeting {
            project_id,
            title,
            meeting_date,
            meeting_time,
            participants: body.participants,
            content: body.content,
            full_raw_content,
            action_items: body.action_items,
            follow_up_required: body.follow_up_required,
            follow_up_date,
            follow_up_time,
            follow_up_tbd: body.follow_up_tbd,
            created_by: user.id().to_string(),
        },
    )
    .await?;

    info!(meeting_id = %meeting.id, "Meeting created");
    Ok(response::created(meeting))
}

pub async fn update(
    _user: ApprovedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateMeetingRequest>,
) -> Result<Response> {
    let pool = state.db.pool();
    let mut meeting = meeting::get_meeting(pool, &id).await?;

    if let Some(project_id) = body.project_id {
        meeting.project_id = normalize_reference(project_id);
    }
    if let Some(title) = body.title {
        meeting.title = required_name("title", Some(&title))?;
    }
    if let Some(status) = body.status {
        if status == ItemStatus::Processing {
            return Err(ApiError::BadRequest(
                "status 'processing' is set by the processing endpoint".to_string(),
            ));
        }
        meeting.status = status;
    }
    if let Some(date) = body.meeting_date {
        meeting.meeting_date = normalize_reference(date);
    }
    if let Some(time) = body.meeting_time {
        meeting.meeting_time = normalize_reference(time);
    }
    if let Some(participants) = body.participants {
        meeting.participants = Json(participants);
    }
    if let Some(content) = body.content {
        meeting.content = content;
    }
    if let Some(processed) = body.processed_content {
        if processed != meeting.processed_content {
            meeting.is_processed_manually_updated = true;
        }
        meeting.processed_content = processed;
    }
    if let Some(action_items) = body.action_items {
        meeting.action_items = Json(action_items);
    }
    if let Some(required) = body.follow_up_required {
        meeting.follow_up_required = required;
    }
    if let Some(date) = body.follow_up_date {
        meeting.follow_up_date = normalize_reference(date);
    }
    if let Some(time) = body.follow_up_time {
        meeting.follow_up_time = normalize_reference(time);
    }
    if let Some(tbd) = body.follow_up_tbd {
        meeting.follow_up_tbd = tbd;
    }

    let project_name = project_name(&state, meeting.project_id.as_deref()).await?;
    meeting.full_raw_content = Some(assemble(&meeting, project_name.as_deref())?);

    let meeting = meeting::update_meeting(pool, &state.caps, &meeting).await?;
    Ok(response::ok(meeting))
}

pub async fn delete(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    meeting::delete_meeting(state.db.pool(), &id).await?;
    info!(meeting_id = %id, "Meeting deleted");
    Ok(response::message("Meeting deleted"))
}

pub async fn process(
    _user: ApprovedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<ApiJson<ProcessRequest>>,
) -> Result<Response> {
    let body = body.map(|ApiJson(b)| b).unwrap_or_default();
    let pool = state.db.pool();
    let meeting = meeting::get_meeting(pool, &id).await?;
    let source = content::source_text(meeting.full_raw_content.as_deref(), &meeting.content)
        .ok_or_else(|| ApiError::BadRequest("Meeting has no content to process".to_string()))?;

    content::process_record(
        &state,
        ContentTable::Meetings,
        &meeting.id,
        meeting.status,
        source,
        body.temperature,
    )
    .await?;

    let meeting = meeting::get_meeting(pool, &id).await?;
    Ok(response::ok(meeting))
}

pub async fn translate(
    _user: ApprovedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<ApiJson<TranslateRequest>>,
) -> Result<Response> {
    let body = body.map(|ApiJson(b)| b).unwrap_or_default();
    let meeting = meeting::get_meeting(state.db.pool(), &id).await?;
    let source = meeting
        .processed_content
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .or_else(|| content::source_text(meeting.full_raw_content.as_deref(), &meeting.content))
        .ok_or_else(|| ApiError::BadRequest("Meeting has no content to translate".to_string()))?;

    let result = content::translate_record(
        &state,
        ContentTable::Meetings,
        &meeting.id,
        source,
        body.target_language,
    )
    .await?;
    Ok(response::ok(result))
}

pub async fn translations(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let pool = state.db.pool();
    let meeting = meeting::get_meeting(pool, &id).await?;
    let rows = translation::list_translations(pool, ContentTable::Meetings, &meeting.id).await?;
    Ok(response::ok(rows))
}
