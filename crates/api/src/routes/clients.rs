//! Legacy clients.

use axum::extract::{Path, State};
use axum::response::Response;
use database::client::{self, ClientFields};
use database::validation::validate_email;
use database::Page;
use serde::Deserialize;

use super::required_name;
use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery, ApprovedUser};
use crate::response;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl ClientRequest {
    /// Validate and trim; `require_name` is set on create.
    fn into_fields(self, require_name: bool) -> Result<ClientFields> {
        let name = match self.name {
            Some(name) => Some(required_name("name", Some(&name))?),
            None if require_name => Some(required_name("name", None)?),
            None => None,
        };
        let email = self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        if let Some(email) = email.as_deref() {
            validate_email(email)?;
        }
        Ok(ClientFields {
            name,
            email,
            phone: self.phone,
            company: self.company,
            notes: self.notes,
        })
    }
}

pub async fn list(
    _user: ApprovedUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClientListQuery>,
) -> Result<Response> {
    let page = Page::new(query.page, query.limit);
    let result = client::list_clients(state.db.pool(), query.search.as_deref(), page).await?;
    let info = result.info(page);
    Ok(response::paginated(result.rows, info))
}

pub async fn create(
    user: ApprovedUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ClientRequest>,
) -> Result<Response> {
    let fields = body.into_fields(true)?;
    let client = client::create_client(state.db.pool(), &fields, user.id()).await?;
    Ok(response::created(client))
}

pub async fn get_one(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let client = client::get_client(state.db.pool(), &id).await?;
    Ok(response::ok(client))
}

pub async fn update(
    _user: ApprovedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ClientRequest>,
) -> Result<Response> {
    let fields = body.into_fields(false)?;
    let client = client::update_client(state.db.pool(), &id, &fields).await?;
    Ok(response::ok(client))
}

pub async fn delete(_user: ApprovedUser, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    client::delete_client(state.db.pool(), &id).await?;
    Ok(response::message("Client deleted"))
}
