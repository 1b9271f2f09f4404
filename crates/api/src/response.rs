//! Success envelope: `{success: true, data, pagination?, message?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::PageInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn envelope<T: Serialize>(data: T) -> Envelope<T> {
    Envelope {
        success: true,
        data,
        pagination: None,
        message: None,
    }
}

/// 200 with `data`.
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(envelope(data)).into_response()
}

/// 201 with the created record.
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(envelope(data))).into_response()
}

/// 200 with one page of rows.
pub fn paginated<T: Serialize>(rows: Vec<T>, page: PageInfo) -> Response {
    Json(Envelope {
        pagination: Some(page),
        ..envelope(rows)
    })
    .into_response()
}

/// 200 with no data and a human-readable message.
pub fn message(text: impl Into<String>) -> Response {
    Json(Envelope {
        message: Some(text.into()),
        ..envelope(())
    })
    .into_response()
}
