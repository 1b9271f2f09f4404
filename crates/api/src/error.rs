//! API error taxonomy and the response envelope for failures.
//!
//! Handlers return [`ApiError`]; its `IntoResponse` only records an
//! [`ErrorReport`] in the response extensions. The [`format_errors`]
//! middleware is the single place that logs failures and writes the
//! client-visible `{success: false, error, timestamp}` body.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{DatabaseError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::identity::IdentityError;
use crate::state::AppState;

/// Errors surfaced by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// The record is being changed by a concurrent request.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(String),

    /// `details` is shown to clients only outside production.
    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, details: impl ToString) -> Self {
        ApiError::Internal {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, .. } => ApiError::NotFound(format!("{entity} not found")),
            DatabaseError::AlreadyExists { .. } | DatabaseError::InvalidReference(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::internal("Database error", other),
        }
    }
}

impl From<ai_core::AiError> for ApiError {
    fn from(err: ai_core::AiError) -> Self {
        ApiError::Internal {
            message: format!("AI processing failed: {err}"),
            details: None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        ApiError::internal("Authentication service unavailable", err)
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError::internal("Failed to render document", err)
    }
}

/// What went wrong, carried from a handler to [`format_errors`].
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::Internal { details, .. } => details.clone(),
            _ => None,
        };
        let report = ErrorReport {
            status,
            message: self.to_string(),
            details,
        };

        let mut response = (status, Json(ErrorBody::new(&report, false))).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
    timestamp: String,
}

impl ErrorBody {
    fn new(report: &ErrorReport, include_details: bool) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                message: report.message.clone(),
                details: report.details.clone().filter(|_| include_details),
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Central error formatter: logs every failed request and writes the envelope.
pub async fn format_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    if report.status.is_server_error() {
        error!(
            %method,
            %path,
            status = report.status.as_u16(),
            message = %report.message,
            details = report.details.as_deref().unwrap_or(""),
            "Request failed"
        );
    } else {
        warn!(
            %method,
            %path,
            status = report.status.as_u16(),
            message = %report.message,
            "Request rejected"
        );
    }

    let include_details = !state.config.environment.is_production();
    (report.status, Json(ErrorBody::new(&report, include_details))).into_response()
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
