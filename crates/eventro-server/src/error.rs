//! HTTP error mapping.
//!
//! Handlers return [`ApiError`]; its [`IntoResponse`] impl produces a JSON
//! body of the form `{"error": "..."}`. Store failures that are not lookup
//! misses collapse to a generic 500 — the detail goes to the log, never to
//! the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use eventro_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource does not exist (404).
    #[error("{0} not found")]
    NotFound(String),

    /// The request body or parameters were invalid (400).
    #[error("{0}")]
    InvalidRequest(String),

    /// The request conflicts with current state, e.g. a sold-out event (409).
    #[error("{0}")]
    Conflict(String),

    /// Anything else (500). The wrapped error is logged, not returned.
    #[error("internal server error")]
    Internal(#[source] StoreError),
}

impl ApiError {
    /// Invalid-field helper for the stringified JSON array fields.
    pub fn invalid_field(field: &str) -> Self {
        Self::InvalidRequest(format!("field '{field}' must be a JSON array"))
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound(id) => Self::NotFound(format!("event {id}")),
            StoreError::TicketNotFound(id) => Self::NotFound(format!("ticket {id}")),
            StoreError::ConversationNotFound(id) => Self::NotFound(format!("conversation {id}")),
            StoreError::UserNotFound(id) => Self::NotFound(format!("user {id}")),
            StoreError::SoldOut(id) => Self::Conflict(format!("event {id} is sold out")),
            StoreError::InvalidOperation(message) => Self::InvalidRequest(message),
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref source) = self {
            error!(error = %source, "request failed");
        }
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
