//! Conversation and message endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use metrics::counter;
use serde::{Deserialize, Serialize};

use eventro_store::row_types::{ConversationRow, MessageRow};
use eventro_store::store::OpenConversation;

use crate::error::ApiError;
use crate::metrics::MESSAGES_SENT_TOTAL;
use crate::server::AppState;

/// Request body for `POST /conversations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenConversationRequest {
    /// User opening the thread.
    pub creator_id: String,
    /// The other participant.
    pub peer_id: String,
    /// Event context, if started from an event page.
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Request body for `POST /conversations/{id}/messages`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Sender user ID; must be a participant.
    pub sender_id: String,
    /// Message body.
    pub body: String,
}

/// Query parameters for `GET /conversations/{id}/messages`.
#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesQuery {
    /// Maximum messages to return, oldest first.
    pub limit: Option<i64>,
}

/// Conversation response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    /// Conversation ID.
    pub id: String,
    /// Event context, if any.
    pub event_id: Option<String>,
    /// User who opened the conversation.
    pub creator_id: String,
    /// The other participant.
    pub peer_id: String,
    /// Message count.
    pub message_count: i64,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Most recent message timestamp (RFC 3339).
    pub last_message_at: String,
}

impl ConversationResponse {
    pub(crate) fn from_row(row: ConversationRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            creator_id: row.creator_id,
            peer_id: row.peer_id,
            message_count: row.message_count,
            created_at: row.created_at,
            last_message_at: row.last_message_at,
        }
    }
}

/// Message response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    /// Message ID.
    pub id: String,
    /// Conversation ID.
    pub conversation_id: String,
    /// Sender user ID.
    pub sender_id: String,
    /// Message body.
    pub body: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl MessageResponse {
    pub(crate) fn from_row(row: MessageRow) -> Self {
        Self {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// POST /conversations
pub async fn open_conversation(
    State(state): State<AppState>,
    Json(req): Json<OpenConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>), ApiError> {
    let conversation = state.store.open_conversation(&OpenConversation {
        creator_id: &req.creator_id,
        peer_id: &req.peer_id,
        event_id: req.event_id.as_deref(),
    })?;
    Ok((
        StatusCode::CREATED,
        Json(ConversationResponse::from_row(conversation)),
    ))
}

/// GET /conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let conversation = state.store.get_conversation(&conversation_id)?;
    Ok(Json(ConversationResponse::from_row(conversation)))
}

/// GET /users/{user_id}/conversations
pub async fn list_user_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ConversationResponse>>, ApiError> {
    let conversations = state.store.list_conversations_by_user(&user_id)?;
    Ok(Json(
        conversations
            .into_iter()
            .map(ConversationResponse::from_row)
            .collect(),
    ))
}

/// POST /conversations/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if req.body.trim().is_empty() {
        return Err(ApiError::InvalidRequest("message body must not be empty".into()));
    }
    let message = state
        .store
        .append_message(&conversation_id, &req.sender_id, &req.body)?;
    counter!(MESSAGES_SENT_TOTAL).increment(1);
    Ok((StatusCode::CREATED, Json(MessageResponse::from_row(message))))
}

/// GET /conversations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let messages = state.store.list_messages(&conversation_id, query.limit)?;
    Ok(Json(messages.into_iter().map(MessageResponse::from_row).collect()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
