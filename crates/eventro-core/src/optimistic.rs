//! Optimistic message-list reconciliation.
//!
//! A client appends a pending placeholder the moment the user hits send,
//! then reconciles once the network call settles: the placeholder is either
//! replaced by the confirmed message or removed so the user can retry.
//!
//! Contract:
//! 1. [`push_pending`] appends a placeholder and returns its ID.
//! 2. [`confirm`] replaces the placeholder in place (position preserved).
//! 3. [`reject`] removes the placeholder.

use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, UserId};

/// A message as displayed in a conversation list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    /// Message ID. Placeholder IDs are replaced on confirmation.
    pub id: MessageId,
    /// Sender.
    pub sender_id: UserId,
    /// Message body.
    pub body: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Whether this message is awaiting server confirmation.
    pub pending: bool,
}

/// Append a pending placeholder for a message being sent.
///
/// Returns the placeholder's ID for later reconciliation.
pub fn push_pending(
    messages: &mut Vec<MessageView>,
    sender_id: UserId,
    body: impl Into<String>,
    created_at: impl Into<String>,
) -> MessageId {
    let id = MessageId::new();
    messages.push(MessageView {
        id: id.clone(),
        sender_id,
        body: body.into(),
        created_at: created_at.into(),
        pending: true,
    });
    id
}

/// Replace a pending placeholder with the confirmed message.
///
/// The confirmed message keeps the placeholder's position in the list.
/// Returns `false` if no pending message with `placeholder_id` exists.
pub fn confirm(
    messages: &mut [MessageView],
    placeholder_id: &MessageId,
    confirmed: MessageView,
) -> bool {
    match messages
        .iter_mut()
        .find(|m| m.pending && m.id == *placeholder_id)
    {
        Some(slot) => {
            *slot = MessageView {
                pending: false,
                ..confirmed
            };
            true
        }
        None => false,
    }
}

/// Remove a pending placeholder after a failed send.
///
/// Returns `false` if no pending message with `placeholder_id` exists.
pub fn reject(messages: &mut Vec<MessageView>, placeholder_id: &MessageId) -> bool {
    let before = messages.len();
    messages.retain(|m| !(m.pending && m.id == *placeholder_id));
    messages.len() < before
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
