//! Database row types mapping `SQLite` rows to Rust structs.
//!
//! These mirror the raw column shape of each table. Timestamps are RFC 3339
//! text; the `schedules`, `agendas`, and `ticket_tiers` columns carry JSON
//! arrays serialized as text. Conversion to API response types happens in the
//! HTTP layer.

use serde::{Deserialize, Serialize};

/// Raw user row from the `users` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRow {
    /// User ID.
    pub id: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Raw event row from the `events` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRow {
    /// Event ID.
    pub id: String,
    /// Organizer user ID.
    pub organizer_id: String,
    /// Event title.
    pub title: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Venue name.
    pub venue: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Maximum tickets that can be issued (0 = unlimited).
    pub capacity: i64,
    /// Schedule entries as a JSON array string.
    pub schedules: String,
    /// Agenda entries as a JSON array string.
    pub agendas: String,
    /// Ticket tier definitions as a JSON array string.
    pub ticket_tiers: String,
    /// Denormalized count of issued (non-cancelled) tickets.
    pub tickets_sold: i64,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Raw ticket row from the `tickets` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TicketRow {
    /// Ticket ID.
    pub id: String,
    /// Event this ticket belongs to.
    pub event_id: String,
    /// Attendee user ID.
    pub attendee_id: String,
    /// Name of the tier the ticket was issued against.
    pub tier_name: String,
    /// Price paid, in cents.
    pub price_cents: i64,
    /// Status: `issued` or `cancelled`.
    pub status: String,
    /// Issue timestamp.
    pub issued_at: String,
}

/// Raw conversation row from the `conversations` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationRow {
    /// Conversation ID.
    pub id: String,
    /// Event context, if the conversation was started from an event page.
    pub event_id: Option<String>,
    /// User who opened the conversation.
    pub creator_id: String,
    /// The other participant.
    pub peer_id: String,
    /// Denormalized message count.
    pub message_count: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Timestamp of the most recent message (creation time if none).
    pub last_message_at: String,
}

/// Raw message row from the `messages` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageRow {
    /// Message ID.
    pub id: String,
    /// Conversation this message belongs to.
    pub conversation_id: String,
    /// Sender user ID.
    pub sender_id: String,
    /// Message body.
    pub body: String,
    /// Creation timestamp.
    pub created_at: String,
}
