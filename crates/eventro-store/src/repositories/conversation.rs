//! Conversation repository.
//!
//! A conversation is a two-party thread, optionally anchored to an event
//! (attendee asking the organizer a question). `message_count` and
//! `last_message_at` are denormalized so the inbox list never scans the
//! messages table.

use eventro_core::ids::ConversationId;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::Result;
use crate::row_types::ConversationRow;

/// Options for opening a conversation.
pub struct CreateConversationOptions<'a> {
    /// User opening the conversation.
    pub creator_id: &'a str,
    /// The other participant.
    pub peer_id: &'a str,
    /// Event context, if any.
    pub event_id: Option<&'a str>,
}

/// Conversation repository — stateless, every method takes `&Connection`.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Open a new conversation.
    pub fn create(
        conn: &Connection,
        opts: &CreateConversationOptions<'_>,
    ) -> Result<ConversationRow> {
        let id = ConversationId::new().into_inner();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO conversations (id, event_id, creator_id, peer_id, created_at, last_message_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, opts.event_id, opts.creator_id, opts.peer_id, now, now],
        )?;

        Ok(ConversationRow {
            id,
            event_id: opts.event_id.map(String::from),
            creator_id: opts.creator_id.to_string(),
            peer_id: opts.peer_id.to_string(),
            message_count: 0,
            created_at: now.clone(),
            last_message_at: now,
        })
    }

    /// Get a conversation by ID.
    pub fn get_by_id(conn: &Connection, conversation_id: &str) -> Result<Option<ConversationRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM conversations WHERE id = ?1",
                params![conversation_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Find an existing thread between two users for the same event context.
    ///
    /// Participant order does not matter.
    pub fn find_between(
        conn: &Connection,
        user_a: &str,
        user_b: &str,
        event_id: Option<&str>,
    ) -> Result<Option<ConversationRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM conversations
                 WHERE ((creator_id = ?1 AND peer_id = ?2) OR (creator_id = ?2 AND peer_id = ?1))
                   AND (event_id IS ?3)",
                params![user_a, user_b, event_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List conversations a user participates in, most recently active first.
    pub fn list_by_user(conn: &Connection, user_id: &str) -> Result<Vec<ConversationRow>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM conversations
             WHERE creator_id = ?1 OR peer_id = ?1
             ORDER BY last_message_at DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Record message activity: bump `message_count` and set `last_message_at`.
    pub fn touch(conn: &Connection, conversation_id: &str, at: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE conversations
             SET message_count = message_count + 1, last_message_at = ?1
             WHERE id = ?2",
            params![at, conversation_id],
        )?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> std::result::Result<ConversationRow, rusqlite::Error> {
        Ok(ConversationRow {
            id: row.get("id")?,
            event_id: row.get("event_id")?,
            creator_id: row.get("creator_id")?,
            peer_id: row.get("peer_id")?,
            message_count: row.get("message_count")?,
            created_at: row.get("created_at")?,
            last_message_at: row.get("last_message_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
