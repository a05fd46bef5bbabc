//! Message repository.
//!
//! Messages are append-only. The parent conversation's counters are bumped
//! by the store facade in the same transaction as the insert.

use eventro_core::ids::MessageId;
use rusqlite::{params, Connection};

use crate::errors::Result;
use crate::row_types::MessageRow;

/// Options for appending a message.
pub struct AppendMessageOptions<'a> {
    /// Conversation to append to.
    pub conversation_id: &'a str,
    /// Sender user ID.
    pub sender_id: &'a str,
    /// Message body.
    pub body: &'a str,
}

/// Message repository — stateless, every method takes `&Connection`.
pub struct MessageRepo;

impl MessageRepo {
    /// Append a message to a conversation.
    pub fn append(conn: &Connection, opts: &AppendMessageOptions<'_>) -> Result<MessageRow> {
        let id = MessageId::new().into_inner();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO messages (id, conversation_id, sender_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, opts.conversation_id, opts.sender_id, opts.body, now],
        )?;

        Ok(MessageRow {
            id,
            conversation_id: opts.conversation_id.to_string(),
            sender_id: opts.sender_id.to_string(),
            body: opts.body.to_string(),
            created_at: now,
        })
    }

    /// List messages in a conversation in chronological order.
    pub fn list_by_conversation(
        conn: &Connection,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<MessageRow>> {
        use std::fmt::Write;
        let mut sql = String::from(
            "SELECT * FROM messages WHERE conversation_id = ?1 ORDER BY created_at ASC, id ASC",
        );
        if let Some(limit) = limit {
            let _ = write!(sql, " LIMIT {limit}");
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![conversation_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> std::result::Result<MessageRow, rusqlite::Error> {
        Ok(MessageRow {
            id: row.get("id")?,
            conversation_id: row.get("conversation_id")?,
            sender_id: row.get("sender_id")?,
            body: row.get("body")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::repositories::conversation::{ConversationRepo, CreateConversationOptions};
    use crate::repositories::user::UserRepo;

    fn open_migrated() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn seed_thread(conn: &Connection) -> String {
        UserRepo::get_or_create(conn, "usr_alice", None).unwrap();
        UserRepo::get_or_create(conn, "usr_bob", None).unwrap();
        ConversationRepo::create(
            conn,
            &CreateConversationOptions {
                creator_id: "usr_alice",
                peer_id: "usr_bob",
                event_id: None,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn append_assigns_prefixed_id() {
        let conn = open_migrated();
        let convo_id = seed_thread(&conn);
        let message = MessageRepo::append(
            &conn,
            &AppendMessageOptions {
                conversation_id: &convo_id,
                sender_id: "usr_alice",
                body: "hey, is the venue wheelchair accessible?",
            },
        )
        .unwrap();
        assert!(message.id.starts_with("msg_"));
        assert_eq!(message.body, "hey, is the venue wheelchair accessible?");
    }

    #[test]
    fn list_returns_chronological_order() {
        let conn = open_migrated();
        let convo_id = seed_thread(&conn);
        for body in ["first", "second", "third"] {
            MessageRepo::append(
                &conn,
                &AppendMessageOptions {
                    conversation_id: &convo_id,
                    sender_id: "usr_alice",
                    body,
                },
            )
            .unwrap();
        }

        let messages = MessageRepo::list_by_conversation(&conn, &convo_id, None).unwrap();
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "third"]);
    }

    #[test]
    fn list_respects_limit() {
        let conn = open_migrated();
        let convo_id = seed_thread(&conn);
        for i in 0..5 {
            MessageRepo::append(
                &conn,
                &AppendMessageOptions {
                    conversation_id: &convo_id,
                    sender_id: "usr_alice",
                    body: &format!("message {i}"),
                },
            )
            .unwrap();
        }

        let messages = MessageRepo::list_by_conversation(&conn, &convo_id, Some(2)).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].body, "message 0");
    }

    #[test]
    fn list_empty_conversation_returns_empty() {
        let conn = open_migrated();
        let convo_id = seed_thread(&conn);
        let messages = MessageRepo::list_by_conversation(&conn, &convo_id, None).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn append_to_missing_conversation_fails_fk() {
        let conn = open_migrated();
        UserRepo::get_or_create(&conn, "usr_alice", None).unwrap();
        let result = MessageRepo::append(
            &conn,
            &AppendMessageOptions {
                conversation_id: "conv_missing",
                sender_id: "usr_alice",
                body: "hello?",
            },
        );
        assert!(result.is_err());
    }
}
