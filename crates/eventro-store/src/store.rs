//! High-level transactional [`Store`] API.
//!
//! Composes the repositories into atomic operations. Every multi-row write
//! runs inside a single `SQLite` transaction, so callers never observe
//! partial state (a ticket without its counter bump, a message without its
//! conversation touch).

use crate::connection::{ConnectionPool, PooledConnection};
use crate::errors::{Result, StoreError};
use crate::repositories::conversation::{ConversationRepo, CreateConversationOptions};
use crate::repositories::event::{
    CreateEventOptions, EventRepo, ListEventsOptions, UpdateEventOptions,
};
use crate::repositories::message::{AppendMessageOptions, MessageRepo};
use crate::repositories::ticket::{IssueTicketOptions, TicketRepo, STATUS_CANCELLED};
use crate::repositories::user::UserRepo;
use crate::row_types::{ConversationRow, EventRow, MessageRow, TicketRow, UserRow};

/// Options for issuing a ticket through the store.
pub struct IssueTicket<'a> {
    /// Event to issue against.
    pub event_id: &'a str,
    /// Attendee user ID (registered on the fly if unknown).
    pub attendee_id: &'a str,
    /// Tier name from the event's `ticket_tiers`.
    pub tier_name: &'a str,
    /// Price paid, in cents.
    pub price_cents: i64,
}

/// Options for opening a conversation through the store.
pub struct OpenConversation<'a> {
    /// User opening the thread.
    pub creator_id: &'a str,
    /// The other participant.
    pub peer_id: &'a str,
    /// Optional event context.
    pub event_id: Option<&'a str>,
}

/// High-level store wrapping a connection pool and all repositories.
pub struct Store {
    pool: ConnectionPool,
}

impl Store {
    /// Create a new store with the given connection pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool.
    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    /// Create an event, registering the organizer if unknown.
    pub fn create_event(&self, opts: &CreateEventOptions<'_>) -> Result<EventRow> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let _ = UserRepo::get_or_create(&tx, opts.organizer_id, None)?;
        let event = EventRepo::create(&tx, opts)?;

        tx.commit()?;
        Ok(event)
    }

    /// Get an event by ID.
    pub fn get_event(&self, event_id: &str) -> Result<EventRow> {
        let conn = self.conn()?;
        EventRepo::get_by_id(&conn, event_id)?
            .ok_or_else(|| StoreError::EventNotFound(event_id.to_string()))
    }

    /// List events with filtering.
    pub fn list_events(&self, opts: &ListEventsOptions<'_>) -> Result<Vec<EventRow>> {
        let conn = self.conn()?;
        EventRepo::list(&conn, opts)
    }

    /// List events organized by a user.
    pub fn list_events_by_organizer(&self, organizer_id: &str) -> Result<Vec<EventRow>> {
        self.list_events(&ListEventsOptions {
            organizer_id: Some(organizer_id),
            ..Default::default()
        })
    }

    /// Apply a partial update to an event.
    pub fn update_event(
        &self,
        event_id: &str,
        opts: &UpdateEventOptions<'_>,
    ) -> Result<EventRow> {
        let conn = self.conn()?;
        EventRepo::update(&conn, event_id, opts)?
            .ok_or_else(|| StoreError::EventNotFound(event_id.to_string()))
    }

    /// Delete an event. Its tickets go with it.
    pub fn delete_event(&self, event_id: &str) -> Result<()> {
        let conn = self.conn()?;
        if EventRepo::delete(&conn, event_id)? {
            Ok(())
        } else {
            Err(StoreError::EventNotFound(event_id.to_string()))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tickets
    // ─────────────────────────────────────────────────────────────────────

    /// Issue a ticket against an event.
    ///
    /// Atomic: the capacity-guarded counter bump and the ticket insert
    /// commit together. A full event yields [`StoreError::SoldOut`].
    pub fn issue_ticket(&self, opts: &IssueTicket<'_>) -> Result<TicketRow> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let _ = EventRepo::get_by_id(&tx, opts.event_id)?
            .ok_or_else(|| StoreError::EventNotFound(opts.event_id.to_string()))?;

        if !EventRepo::increment_tickets_sold(&tx, opts.event_id)? {
            return Err(StoreError::SoldOut(opts.event_id.to_string()));
        }

        let _ = UserRepo::get_or_create(&tx, opts.attendee_id, None)?;
        let ticket = TicketRepo::issue(
            &tx,
            &IssueTicketOptions {
                event_id: opts.event_id,
                attendee_id: opts.attendee_id,
                tier_name: opts.tier_name,
                price_cents: opts.price_cents,
            },
        )?;

        tx.commit()?;
        Ok(ticket)
    }

    /// Get a ticket by ID.
    pub fn get_ticket(&self, ticket_id: &str) -> Result<TicketRow> {
        let conn = self.conn()?;
        TicketRepo::get_by_id(&conn, ticket_id)?
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))
    }

    /// List tickets held by a user.
    pub fn list_tickets_by_user(&self, user_id: &str) -> Result<Vec<TicketRow>> {
        let conn = self.conn()?;
        TicketRepo::list_by_attendee(&conn, user_id)
    }

    /// List tickets for an event.
    pub fn list_tickets_by_event(&self, event_id: &str) -> Result<Vec<TicketRow>> {
        let conn = self.conn()?;
        TicketRepo::list_by_event(&conn, event_id)
    }

    /// Cancel a ticket, releasing its seat.
    ///
    /// Atomic: the status flip and the counter release commit together.
    /// Cancelling an already-cancelled ticket is a no-op.
    pub fn cancel_ticket(&self, ticket_id: &str) -> Result<TicketRow> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let ticket = TicketRepo::get_by_id(&tx, ticket_id)?
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;

        if ticket.status == STATUS_CANCELLED {
            tx.commit()?;
            return Ok(ticket);
        }

        let _ = TicketRepo::cancel(&tx, ticket_id)?;
        let _ = EventRepo::decrement_tickets_sold(&tx, &ticket.event_id)?;

        tx.commit()?;

        // Re-read on the same connection; a second checkout would deadlock
        // against ourselves on a single-connection pool.
        TicketRepo::get_by_id(&conn, ticket_id)?
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Conversations and messages
    // ─────────────────────────────────────────────────────────────────────

    /// Open a conversation between two users, or return the existing
    /// thread for the same pair and event context.
    pub fn open_conversation(&self, opts: &OpenConversation<'_>) -> Result<ConversationRow> {
        if opts.creator_id == opts.peer_id {
            return Err(StoreError::InvalidOperation(
                "cannot open a conversation with yourself".to_string(),
            ));
        }

        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        if let Some(event_id) = opts.event_id {
            let _ = EventRepo::get_by_id(&tx, event_id)?
                .ok_or_else(|| StoreError::EventNotFound(event_id.to_string()))?;
        }

        if let Some(existing) =
            ConversationRepo::find_between(&tx, opts.creator_id, opts.peer_id, opts.event_id)?
        {
            tx.commit()?;
            return Ok(existing);
        }

        let _ = UserRepo::get_or_create(&tx, opts.creator_id, None)?;
        let _ = UserRepo::get_or_create(&tx, opts.peer_id, None)?;
        let conversation = ConversationRepo::create(
            &tx,
            &CreateConversationOptions {
                creator_id: opts.creator_id,
                peer_id: opts.peer_id,
                event_id: opts.event_id,
            },
        )?;

        tx.commit()?;
        Ok(conversation)
    }

    /// Get a conversation by ID.
    pub fn get_conversation(&self, conversation_id: &str) -> Result<ConversationRow> {
        let conn = self.conn()?;
        ConversationRepo::get_by_id(&conn, conversation_id)?
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))
    }

    /// List a user's conversations, most recently active first.
    pub fn list_conversations_by_user(&self, user_id: &str) -> Result<Vec<ConversationRow>> {
        let conn = self.conn()?;
        ConversationRepo::list_by_user(&conn, user_id)
    }

    /// Append a message to a conversation.
    ///
    /// Atomic: the message insert and the conversation's counter bump
    /// commit together. The sender must be one of the two participants.
    pub fn append_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        body: &str,
    ) -> Result<MessageRow> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let conversation = ConversationRepo::get_by_id(&tx, conversation_id)?
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))?;

        if sender_id != conversation.creator_id && sender_id != conversation.peer_id {
            return Err(StoreError::InvalidOperation(format!(
                "user {sender_id} is not a participant in {conversation_id}"
            )));
        }

        let message = MessageRepo::append(
            &tx,
            &AppendMessageOptions {
                conversation_id,
                sender_id,
                body,
            },
        )?;
        let _ = ConversationRepo::touch(&tx, conversation_id, &message.created_at)?;

        tx.commit()?;
        Ok(message)
    }

    /// List messages in a conversation in chronological order.
    pub fn list_messages(
        &self,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<MessageRow>> {
        let conn = self.conn()?;
        let _ = ConversationRepo::get_by_id(&conn, conversation_id)?
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))?;
        MessageRepo::list_by_conversation(&conn, conversation_id, limit)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    /// Get a user by ID.
    pub fn get_user(&self, user_id: &str) -> Result<UserRow> {
        let conn = self.conn()?;
        UserRepo::get_by_id(&conn, user_id)?
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::connection::{new_file, ConnectionConfig};
    use crate::migrations::run_migrations;
    use assert_matches::assert_matches;

    // Pooled in-memory connections each get a private database, so store
    // tests run against a temp file shared across the pool.
    fn open_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventro.db");
        let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
        run_migrations(&pool.get().unwrap()).unwrap();
        (dir, Store::new(pool))
    }

    fn sample_event<'a>(organizer_id: &'a str, title: &'a str, capacity: i64) -> CreateEventOptions<'a> {
        CreateEventOptions {
            organizer_id,
            title,
            description: None,
            category: Some("music"),
            venue: None,
            city: Some("Austin"),
            capacity,
            schedules: "[]",
            agendas: "[]",
            ticket_tiers: r#"[{"name":"GA","priceCents":1500}]"#,
            cover_image_url: None,
        }
    }

    #[test]
    fn create_event_registers_organizer() {
        let (_dir, store) = open_store();
        let event = store.create_event(&sample_event("usr_org", "Show", 10)).unwrap();
        assert!(event.id.starts_with("evt_"));

        let organizer = store.get_user("usr_org").unwrap();
        assert_eq!(organizer.id, "usr_org");
    }

    #[test]
    fn get_event_missing_is_not_found() {
        let (_dir, store) = open_store();
        assert_matches!(store.get_event("evt_missing"), Err(StoreError::EventNotFound(_)));
    }

    #[test]
    fn update_then_delete_event() {
        let (_dir, store) = open_store();
        let event = store.create_event(&sample_event("usr_org", "Show", 10)).unwrap();

        let updated = store
            .update_event(
                &event.id,
                &UpdateEventOptions {
                    title: Some("Bigger Show"),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Bigger Show");

        store.delete_event(&event.id).unwrap();
        assert_matches!(store.delete_event(&event.id), Err(StoreError::EventNotFound(_)));
    }

    #[test]
    fn issue_ticket_bumps_counter() {
        let (_dir, store) = open_store();
        let event = store.create_event(&sample_event("usr_org", "Show", 10)).unwrap();

        let ticket = store
            .issue_ticket(&IssueTicket {
                event_id: &event.id,
                attendee_id: "usr_alice",
                tier_name: "GA",
                price_cents: 1500,
            })
            .unwrap();
        assert!(ticket.id.starts_with("tkt_"));

        let fresh = store.get_event(&event.id).unwrap();
        assert_eq!(fresh.tickets_sold, 1);
    }

    #[test]
    fn issue_ticket_sold_out_leaves_no_partial_state() {
        let (_dir, store) = open_store();
        let event = store.create_event(&sample_event("usr_org", "Tiny", 1)).unwrap();

        store
            .issue_ticket(&IssueTicket {
                event_id: &event.id,
                attendee_id: "usr_alice",
                tier_name: "GA",
                price_cents: 1500,
            })
            .unwrap();

        let result = store.issue_ticket(&IssueTicket {
            event_id: &event.id,
            attendee_id: "usr_bob",
            tier_name: "GA",
            price_cents: 1500,
        });
        assert_matches!(result, Err(StoreError::SoldOut(_)));

        let fresh = store.get_event(&event.id).unwrap();
        assert_eq!(fresh.tickets_sold, 1);
        assert_eq!(store.list_tickets_by_event(&event.id).unwrap().len(), 1);
    }

    #[test]
    fn issue_ticket_missing_event_is_not_found() {
        let (_dir, store) = open_store();
        let result = store.issue_ticket(&IssueTicket {
            event_id: "evt_missing",
            attendee_id: "usr_alice",
            tier_name: "GA",
            price_cents: 0,
        });
        assert_matches!(result, Err(StoreError::EventNotFound(_)));
    }

    #[test]
    fn cancel_ticket_releases_seat() {
        let (_dir, store) = open_store();
        let event = store.create_event(&sample_event("usr_org", "Tiny", 1)).unwrap();
        let ticket = store
            .issue_ticket(&IssueTicket {
                event_id: &event.id,
                attendee_id: "usr_alice",
                tier_name: "GA",
                price_cents: 1500,
            })
            .unwrap();

        let cancelled = store.cancel_ticket(&ticket.id).unwrap();
        assert_eq!(cancelled.status, "cancelled");
        assert_eq!(store.get_event(&event.id).unwrap().tickets_sold, 0);

        // The freed seat can be reissued.
        store
            .issue_ticket(&IssueTicket {
                event_id: &event.id,
                attendee_id: "usr_bob",
                tier_name: "GA",
                price_cents: 1500,
            })
            .unwrap();
    }

    #[test]
    fn cancel_ticket_works_on_single_connection_pool() {
        // The cancel path must never check out a second connection while
        // holding the first, or a pool of one deadlocks.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventro.db");
        let config = ConnectionConfig {
            pool_size: 1,
            ..ConnectionConfig::default()
        };
        let pool = new_file(path.to_str().unwrap(), &config).unwrap();
        run_migrations(&pool.get().unwrap()).unwrap();
        let store = Store::new(pool);

        let event = store.create_event(&sample_event("usr_org", "Solo", 5)).unwrap();
        let ticket = store
            .issue_ticket(&IssueTicket {
                event_id: &event.id,
                attendee_id: "usr_alice",
                tier_name: "GA",
                price_cents: 1500,
            })
            .unwrap();

        let cancelled = store.cancel_ticket(&ticket.id).unwrap();
        assert_eq!(cancelled.status, "cancelled");
        assert_eq!(store.get_event(&event.id).unwrap().tickets_sold, 0);
    }

    #[test]
    fn cancel_ticket_twice_is_idempotent() {
        let (_dir, store) = open_store();
        let event = store.create_event(&sample_event("usr_org", "Show", 5)).unwrap();
        let ticket = store
            .issue_ticket(&IssueTicket {
                event_id: &event.id,
                attendee_id: "usr_alice",
                tier_name: "GA",
                price_cents: 1500,
            })
            .unwrap();

        store.cancel_ticket(&ticket.id).unwrap();
        let again = store.cancel_ticket(&ticket.id).unwrap();
        assert_eq!(again.status, "cancelled");
        // Counter must not go below the real count.
        assert_eq!(store.get_event(&event.id).unwrap().tickets_sold, 0);
    }

    #[test]
    fn open_conversation_is_idempotent_per_pair() {
        let (_dir, store) = open_store();
        let first = store
            .open_conversation(&OpenConversation {
                creator_id: "usr_alice",
                peer_id: "usr_bob",
                event_id: None,
            })
            .unwrap();
        let second = store
            .open_conversation(&OpenConversation {
                creator_id: "usr_bob",
                peer_id: "usr_alice",
                event_id: None,
            })
            .unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn open_conversation_with_self_rejected() {
        let (_dir, store) = open_store();
        let result = store.open_conversation(&OpenConversation {
            creator_id: "usr_alice",
            peer_id: "usr_alice",
            event_id: None,
        });
        assert_matches!(result, Err(StoreError::InvalidOperation(_)));
    }

    #[test]
    fn open_conversation_missing_event_is_not_found() {
        let (_dir, store) = open_store();
        let result = store.open_conversation(&OpenConversation {
            creator_id: "usr_alice",
            peer_id: "usr_bob",
            event_id: Some("evt_missing"),
        });
        assert_matches!(result, Err(StoreError::EventNotFound(_)));
    }

    #[test]
    fn append_message_bumps_conversation() {
        let (_dir, store) = open_store();
        let convo = store
            .open_conversation(&OpenConversation {
                creator_id: "usr_alice",
                peer_id: "usr_bob",
                event_id: None,
            })
            .unwrap();

        let message = store
            .append_message(&convo.id, "usr_alice", "is parking included?")
            .unwrap();
        assert!(message.id.starts_with("msg_"));

        let fresh = store.get_conversation(&convo.id).unwrap();
        assert_eq!(fresh.message_count, 1);
        assert_eq!(fresh.last_message_at, message.created_at);
    }

    #[test]
    fn append_message_from_outsider_rejected() {
        let (_dir, store) = open_store();
        let convo = store
            .open_conversation(&OpenConversation {
                creator_id: "usr_alice",
                peer_id: "usr_bob",
                event_id: None,
            })
            .unwrap();

        let result = store.append_message(&convo.id, "usr_mallory", "hi");
        assert_matches!(result, Err(StoreError::InvalidOperation(_)));
        assert_eq!(store.get_conversation(&convo.id).unwrap().message_count, 0);
    }

    #[test]
    fn list_messages_missing_conversation_is_not_found() {
        let (_dir, store) = open_store();
        assert_matches!(
            store.list_messages("conv_missing", None),
            Err(StoreError::ConversationNotFound(_))
        );
    }

    #[test]
    fn list_messages_in_order() {
        let (_dir, store) = open_store();
        let convo = store
            .open_conversation(&OpenConversation {
                creator_id: "usr_alice",
                peer_id: "usr_bob",
                event_id: None,
            })
            .unwrap();
        store.append_message(&convo.id, "usr_alice", "hello").unwrap();
        store.append_message(&convo.id, "usr_bob", "hi back").unwrap();

        let messages = store.list_messages(&convo.id, None).unwrap();
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["hello", "hi back"]);
    }

    #[test]
    fn deleting_event_keeps_conversations_with_null_context() {
        let (_dir, store) = open_store();
        let event = store.create_event(&sample_event("usr_org", "Show", 5)).unwrap();
        let convo = store
            .open_conversation(&OpenConversation {
                creator_id: "usr_alice",
                peer_id: "usr_org",
                event_id: Some(&event.id),
            })
            .unwrap();

        store.delete_event(&event.id).unwrap();

        let fresh = store.get_conversation(&convo.id).unwrap();
        assert!(fresh.event_id.is_none());
    }
}
