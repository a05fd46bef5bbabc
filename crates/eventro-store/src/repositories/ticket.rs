//! Ticket repository.
//!
//! Tickets are never deleted. Cancellation flips `status` to `cancelled`
//! and stays in the table so attendees keep their purchase history. The
//! event's `tickets_sold` counter is owned by the event repository; the
//! store facade keeps the two in sync inside one transaction.

use eventro_core::ids::TicketId;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::Result;
use crate::row_types::TicketRow;

/// Ticket status column value for an active ticket.
pub const STATUS_ISSUED: &str = "issued";
/// Ticket status column value for a cancelled ticket.
pub const STATUS_CANCELLED: &str = "cancelled";

/// Options for issuing a ticket.
pub struct IssueTicketOptions<'a> {
    /// Event the ticket is for.
    pub event_id: &'a str,
    /// Attendee user ID.
    pub attendee_id: &'a str,
    /// Tier the ticket was issued against.
    pub tier_name: &'a str,
    /// Price paid, in cents.
    pub price_cents: i64,
}

/// Ticket repository — stateless, every method takes `&Connection`.
pub struct TicketRepo;

impl TicketRepo {
    /// Issue a new ticket.
    pub fn issue(conn: &Connection, opts: &IssueTicketOptions<'_>) -> Result<TicketRow> {
        let id = TicketId::new().into_inner();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO tickets (id, event_id, attendee_id, tier_name, price_cents, status, issued_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                opts.event_id,
                opts.attendee_id,
                opts.tier_name,
                opts.price_cents,
                STATUS_ISSUED,
                now,
            ],
        )?;

        Ok(TicketRow {
            id,
            event_id: opts.event_id.to_string(),
            attendee_id: opts.attendee_id.to_string(),
            tier_name: opts.tier_name.to_string(),
            price_cents: opts.price_cents,
            status: STATUS_ISSUED.to_string(),
            issued_at: now,
        })
    }

    /// Get a ticket by ID.
    pub fn get_by_id(conn: &Connection, ticket_id: &str) -> Result<Option<TicketRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM tickets WHERE id = ?1",
                params![ticket_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List tickets for an event, newest first.
    pub fn list_by_event(conn: &Connection, event_id: &str) -> Result<Vec<TicketRow>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM tickets WHERE event_id = ?1 ORDER BY issued_at DESC",
        )?;
        let rows = stmt
            .query_map(params![event_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// List tickets held by an attendee, newest first.
    pub fn list_by_attendee(conn: &Connection, attendee_id: &str) -> Result<Vec<TicketRow>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM tickets WHERE attendee_id = ?1 ORDER BY issued_at DESC",
        )?;
        let rows = stmt
            .query_map(params![attendee_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Flip an issued ticket to cancelled. Returns `false` if the ticket
    /// is missing or already cancelled.
    pub fn cancel(conn: &Connection, ticket_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE tickets SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![STATUS_CANCELLED, ticket_id, STATUS_ISSUED],
        )?;
        Ok(changed > 0)
    }

    /// Count issued tickets for an event.
    pub fn count_issued_for_event(conn: &Connection, event_id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tickets WHERE event_id = ?1 AND status = ?2",
            params![event_id, STATUS_ISSUED],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> std::result::Result<TicketRow, rusqlite::Error> {
        Ok(TicketRow {
            id: row.get("id")?,
            event_id: row.get("event_id")?,
            attendee_id: row.get("attendee_id")?,
            tier_name: row.get("tier_name")?,
            price_cents: row.get("price_cents")?,
            status: row.get("status")?,
            issued_at: row.get("issued_at")?,
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
    use crate::repositories::event::{CreateEventOptions, EventRepo};
    use crate::repositories::user::UserRepo;

    fn open_migrated() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn seed_event(conn: &Connection) -> String {
        UserRepo::get_or_create(conn, "usr_org", None).unwrap();
        EventRepo::create(
            conn,
            &CreateEventOptions {
                organizer_id: "usr_org",
                title: "Show",
                description: None,
                category: None,
                venue: None,
                city: None,
                capacity: 10,
                schedules: "[]",
                agendas: "[]",
                ticket_tiers: r#"[{"name":"GA","priceCents":1000}]"#,
                cover_image_url: None,
            },
        )
        .unwrap()
        .id
    }

    fn issue_for(conn: &Connection, event_id: &str, attendee: &str) -> TicketRow {
        UserRepo::get_or_create(conn, attendee, None).unwrap();
        TicketRepo::issue(
            conn,
            &IssueTicketOptions {
                event_id,
                attendee_id: attendee,
                tier_name: "GA",
                price_cents: 1000,
            },
        )
        .unwrap()
    }

    #[test]
    fn issue_assigns_prefixed_id_and_issued_status() {
        let conn = open_migrated();
        let event_id = seed_event(&conn);
        let ticket = issue_for(&conn, &event_id, "usr_alice");
        assert!(ticket.id.starts_with("tkt_"));
        assert_eq!(ticket.status, STATUS_ISSUED);
        assert_eq!(ticket.price_cents, 1000);
    }

    #[test]
    fn get_by_id_missing_returns_none() {
        let conn = open_migrated();
        assert!(TicketRepo::get_by_id(&conn, "tkt_missing").unwrap().is_none());
    }

    #[test]
    fn list_by_attendee_only_returns_their_tickets() {
        let conn = open_migrated();
        let event_id = seed_event(&conn);
        issue_for(&conn, &event_id, "usr_alice");
        issue_for(&conn, &event_id, "usr_bob");

        let alice = TicketRepo::list_by_attendee(&conn, "usr_alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].attendee_id, "usr_alice");
    }

    #[test]
    fn list_by_event_returns_all() {
        let conn = open_migrated();
        let event_id = seed_event(&conn);
        issue_for(&conn, &event_id, "usr_alice");
        issue_for(&conn, &event_id, "usr_bob");

        let tickets = TicketRepo::list_by_event(&conn, &event_id).unwrap();
        assert_eq!(tickets.len(), 2);
    }

    #[test]
    fn cancel_flips_status_once() {
        let conn = open_migrated();
        let event_id = seed_event(&conn);
        let ticket = issue_for(&conn, &event_id, "usr_alice");

        assert!(TicketRepo::cancel(&conn, &ticket.id).unwrap());
        // Second cancel is a no-op.
        assert!(!TicketRepo::cancel(&conn, &ticket.id).unwrap());

        let row = TicketRepo::get_by_id(&conn, &ticket.id).unwrap().unwrap();
        assert_eq!(row.status, STATUS_CANCELLED);
    }

    #[test]
    fn cancel_missing_returns_false() {
        let conn = open_migrated();
        assert!(!TicketRepo::cancel(&conn, "tkt_missing").unwrap());
    }

    #[test]
    fn count_issued_excludes_cancelled() {
        let conn = open_migrated();
        let event_id = seed_event(&conn);
        let first = issue_for(&conn, &event_id, "usr_alice");
        issue_for(&conn, &event_id, "usr_bob");

        assert_eq!(TicketRepo::count_issued_for_event(&conn, &event_id).unwrap(), 2);
        TicketRepo::cancel(&conn, &first.id).unwrap();
        assert_eq!(TicketRepo::count_issued_for_event(&conn, &event_id).unwrap(), 1);
    }
}
