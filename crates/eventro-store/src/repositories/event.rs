//! Event repository — the core listing table.
//!
//! The `schedules`, `agendas`, and `ticket_tiers` columns store JSON arrays
//! as text; callers serialize before writing and parse after reading. The
//! `tickets_sold` counter is denormalized and only ever moved through the
//! guarded increment/decrement methods.

use eventro_core::ids::EventId;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::Result;
use crate::row_types::EventRow;

/// Options for creating a new event.
pub struct CreateEventOptions<'a> {
    /// Organizer user ID.
    pub organizer_id: &'a str,
    /// Event title.
    pub title: &'a str,
    /// Long-form description.
    pub description: Option<&'a str>,
    /// Category slug.
    pub category: Option<&'a str>,
    /// Venue name.
    pub venue: Option<&'a str>,
    /// City.
    pub city: Option<&'a str>,
    /// Maximum tickets (0 = unlimited).
    pub capacity: i64,
    /// Schedule entries, already serialized as a JSON array.
    pub schedules: &'a str,
    /// Agenda entries, already serialized as a JSON array.
    pub agendas: &'a str,
    /// Ticket tier definitions, already serialized as a JSON array.
    pub ticket_tiers: &'a str,
    /// Cover image URL.
    pub cover_image_url: Option<&'a str>,
}

/// Options for listing events.
#[derive(Default)]
pub struct ListEventsOptions<'a> {
    /// Filter by organizer.
    pub organizer_id: Option<&'a str>,
    /// Filter by category.
    pub category: Option<&'a str>,
    /// Filter by city.
    pub city: Option<&'a str>,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Skip results.
    pub offset: Option<i64>,
}

/// Fields to change on an existing event. `None` leaves a column untouched.
#[derive(Default)]
pub struct UpdateEventOptions<'a> {
    /// New title.
    pub title: Option<&'a str>,
    /// New description.
    pub description: Option<&'a str>,
    /// New category.
    pub category: Option<&'a str>,
    /// New venue.
    pub venue: Option<&'a str>,
    /// New city.
    pub city: Option<&'a str>,
    /// New capacity.
    pub capacity: Option<i64>,
    /// Replacement schedules JSON array.
    pub schedules: Option<&'a str>,
    /// Replacement agendas JSON array.
    pub agendas: Option<&'a str>,
    /// Replacement ticket tiers JSON array.
    pub ticket_tiers: Option<&'a str>,
    /// New cover image URL.
    pub cover_image_url: Option<&'a str>,
}

/// Event repository — stateless, every method takes `&Connection`.
pub struct EventRepo;

impl EventRepo {
    /// Create a new event.
    pub fn create(conn: &Connection, opts: &CreateEventOptions<'_>) -> Result<EventRow> {
        let id = EventId::new().into_inner();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO events (id, organizer_id, title, description, category, venue, city,
             capacity, schedules, agendas, ticket_tiers, cover_image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                id,
                opts.organizer_id,
                opts.title,
                opts.description,
                opts.category,
                opts.venue,
                opts.city,
                opts.capacity,
                opts.schedules,
                opts.agendas,
                opts.ticket_tiers,
                opts.cover_image_url,
                now,
                now,
            ],
        )?;

        Ok(EventRow {
            id,
            organizer_id: opts.organizer_id.to_string(),
            title: opts.title.to_string(),
            description: opts.description.map(String::from),
            category: opts.category.map(String::from),
            venue: opts.venue.map(String::from),
            city: opts.city.map(String::from),
            capacity: opts.capacity,
            schedules: opts.schedules.to_string(),
            agendas: opts.agendas.to_string(),
            ticket_tiers: opts.ticket_tiers.to_string(),
            tickets_sold: 0,
            cover_image_url: opts.cover_image_url.map(String::from),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get an event by ID.
    pub fn get_by_id(conn: &Connection, event_id: &str) -> Result<Option<EventRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM events WHERE id = ?1",
                params![event_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List events with filtering, newest first.
    pub fn list(conn: &Connection, opts: &ListEventsOptions<'_>) -> Result<Vec<EventRow>> {
        use std::fmt::Write;
        let mut sql = String::from("SELECT * FROM events WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(organizer_id) = opts.organizer_id {
            let _ = write!(sql, " AND organizer_id = ?{}", param_values.len() + 1);
            param_values.push(Box::new(organizer_id.to_string()));
        }
        if let Some(category) = opts.category {
            let _ = write!(sql, " AND category = ?{}", param_values.len() + 1);
            param_values.push(Box::new(category.to_string()));
        }
        if let Some(city) = opts.city {
            let _ = write!(sql, " AND city = ?{}", param_values.len() + 1);
            param_values.push(Box::new(city.to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC");
        if let Some(limit) = opts.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        if let Some(offset) = opts.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Apply a partial update. Returns the fresh row, or `None` if the
    /// event does not exist.
    pub fn update(
        conn: &Connection,
        event_id: &str,
        opts: &UpdateEventOptions<'_>,
    ) -> Result<Option<EventRow>> {
        use std::fmt::Write;
        let mut assignments = String::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        let mut push_set = |column: &str, value: Box<dyn rusqlite::types::ToSql>,
                            assignments: &mut String,
                            params: &mut Vec<Box<dyn rusqlite::types::ToSql>>| {
            if !assignments.is_empty() {
                assignments.push_str(", ");
            }
            params.push(value);
            let _ = write!(assignments, "{column} = ?{}", params.len());
        };

        if let Some(title) = opts.title {
            push_set("title", Box::new(title.to_string()), &mut assignments, &mut param_values);
        }
        if let Some(description) = opts.description {
            push_set(
                "description",
                Box::new(description.to_string()),
                &mut assignments,
                &mut param_values,
            );
        }
        if let Some(category) = opts.category {
            push_set("category", Box::new(category.to_string()), &mut assignments, &mut param_values);
        }
        if let Some(venue) = opts.venue {
            push_set("venue", Box::new(venue.to_string()), &mut assignments, &mut param_values);
        }
        if let Some(city) = opts.city {
            push_set("city", Box::new(city.to_string()), &mut assignments, &mut param_values);
        }
        if let Some(capacity) = opts.capacity {
            push_set("capacity", Box::new(capacity), &mut assignments, &mut param_values);
        }
        if let Some(schedules) = opts.schedules {
            push_set("schedules", Box::new(schedules.to_string()), &mut assignments, &mut param_values);
        }
        if let Some(agendas) = opts.agendas {
            push_set("agendas", Box::new(agendas.to_string()), &mut assignments, &mut param_values);
        }
        if let Some(tiers) = opts.ticket_tiers {
            push_set(
                "ticket_tiers",
                Box::new(tiers.to_string()),
                &mut assignments,
                &mut param_values,
            );
        }
        if let Some(url) = opts.cover_image_url {
            push_set(
                "cover_image_url",
                Box::new(url.to_string()),
                &mut assignments,
                &mut param_values,
            );
        }

        // Always touch updated_at, even for a no-op body.
        let now = chrono::Utc::now().to_rfc3339();
        push_set("updated_at", Box::new(now), &mut assignments, &mut param_values);

        param_values.push(Box::new(event_id.to_string()));
        let sql = format!(
            "UPDATE events SET {assignments} WHERE id = ?{}",
            param_values.len()
        );

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();
        let changed = conn.execute(&sql, params_refs.as_slice())?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, event_id)
    }

    /// Delete an event. Tickets cascade; conversations keep a null event.
    pub fn delete(conn: &Connection, event_id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM events WHERE id = ?1", params![event_id])?;
        Ok(changed > 0)
    }

    /// Atomically bump `tickets_sold`, refusing to exceed capacity.
    ///
    /// Returns `false` when the event is missing or the increment would
    /// overshoot a non-zero capacity.
    pub fn increment_tickets_sold(conn: &Connection, event_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE events SET tickets_sold = tickets_sold + 1
             WHERE id = ?1 AND (capacity = 0 OR tickets_sold < capacity)",
            params![event_id],
        )?;
        Ok(changed > 0)
    }

    /// Atomically release one sold ticket, clamping at zero.
    pub fn decrement_tickets_sold(conn: &Connection, event_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE events SET tickets_sold = MAX(tickets_sold - 1, 0) WHERE id = ?1",
            params![event_id],
        )?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> std::result::Result<EventRow, rusqlite::Error> {
        Ok(EventRow {
            id: row.get("id")?,
            organizer_id: row.get("organizer_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category: row.get("category")?,
            venue: row.get("venue")?,
            city: row.get("city")?,
            capacity: row.get("capacity")?,
            schedules: row.get("schedules")?,
            agendas: row.get("agendas")?,
            ticket_tiers: row.get("ticket_tiers")?,
            tickets_sold: row.get("tickets_sold")?,
            cover_image_url: row.get("cover_image_url")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
