//! User repository.
//!
//! Users are created lazily: any request that references a user ID the
//! database has not seen yet registers it on the spot. There is no separate
//! signup flow in this service.

use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::Result;
use crate::row_types::UserRow;

/// User repository — stateless, every method takes `&Connection`.
pub struct UserRepo;

impl UserRepo {
    /// Get a user by ID, creating it if it does not exist.
    pub fn get_or_create(
        conn: &Connection,
        user_id: &str,
        display_name: Option<&str>,
    ) -> Result<UserRow> {
        if let Some(existing) = Self::get_by_id(conn, user_id)? {
            return Ok(existing);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO users (id, display_name, email, created_at) VALUES (?1, ?2, NULL, ?3)",
            params![user_id, display_name, now],
        )?;

        Ok(UserRow {
            id: user_id.to_string(),
            display_name: display_name.map(String::from),
            email: None,
            created_at: now,
        })
    }

    /// Get a user by ID.
    pub fn get_by_id(conn: &Connection, user_id: &str) -> Result<Option<UserRow>> {
        let row = conn
            .query_row(
                "SELECT id, display_name, email, created_at FROM users WHERE id = ?1",
                params![user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Update the display name and/or email for an existing user.
    pub fn update_profile(
        conn: &Connection,
        user_id: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE users SET
               display_name = COALESCE(?1, display_name),
               email        = COALESCE(?2, email)
             WHERE id = ?3",
            params![display_name, email, user_id],
        )?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
        Ok(UserRow {
            id: row.get("id")?,
            display_name: row.get("display_name")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
