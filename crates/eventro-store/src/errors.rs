//! Error types for the persistence layer.
//!
//! [`StoreError`] is returned by all store operations. Lookup misses get
//! per-entity variants so the HTTP layer can map them to 404 without
//! string-matching.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Requested event was not found.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// Requested ticket was not found.
    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    /// Requested conversation was not found.
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    /// Requested user was not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Event has no remaining capacity.
    #[error("event sold out: {0}")]
    SoldOut(String),

    /// Invalid operation on the store.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_error_display() {
        let err = StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().contains("sqlite error"));
    }

    #[test]
    fn serde_error_display() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = StoreError::Serde(serde_err);
        assert!(err.to_string().contains("serde error"));
    }

    #[test]
    fn migration_error_display() {
        let err = StoreError::Migration {
            message: "v002 failed: duplicate column".into(),
        };
        assert_eq!(err.to_string(), "migration error: v002 failed: duplicate column");
    }

    #[test]
    fn event_not_found_display() {
        let err = StoreError::EventNotFound("evt_123".into());
        assert_eq!(err.to_string(), "event not found: evt_123");
    }

    #[test]
    fn ticket_not_found_display() {
        let err = StoreError::TicketNotFound("tkt_456".into());
        assert_eq!(err.to_string(), "ticket not found: tkt_456");
    }

    #[test]
    fn conversation_not_found_display() {
        let err = StoreError::ConversationNotFound("conv_789".into());
        assert_eq!(err.to_string(), "conversation not found: conv_789");
    }

    #[test]
    fn sold_out_display() {
        let err = StoreError::SoldOut("evt_full".into());
        assert_eq!(err.to_string(), "event sold out: evt_full");
    }

    #[test]
    fn from_rusqlite_error() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let err: StoreError = sqlite_err.into();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn from_serde_error() {
        let serde_err = serde_json::from_str::<String>("bad").unwrap_err();
        let err: StoreError = serde_err.into();
        assert!(matches!(err, StoreError::Serde(_)));
    }

    #[test]
    fn result_alias() {
        fn example() -> Result<String> {
            Ok("hello".into())
        }
        assert_eq!(example().unwrap(), "hello");
    }
}
