//! REST API handlers.
//!
//! Handlers take [`crate::server::AppState`] and return `Result<_, ApiError>`.
//! Response bodies use camelCase field names to match the web client.

pub mod conversations;
pub mod events;
pub mod tickets;

use serde_json::Value;

use crate::error::ApiError;

/// Validate a stringified JSON array field and normalize it for storage.
///
/// The web client sends `schedules`, `agendas`, and `tickets` as JSON
/// arrays serialized into strings. Anything that is not valid JSON, or
/// parses to a non-array, is a 400.
pub(crate) fn parse_array_field(field: &str, raw: &str) -> Result<String, ApiError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| ApiError::invalid_field(field))?;
    if !value.is_array() {
        return Err(ApiError::invalid_field(field));
    }
    Ok(value.to_string())
}

/// Parse a JSON text column back into a value, defaulting to `[]`.
///
/// Stored columns were validated on the way in, so a parse failure here
/// means manual database edits; degrade to an empty array rather than 500.
pub(crate) fn stored_array(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::Array(Vec::new()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
