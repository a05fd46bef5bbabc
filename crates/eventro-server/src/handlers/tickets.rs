//! Ticket endpoints: issue, look up, cancel, and per-user listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use eventro_core::format::format_price_cents;
use metrics::counter;
use serde::{Deserialize, Serialize};

use eventro_store::row_types::TicketRow;
use eventro_store::store::IssueTicket;
use eventro_store::StoreError;

use crate::error::ApiError;
use crate::metrics::{TICKETS_CANCELLED_TOTAL, TICKETS_ISSUED_TOTAL, TICKETS_SOLD_OUT_TOTAL};
use crate::server::AppState;

/// Request body for `POST /events/{id}/tickets`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTicketRequest {
    /// Attendee user ID.
    pub attendee_id: String,
    /// Tier to issue against (defaults to general admission).
    #[serde(default)]
    pub tier_name: Option<String>,
    /// Price paid, in cents (defaults to free).
    #[serde(default)]
    pub price_cents: Option<i64>,
}

/// Ticket response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    /// Ticket ID.
    pub id: String,
    /// Event the ticket is for.
    pub event_id: String,
    /// Attendee user ID.
    pub attendee_id: String,
    /// Tier the ticket was issued against.
    pub tier_name: String,
    /// Price paid, in cents.
    pub price_cents: i64,
    /// Price formatted for display, e.g. `"$25.00"` or `"Free"`.
    pub price_display: String,
    /// `issued` or `cancelled`.
    pub status: String,
    /// Issue timestamp (RFC 3339).
    pub issued_at: String,
}

impl TicketResponse {
    pub(crate) fn from_row(row: TicketRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            attendee_id: row.attendee_id,
            tier_name: row.tier_name,
            price_display: format_price_cents(row.price_cents),
            price_cents: row.price_cents,
            status: row.status,
            issued_at: row.issued_at,
        }
    }
}

/// POST /events/{id}/tickets
pub async fn issue_ticket(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<IssueTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let result = state.store.issue_ticket(&IssueTicket {
        event_id: &event_id,
        attendee_id: &req.attendee_id,
        tier_name: req.tier_name.as_deref().unwrap_or("GA"),
        price_cents: req.price_cents.unwrap_or(0),
    });

    match result {
        Ok(ticket) => {
            counter!(TICKETS_ISSUED_TOTAL).increment(1);
            Ok((StatusCode::CREATED, Json(TicketResponse::from_row(ticket))))
        }
        Err(err @ StoreError::SoldOut(_)) => {
            counter!(TICKETS_SOLD_OUT_TOTAL).increment(1);
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state.store.get_ticket(&ticket_id)?;
    Ok(Json(TicketResponse::from_row(ticket)))
}

/// DELETE /tickets/{id} — cancel, keeping the row for history.
pub async fn cancel_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state.store.cancel_ticket(&ticket_id)?;
    counter!(TICKETS_CANCELLED_TOTAL).increment(1);
    Ok(Json(TicketResponse::from_row(ticket)))
}

/// GET /users/{user_id}/tickets
pub async fn list_user_tickets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let tickets = state.store.list_tickets_by_user(&user_id)?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from_row).collect()))
}

/// GET /events/{id}/tickets
pub async fn list_event_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    // 404 for an unknown event, not an empty list.
    let _ = state.store.get_event(&event_id)?;
    let tickets = state.store.list_tickets_by_event(&event_id)?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from_row).collect()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
