//! Event endpoints: create, read, update, delete, and listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eventro_store::repositories::event::{
    CreateEventOptions, ListEventsOptions, UpdateEventOptions,
};
use eventro_store::row_types::EventRow;

use crate::error::ApiError;
use crate::handlers::{parse_array_field, stored_array};
use crate::metrics::{EVENTS_CREATED_TOTAL, EVENTS_DELETED_TOTAL};
use crate::server::AppState;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Organizer user ID.
    pub organizer_id: String,
    /// Event title.
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    /// Venue name.
    #[serde(default)]
    pub venue: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Maximum tickets (0 or absent = unlimited).
    #[serde(default)]
    pub capacity: Option<i64>,
    /// Schedule entries as a stringified JSON array.
    #[serde(default)]
    pub schedules: Option<String>,
    /// Agenda entries as a stringified JSON array.
    #[serde(default)]
    pub agendas: Option<String>,
    /// Ticket tier definitions as a stringified JSON array.
    #[serde(default)]
    pub tickets: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub cover_image_url: Option<String>,
}

/// Request body for `PUT /events/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New venue.
    #[serde(default)]
    pub venue: Option<String>,
    /// New city.
    #[serde(default)]
    pub city: Option<String>,
    /// New capacity.
    #[serde(default)]
    pub capacity: Option<i64>,
    /// Replacement schedules as a stringified JSON array.
    #[serde(default)]
    pub schedules: Option<String>,
    /// Replacement agendas as a stringified JSON array.
    #[serde(default)]
    pub agendas: Option<String>,
    /// Replacement ticket tiers as a stringified JSON array.
    #[serde(default)]
    pub tickets: Option<String>,
    /// New cover image URL.
    #[serde(default)]
    pub cover_image_url: Option<String>,
}

/// Query parameters for `GET /events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by city.
    pub city: Option<String>,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Skip results.
    pub offset: Option<i64>,
}

/// Event response body. The JSON text columns come back as real arrays.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
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
    /// Maximum tickets (0 = unlimited).
    pub capacity: i64,
    /// Schedule entries.
    pub schedules: Value,
    /// Agenda entries.
    pub agendas: Value,
    /// Ticket tier definitions.
    pub tickets: Value,
    /// Issued (non-cancelled) ticket count.
    pub tickets_sold: i64,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl EventResponse {
    pub(crate) fn from_row(row: EventRow) -> Self {
        Self {
            id: row.id,
            organizer_id: row.organizer_id,
            title: row.title,
            description: row.description,
            category: row.category,
            venue: row.venue,
            city: row.city,
            capacity: row.capacity,
            schedules: stored_array(&row.schedules),
            agendas: stored_array(&row.agendas),
            tickets: stored_array(&row.ticket_tiers),
            tickets_sold: row.tickets_sold,
            cover_image_url: row.cover_image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let schedules = match req.schedules.as_deref() {
        Some(raw) => parse_array_field("schedules", raw)?,
        None => "[]".to_string(),
    };
    let agendas = match req.agendas.as_deref() {
        Some(raw) => parse_array_field("agendas", raw)?,
        None => "[]".to_string(),
    };
    let ticket_tiers = match req.tickets.as_deref() {
        Some(raw) => parse_array_field("tickets", raw)?,
        None => "[]".to_string(),
    };

    let event = state.store.create_event(&CreateEventOptions {
        organizer_id: &req.organizer_id,
        title: &req.title,
        description: req.description.as_deref(),
        category: req.category.as_deref(),
        venue: req.venue.as_deref(),
        city: req.city.as_deref(),
        capacity: req.capacity.unwrap_or(0),
        schedules: &schedules,
        agendas: &agendas,
        ticket_tiers: &ticket_tiers,
        cover_image_url: req.cover_image_url.as_deref(),
    })?;

    counter!(EVENTS_CREATED_TOTAL).increment(1);
    Ok((StatusCode::CREATED, Json(EventResponse::from_row(event))))
}

/// GET /events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.store.get_event(&event_id)?;
    Ok(Json(EventResponse::from_row(event)))
}

/// PUT /events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let schedules = req
        .schedules
        .as_deref()
        .map(|raw| parse_array_field("schedules", raw))
        .transpose()?;
    let agendas = req
        .agendas
        .as_deref()
        .map(|raw| parse_array_field("agendas", raw))
        .transpose()?;
    let ticket_tiers = req
        .tickets
        .as_deref()
        .map(|raw| parse_array_field("tickets", raw))
        .transpose()?;

    let event = state.store.update_event(
        &event_id,
        &UpdateEventOptions {
            title: req.title.as_deref(),
            description: req.description.as_deref(),
            category: req.category.as_deref(),
            venue: req.venue.as_deref(),
            city: req.city.as_deref(),
            capacity: req.capacity,
            schedules: schedules.as_deref(),
            agendas: agendas.as_deref(),
            ticket_tiers: ticket_tiers.as_deref(),
            cover_image_url: req.cover_image_url.as_deref(),
        },
    )?;

    Ok(Json(EventResponse::from_row(event)))
}

/// DELETE /events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_event(&event_id)?;
    counter!(EVENTS_DELETED_TOTAL).increment(1);
    Ok(Json(serde_json::json!({ "id": event_id, "deleted": true })))
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = state.store.list_events(&ListEventsOptions {
        organizer_id: None,
        category: query.category.as_deref(),
        city: query.city.as_deref(),
        limit: query.limit,
        offset: query.offset,
    })?;
    Ok(Json(events.into_iter().map(EventResponse::from_row).collect()))
}

/// GET /users/{user_id}/events
pub async fn list_user_events(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = state.store.list_events_by_organizer(&user_id)?;
    Ok(Json(events.into_iter().map(EventResponse::from_row).collect()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
