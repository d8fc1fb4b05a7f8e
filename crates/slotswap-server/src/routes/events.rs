use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use slotswap_core::{Event, EventId, EventStatus};
use slotswap_engine::DetailedEvent;

use crate::error::ApiError;
use crate::extract::{parse_id, Actor, ApiJson};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_own_events).post(create_event))
        .route("/api/events/{id}/status", put(update_status))
        .route("/api/swappable-slots", get(list_swappable_slots))
        .route("/api/swappable-slots/mine", get(list_own_swappable_slots))
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    title: String,
    /// RFC 3339 timestamp.
    start_time: String,
    end_time: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    status: EventStatus,
}

/// POST /api/events - Create a busy event for the caller.
async fn create_event(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    state.check_write(actor.id())?;
    let event = state
        .engine
        .create_event_iso(actor.id(), &req.title, &req.start_time, &req.end_time)?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events - The caller's events, earliest first.
async fn list_own_events(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<Event>>, ApiError> {
    state.check_read(actor.id())?;
    Ok(Json(state.engine.list_own_events(actor.id())?))
}

/// PUT /api/events/{id}/status - Toggle between BUSY and SWAPPABLE.
async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Event>, ApiError> {
    state.check_write(actor.id())?;
    let event_id: EventId = parse_id(&id, "event")?;
    let event = state
        .engine
        .set_event_status(event_id, actor.id(), req.status)?;
    Ok(Json(event))
}

/// GET /api/swappable-slots - Other users' slots on offer.
async fn list_swappable_slots(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<DetailedEvent>>, ApiError> {
    state.check_read(actor.id())?;
    Ok(Json(state.engine.list_swappable_slots(actor.id())?))
}

/// GET /api/swappable-slots/mine - The caller's slots that can be offered.
async fn list_own_swappable_slots(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<Event>>, ApiError> {
    state.check_read(actor.id())?;
    Ok(Json(state.engine.list_own_swappable_slots(actor.id())?))
}
