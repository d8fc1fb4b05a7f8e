use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use slotswap_core::{EventId, SwapRequest, SwapRequestId};
use slotswap_engine::SwapRequestLists;

use crate::error::ApiError;
use crate::extract::{parse_id, Actor, ApiJson};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/swap-requests", get(list_swap_requests).post(create_swap_request))
        .route("/api/swap-requests/{id}/response", post(respond_to_swap_request))
}

#[derive(Deserialize)]
pub struct CreateSwapRequest {
    my_slot_id: String,
    their_slot_id: String,
}

#[derive(Deserialize)]
pub struct RespondRequest {
    accepted: bool,
}

/// POST /api/swap-requests - Offer one of the caller's slots for another user's slot.
async fn create_swap_request(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(req): ApiJson<CreateSwapRequest>,
) -> Result<(StatusCode, Json<SwapRequest>), ApiError> {
    state.check_write(actor.id())?;
    let my_slot: EventId = parse_id(&req.my_slot_id, "event")?;
    let their_slot: EventId = parse_id(&req.their_slot_id, "event")?;

    let request = state
        .engine
        .create_swap_request(actor.id(), my_slot, their_slot)?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/swap-requests - Pending requests to and from the caller.
async fn list_swap_requests(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<SwapRequestLists>, ApiError> {
    state.check_read(actor.id())?;
    Ok(Json(state.engine.list_swap_requests(actor.id())?))
}

/// POST /api/swap-requests/{id}/response - Accept or reject an incoming request.
async fn respond_to_swap_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RespondRequest>,
) -> Result<Json<SwapRequest>, ApiError> {
    state.check_write(actor.id())?;
    let request_id: SwapRequestId = parse_id(&id, "swap request")?;
    let request = state
        .engine
        .respond_to_swap_request(request_id, actor.id(), req.accepted)?;
    Ok(Json(request))
}
