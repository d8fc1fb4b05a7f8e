use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use slotswap_core::{User, UserId};

use crate::error::ApiError;
use crate::extract::{parse_id, Actor, ApiJson};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(register_user))
        .route("/api/users/{id}", get(get_user))
}

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    /// Opaque secret, hashed by the caller.
    credential: String,
}

/// POST /api/users - Register a user.
async fn register_user(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    state.check_register(addr.ip())?;
    let user = state
        .engine
        .register_user(&req.name, &req.email, &req.credential)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/{id} - Look up a user.
async fn get_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    state.check_read(actor.id())?;
    let user_id: UserId = parse_id(&id, "user")?;
    Ok(Json(state.engine.get_user(user_id)?))
}
