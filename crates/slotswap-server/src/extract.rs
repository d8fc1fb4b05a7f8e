use std::str::FromStr;

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use slotswap_core::{ErrorKind, User, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated caller, set by the upstream auth layer.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The registered user making the request.
#[derive(Debug, Clone)]
pub struct Actor(pub User);

impl Actor {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", ACTOR_HEADER)))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized(format!("Invalid {} header", ACTOR_HEADER)))?;

        let user_id = UserId::from_str(raw.trim())
            .map_err(|_| ApiError::Unauthorized(format!("Invalid {} header", ACTOR_HEADER)))?;

        match state.engine.get_user(user_id) {
            Ok(user) => Ok(Actor(user)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ApiError::Unauthorized("Unknown user".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// JSON body extractor whose rejections use the API error body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Parse a record id taken from a path segment or request body.
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", what)))
}
