use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct Liveness {
    status: &'static str,
}

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    users: usize,
    events: usize,
    pending_requests: usize,
}

/// GET /health - The process is up.
async fn health() -> Json<Liveness> {
    Json(Liveness { status: "ok" })
}

/// GET /ready - The store answers reads.
async fn ready(State(state): State<AppState>) -> Result<Json<Readiness>, ApiError> {
    let (users, events, pending_requests) = state
        .engine
        .inspect(|t| {
            (
                t.user_count(),
                t.events().count(),
                t.requests().filter(|r| r.is_pending()).count(),
            )
        })
        .map_err(|e| {
            tracing::warn!("Readiness check failed: {}", e);
            ApiError::Unavailable(e.to_string())
        })?;

    Ok(Json(Readiness {
        status: "ok",
        users,
        events,
        pending_requests,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use http_body_util::BodyExt;
    use slotswap_core::{InMemoryStore, StorageError, Store};
    use slotswap_engine::SwapEngine;
    use tower::ServiceExt;

    use crate::config::Config;

    async fn get_ready(engine: SwapEngine) -> (StatusCode, serde_json::Value) {
        let app = routes().with_state(AppState::new(engine, &Config::default()));
        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ready_reports_store_counts() {
        let engine = SwapEngine::in_memory();
        engine.register_user("Ada", "ada@example.com", "hash").unwrap();

        let (status, json) = get_ready(engine).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["users"], 1);
        assert_eq!(json["pending_requests"], 0);
    }

    #[tokio::test]
    async fn test_ready_fails_on_poisoned_store() {
        let store = InMemoryStore::new();
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _: Result<(), StorageError> = store.write(|_| panic!("writer died"));
            })
            .join()
        });

        let (status, json) = get_ready(SwapEngine::new(store)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "unavailable");
    }
}
