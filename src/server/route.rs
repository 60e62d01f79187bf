use crate::server::{websocket_listener, SignalRouter};
use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[instrument(skip(router))]
pub fn create_signal_route(path: &str, router: SignalRouter) -> Router {
    debug!("Creating signal route");
    Router::new()
        .route(path, get(websocket_listener::handle_websocket))
        .route("/health", get(health))
        .with_state(router)
}

async fn health(State(router): State<SignalRouter>) -> Json<Value> {
    let registry = router.registry();
    Json(json!({
        "status": "ok",
        "rooms": registry.room_count().await,
        "sessions": registry.session_count().await,
    }))
}
