//! Axum router construction for the overlay server.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{guardians, handlers, streamelements, ws};

/// Build the complete router.
///
/// - `GET /` -- HTML status page
/// - `GET /ws/events` -- `WebSocket` event stream
/// - `GET /api/garden` -- latest garden view
/// - `POST /api/events` -- queue a command envelope
/// - `POST /api/chat` -- run a chat line
/// - `GET /guardians`, `POST /guardians/add` -- guardian store
/// - `GET /streamelements-token` -- account token relay
/// - `POST /post-trick` -- announce a trick in chat
///
/// CORS allows any origin: the overlay is loaded by the streaming
/// software from a local file or another port.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws/events", get(ws::ws_events))
        .route("/api/garden", get(handlers::get_garden))
        .route("/api/events", post(handlers::post_event))
        .route("/api/chat", post(handlers::post_chat))
        .route("/guardians", get(guardians::list_guardians))
        .route("/guardians/add", post(guardians::add_guardian))
        .route("/streamelements-token", get(streamelements::get_token))
        .route("/post-trick", post(streamelements::post_trick))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
