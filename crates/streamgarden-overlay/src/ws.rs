//! `WebSocket` handler for the overlay event stream.
//!
//! Clients connect to `GET /ws/events`. The first frame is a
//! `gardenSnapshot` envelope carrying the current [`GardenView`], so a
//! browser source that reloads mid-stream redraws the garden without
//! waiting for the next event. After that every garden event arrives as a
//! JSON `{event, detail}` text frame. A client that falls behind skips the
//! lagged events and is sent a fresh snapshot to re-sync.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use streamgarden_types::EventEnvelope;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, GardenView};

/// Protocol name of the snapshot frame.
pub const SNAPSHOT_EVENT: &str = "gardenSnapshot";

/// Wrap a garden view in its wire envelope.
///
/// # Errors
///
/// Returns the serializer error if the view cannot be encoded.
pub fn snapshot_envelope(view: &GardenView) -> Result<EventEnvelope, serde_json::Error> {
    Ok(EventEnvelope {
        event: SNAPSHOT_EVENT.to_owned(),
        detail: serde_json::to_value(view)?,
    })
}

/// Upgrade to a `WebSocket` and start streaming events.
///
/// # Route
///
/// `GET /ws/events`
pub async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_garden(socket, state))
}

/// Why a client stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hangup {
    Client,
    Bus,
}

async fn stream_garden(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the view so nothing published in between is lost.
    let mut rx = state.subscribe();
    if send_snapshot(&mut socket, &state).await.is_err() {
        return;
    }
    debug!("overlay client connected");

    let hangup = loop {
        tokio::select! {
            result = rx.recv() => match result {
                Ok(envelope) => {
                    if send_envelope(&mut socket, &envelope).await.is_err() {
                        break Hangup::Client;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "overlay client lagged, re-syncing");
                    if send_snapshot(&mut socket, &state).await.is_err() {
                        break Hangup::Client;
                    }
                }
                Err(RecvError::Closed) => break Hangup::Bus,
            },
            frame = socket.recv() => match frame {
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break Hangup::Client;
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break Hangup::Client,
                // Commands come in over POST, not the socket.
                Some(Ok(_)) => {}
            },
        }
    };
    debug!(?hangup, "overlay stream ended");
}

async fn send_snapshot(socket: &mut WebSocket, state: &AppState) -> Result<(), axum::Error> {
    match snapshot_envelope(&state.view().await) {
        Ok(envelope) => send_envelope(socket, &envelope).await,
        Err(e) => {
            warn!("failed to encode garden snapshot: {e}");
            Ok(())
        }
    }
}

async fn send_envelope(socket: &mut WebSocket, envelope: &EventEnvelope) -> Result<(), axum::Error> {
    match serde_json::to_string(envelope) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(event = %envelope.event, "failed to encode envelope: {e}");
            Ok(())
        }
    }
}
