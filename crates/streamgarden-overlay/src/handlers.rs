//! Garden endpoint handlers for the overlay server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/garden` | Latest garden view |
//! | `POST` | `/api/events` | Queue a `{event, detail}` command envelope |
//! | `POST` | `/api/chat` | Run a chat line through the command source |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use serde::Deserialize;
use streamgarden_chat::ChatRole;
use streamgarden_types::Command;

use crate::error::OverlayError;
use crate::state::{AppState, ChatOutcome, GardenView};

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Who typed the line.
    pub username: String,
    /// Their chat role; viewers when omitted.
    #[serde(default)]
    pub role: ChatRole,
    /// The raw chat line.
    pub message: String,
}

/// Serve a minimal HTML page showing the garden's state and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.view().await;
    let status = if view.visible { "SHOWN" } else { "HIDDEN" };
    let (flowers, water, saturation) = view.snapshot.as_ref().map_or((0, 0, 0.0), |s| {
        (s.flowers.len(), s.water_level, s.saturation)
    });
    let backend = state.guardians.name();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Streamgarden</title>
    <style>
        body {{
            background: #10170f;
            color: #d7e4cf;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 760px;
            margin: 0 auto;
        }}
        h1 {{ color: #8fd16a; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #182416;
            border: 1px solid #2d4229;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 110px;
        }}
        .metric .label {{ color: #93a58b; font-size: 0.85rem; }}
        .metric .value {{ color: #8fd16a; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #8fd16a; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Streamgarden</h1>
    <p>Garden: <strong>{status}</strong></p>
    <div>
        <div class="metric"><div class="label">Flowers</div><div class="value">{flowers}</div></div>
        <div class="metric"><div class="label">Water</div><div class="value">{water}</div></div>
        <div class="metric"><div class="label">Saturation</div><div class="value">{saturation:.0}%</div></div>
        <div class="metric"><div class="label">Guardians</div><div class="value">{backend}</div></div>
    </div>
    <h2>API</h2>
    <ul>
        <li>GET <a href="/api/garden">/api/garden</a></li>
        <li>GET <a href="/guardians">/guardians</a></li>
        <li>POST /api/events</li>
        <li>POST /api/chat</li>
        <li>WS /ws/events</li>
    </ul>
</body>
</html>"#
    ))
}

/// Return the latest garden view.
///
/// # Route
///
/// `GET /api/garden`
pub async fn get_garden(State(state): State<Arc<AppState>>) -> Json<GardenView> {
    Json(state.view().await)
}

/// Queue a command envelope such as
/// `{"event":"plantFlower","detail":{"username":"fern"}}`.
///
/// # Route
///
/// `POST /api/events`
///
/// # Errors
///
/// Returns [`OverlayError::QueueClosed`] if the garden driver has stopped.
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> Result<impl IntoResponse, OverlayError> {
    let name = command.name();
    state.submit(command).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": true, "command": name })),
    ))
}

/// Run a chat line through parsing, role gating and cooldowns.
///
/// Accepted lines answer `202` with the queued command name; refused lines
/// answer `200` with `accepted: false` and the reason.
///
/// # Route
///
/// `POST /api/chat`
///
/// # Errors
///
/// Returns [`OverlayError::QueueClosed`] if the garden driver has stopped.
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, OverlayError> {
    let outcome = state
        .submit_chat(&request.username, request.role, &request.message, Utc::now())
        .await?;
    let response = match outcome {
        ChatOutcome::Queued(name) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "accepted": true, "command": name })),
        ),
        ChatOutcome::Refused(reason) => (
            StatusCode::OK,
            Json(serde_json::json!({ "accepted": false, "reason": reason.to_string() })),
        ),
    };
    Ok(response)
}
