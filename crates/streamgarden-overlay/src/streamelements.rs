//! StreamElements relay endpoints.
//!
//! `GET /streamelements-token` hands the server-held account token to the
//! overlay so it can open its own push-event subscription, and
//! `POST /post-trick` announces a wheel result in chat through the bot.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use streamgarden_chat::Trick;

use crate::error::OverlayError;
use crate::state::AppState;

/// Response of `GET /streamelements-token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The account token.
    pub token: String,
}

/// Body of `POST /post-trick`.
#[derive(Debug, Deserialize)]
pub struct PostTrickRequest {
    /// The trick to announce.
    pub trick: Trick,
}

/// Relay the configured account token.
///
/// # Route
///
/// `GET /streamelements-token`
///
/// # Errors
///
/// Returns [`OverlayError::Unconfigured`] (500) if no token is set.
pub async fn get_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TokenResponse>, OverlayError> {
    let token = state
        .streamelements
        .account_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OverlayError::Unconfigured("StreamElements account token".to_owned()))?;
    Ok(Json(TokenResponse {
        token: token.to_owned(),
    }))
}

/// Post a trick announcement to chat.
///
/// # Route
///
/// `POST /post-trick`
///
/// # Errors
///
/// Returns [`OverlayError::Unconfigured`] (500) without bot credentials,
/// and [`OverlayError::Bot`] carrying the upstream status when the bot API
/// refuses the message.
pub async fn post_trick(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PostTrickRequest>,
) -> Result<Json<serde_json::Value>, OverlayError> {
    let bot = state
        .bot
        .as_ref()
        .ok_or_else(|| OverlayError::Unconfigured("chat bot credentials".to_owned()))?;
    bot.post_trick(&request.trick).await?;
    tracing::info!(trick = %request.trick.name, "trick posted to chat");
    Ok(Json(serde_json::json!({ "success": true })))
}
