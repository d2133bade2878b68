//! Guardian store endpoints.
//!
//! `POST /guardians/add` answers the same success shape whether the row was
//! inserted, raised, or left alone; the outcome is only logged.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use streamgarden_types::Guardian;

use crate::error::OverlayError;
use crate::state::AppState;

/// Body of `POST /guardians/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGuardianRequest {
    /// The user to record.
    pub username: String,
    /// Their lifetime picked total; 50 when omitted.
    #[serde(default)]
    pub flower_count: Option<u32>,
}

/// List every guardian, highest count first.
///
/// # Route
///
/// `GET /guardians`
///
/// # Errors
///
/// Returns [`OverlayError::Store`] if the store cannot be read.
pub async fn list_guardians(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Guardian>>, OverlayError> {
    Ok(Json(state.guardians.list().await?))
}

/// Insert a guardian or raise their count.
///
/// # Route
///
/// `POST /guardians/add`
///
/// # Errors
///
/// Returns [`OverlayError::Store`] for a blank username or a failed write.
pub async fn add_guardian(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddGuardianRequest>,
) -> Result<Json<serde_json::Value>, OverlayError> {
    state
        .guardians
        .add(&request.username, request.flower_count)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
