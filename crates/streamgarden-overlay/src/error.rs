//! Error types for the overlay API.
//!
//! [`OverlayError`] unifies all failure modes into a single enum that can
//! be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The body
//! is always `{"error": <message>, "status": <code>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use streamgarden_chat::BotError;
use streamgarden_store::StoreError;

/// Errors that can occur in the overlay API layer.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// A server-held secret or credential is not configured.
    #[error("not configured: {0}")]
    Unconfigured(String),

    /// The guardian store failed.
    #[error("guardian store error: {0}")]
    Store(#[from] StoreError),

    /// The chat bot call failed.
    #[error("chat bot error: {0}")]
    Bot(#[from] BotError),

    /// The garden driver is no longer accepting commands.
    #[error("garden is not accepting commands")]
    QueueClosed,
}

impl OverlayError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::EmptyUsername) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::CountOutOfRange(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unconfigured(_)
            | Self::Store(_)
            | Self::Bot(BotError::MissingCredentials { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Bot(BotError::Upstream { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Bot(BotError::Http(_)) => StatusCode::BAD_GATEWAY,
            Self::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for OverlayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, status = status.as_u16(), "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
