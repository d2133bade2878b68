//! StreamElements chat bot client.
//!
//! The DJ wheel posts the trick it landed on to chat through the bot:
//! `POST {api_base}/bot/{channel_id}/say` with a bearer JWT and a
//! `{"message": ...}` body.

use serde::{Deserialize, Serialize};
use streamgarden_core::config::StreamElementsConfig;
use tracing::{info, warn};

use crate::error::BotError;

/// Longest message chat will accept.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// A DJ trick, as sent by the wheel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    /// Trick name.
    pub name: String,
    /// What the trick is.
    pub definition: String,
}

/// The chat line announcing a trick, cut to [`MAX_MESSAGE_CHARS`].
pub fn format_trick_message(trick: &Trick) -> String {
    let full = format!("DJ Trick: {} - {}", trick.name.trim(), trick.definition.trim());
    if full.chars().count() <= MAX_MESSAGE_CHARS {
        return full;
    }
    full.chars().take(MAX_MESSAGE_CHARS).collect()
}

/// Client for the bot `say` endpoint.
#[derive(Debug, Clone)]
pub struct BotClient {
    client: reqwest::Client,
    api_base: String,
    jwt_token: String,
    channel_id: String,
}

impl BotClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::MissingCredentials`] if the JWT or channel id is
    /// absent or blank.
    pub fn from_config(config: &StreamElementsConfig) -> Result<Self, BotError> {
        let jwt_token = non_blank(config.jwt_token.as_deref())
            .ok_or(BotError::MissingCredentials { missing: "jwt_token" })?;
        let channel_id = non_blank(config.channel_id.as_deref())
            .ok_or(BotError::MissingCredentials { missing: "channel_id" })?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            jwt_token: jwt_token.to_owned(),
            channel_id: channel_id.to_owned(),
        })
    }

    /// Post `message` to chat as the bot.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Http`] if the request fails and
    /// [`BotError::Upstream`] if the API answers with a non-success status.
    pub async fn say(&self, message: &str) -> Result<(), BotError> {
        let url = format!("{}/bot/{}/say", self.api_base, self.channel_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.jwt_token)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            warn!(status = status.as_u16(), "bot API rejected message");
            return Err(BotError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        info!(channel = %self.channel_id, "bot message posted");
        Ok(())
    }

    /// Announce a trick in chat.
    ///
    /// # Errors
    ///
    /// See [`BotClient::say`].
    pub async fn post_trick(&self, trick: &Trick) -> Result<(), BotError> {
        self.say(&format_trick_message(trick)).await
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, String, serde_json::Value)>>>;

    async fn say(
        State(seen): State<Seen>,
        Path(channel): Path<String>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        seen.lock().unwrap().push((channel.clone(), auth, body));
        if channel == "broken" {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::OK
        }
    }

    async fn mock_api() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/bot/{channel}/say", post(say))
            .with_state(Arc::clone(&seen));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}"), seen)
    }

    fn config(api_base: &str, channel: Option<&str>) -> StreamElementsConfig {
        StreamElementsConfig {
            api_base: api_base.to_owned(),
            jwt_token: Some("jwt-123".to_owned()),
            channel_id: channel.map(str::to_owned),
            account_token: None,
        }
    }

    #[test]
    fn trick_message_format() {
        let trick = Trick {
            name: "Chirp".to_owned(),
            definition: "Short scratch on the crossfader".to_owned(),
        };
        assert_eq!(
            format_trick_message(&trick),
            "DJ Trick: Chirp - Short scratch on the crossfader"
        );

        let long = Trick {
            name: "Flare".to_owned(),
            definition: "x".repeat(600),
        };
        assert_eq!(format_trick_message(&long).chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn missing_credentials_are_reported() {
        let err = BotClient::from_config(&config("http://localhost", None)).unwrap_err();
        assert!(matches!(
            err,
            BotError::MissingCredentials {
                missing: "channel_id"
            }
        ));

        let mut blank = config("http://localhost", Some("chan"));
        blank.jwt_token = Some("  ".to_owned());
        assert!(BotClient::from_config(&blank).is_err());
    }

    #[tokio::test]
    async fn posts_message_with_bearer_token() {
        let (base, seen) = mock_api().await;
        let bot = BotClient::from_config(&config(&base, Some("chan-1"))).unwrap();
        bot.post_trick(&Trick {
            name: "Transform".to_owned(),
            definition: "Rhythmic fader cuts".to_owned(),
        })
        .await
        .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        let (channel, auth, body) = &seen[0];
        assert_eq!(channel, "chan-1");
        assert_eq!(auth, "Bearer jwt-123");
        assert_eq!(body["message"], "DJ Trick: Transform - Rhythmic fader cuts");
    }

    #[tokio::test]
    async fn upstream_status_is_propagated() {
        let (base, _) = mock_api().await;
        let bot = BotClient::from_config(&config(&base, Some("broken"))).unwrap();
        let err = bot.say("hello").await.unwrap_err();
        assert!(matches!(err, BotError::Upstream { status: 502, .. }));
    }
}
