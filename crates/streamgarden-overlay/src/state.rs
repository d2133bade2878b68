//! Shared application state for the overlay API server.
//!
//! [`AppState`] is the event bus between the HTTP surface and the garden
//! driver: commands travel inward over an `mpsc` queue, events travel
//! outward over a `broadcast` channel, and the driver publishes the latest
//! [`GardenView`] after every change so REST reads never touch the engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use streamgarden_chat::{BotClient, ChatCommandSource, ChatError, ChatRole};
use streamgarden_core::config::{ChatConfig, StreamElementsConfig};
use streamgarden_store::GuardianBackend;
use streamgarden_types::{Command, EventEnvelope, GardenEvent, GardenSnapshot};
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};

use crate::error::OverlayError;

/// Capacity of the outbound event channel.
///
/// A subscriber that falls further behind than this receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
const BROADCAST_CAPACITY: usize = 256;

/// Capacity of the inbound command queue.
pub const COMMAND_QUEUE_CAPACITY: usize = 128;

/// What the overlay should currently draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenView {
    /// Whether a garden is running.
    pub visible: bool,
    /// Latest snapshot, present while the garden is visible.
    pub snapshot: Option<GardenSnapshot>,
}

/// What happened to a chat line.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The line became a command, named by its protocol name.
    Queued(&'static str),
    /// The line was refused.
    Refused(ChatError),
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// Outbound event envelopes.
    pub tx: broadcast::Sender<EventEnvelope>,
    /// Inbound command queue, drained by the garden driver.
    pub commands: mpsc::Sender<Command>,
    /// The latest garden view (written by the driver).
    pub garden: Arc<RwLock<GardenView>>,
    /// Durable guardian records.
    pub guardians: GuardianBackend,
    /// Chat parsing, role gating and cooldowns.
    pub chat: Mutex<ChatCommandSource>,
    /// Token relay and bot settings.
    pub streamelements: StreamElementsConfig,
    /// Chat bot, present when its credentials are configured.
    pub bot: Option<BotClient>,
}

impl AppState {
    /// Create the state plus the receiving end of the command queue.
    ///
    /// The bot client is built from `streamelements`; missing credentials
    /// leave it unset and are reported when `/post-trick` is called.
    pub fn new(
        guardians: GuardianBackend,
        chat: &ChatConfig,
        streamelements: StreamElementsConfig,
    ) -> (Self, mpsc::Receiver<Command>) {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (commands, queue) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let bot = match BotClient::from_config(&streamelements) {
            Ok(bot) => Some(bot),
            Err(e) => {
                tracing::info!(reason = %e, "chat bot disabled");
                None
            }
        };
        let state = Self {
            tx,
            commands,
            garden: Arc::new(RwLock::new(GardenView::default())),
            guardians,
            chat: Mutex::new(ChatCommandSource::new(chat)),
            streamelements,
            bot,
        };
        (state, queue)
    }

    /// Subscribe to the outbound event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Publish an event to every connected overlay.
    ///
    /// Returns the number of receivers reached; 0 when nobody is
    /// connected, which is not an error.
    pub fn broadcast(&self, event: &GardenEvent) -> usize {
        match event.envelope() {
            Ok(envelope) => self.tx.send(envelope).unwrap_or(0),
            Err(e) => {
                tracing::warn!(event = event.name(), error = %e, "failed to encode event");
                0
            }
        }
    }

    /// Queue a command for the garden driver.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::QueueClosed`] if the driver has stopped.
    pub async fn submit(&self, command: Command) -> Result<(), OverlayError> {
        if self.commands.send(command).await.is_err() {
            return Err(OverlayError::QueueClosed);
        }
        Ok(())
    }

    /// Turn a chat line into a queued command.
    ///
    /// Refusals are part of normal chat traffic and come back as
    /// [`ChatOutcome::Refused`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::QueueClosed`] if the driver has stopped.
    pub async fn submit_chat(
        &self,
        username: &str,
        role: ChatRole,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<ChatOutcome, OverlayError> {
        let parsed = self.chat.lock().await.process(username, role, message, now);
        match parsed {
            Ok(command) => {
                let name = command.name();
                self.submit(command).await?;
                Ok(ChatOutcome::Queued(name))
            }
            Err(refused) => Ok(ChatOutcome::Refused(refused)),
        }
    }

    /// Replace the published garden view.
    pub async fn publish_view(&self, view: GardenView) {
        *self.garden.write().await = view;
    }

    /// A copy of the published garden view.
    pub async fn view(&self) -> GardenView {
        self.garden.read().await.clone()
    }
}
