//! Overlay API server for Streamgarden.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/events`) streaming garden events as
//!   `{event, detail}` envelopes via [`tokio::sync::broadcast`]
//! - **Command endpoints** (`/api/events`, `/api/chat`) feeding the garden
//!   driver's queue
//! - **Guardian endpoints** (`/guardians`, `/guardians/add`)
//! - **StreamElements relays** (`/streamelements-token`, `/post-trick`)
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The server never touches the engine. The garden driver owns it, drains
//! [`AppState::commands`], broadcasts the resulting events and publishes a
//! fresh [`GardenView`] for REST reads.

pub mod error;
pub mod guardians;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod streamelements;
pub mod ws;

pub use error::OverlayError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_overlay};
pub use state::{AppState, ChatOutcome, GardenView};
