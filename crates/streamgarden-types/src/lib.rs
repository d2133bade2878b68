//! Shared type definitions for the Streamgarden overlay.
//!
//! This crate is the single source of truth for the types exchanged between
//! the garden engine, the overlay server, the chat command source and the
//! guardian store. Types flow downstream to `TypeScript` via `ts-rs` for the
//! browser overlay.
//!
//! # Modules
//!
//! - [`ids`] -- Flower and guardian identifiers
//! - [`enums`] -- Flower species, growth stages, celebrations, rejections
//! - [`structs`] -- Flowers, bunny visits, banners, guardians, snapshots
//! - [`protocol`] -- Inbound [`Command`]s and outbound [`GardenEvent`]s

pub mod enums;
pub mod ids;
pub mod protocol;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActivityKind, BannerPosition, BunnyPhase, CelebrationKind, CelebrationPhase, FlowerType,
    GrowthStage, RejectionReason, RemovalCause,
};
pub use ids::{FlowerId, GuardianId};
pub use protocol::{Command, EventEnvelope, GardenEvent};
pub use structs::{
    ActivityMessage, BunnyVisit, CelebrationView, Flower, GardenSnapshot, Guardian,
    LeaderboardEntry, RevealAnnotation,
};
