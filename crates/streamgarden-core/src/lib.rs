//! Garden engine, celebrations, and configuration for the Streamgarden
//! overlay.
//!
//! Everything here is synchronous and free of I/O. The host feeds the
//! engine [`Command`]s and periodic ticks, and forwards the returned
//! [`GardenEvent`]s to the overlay.
//!
//! # Modules
//!
//! - [`activity`] -- The transient activity banner.
//! - [`bunny`] -- Bunny visit timeline and appetite.
//! - [`celebration`] -- Per-kind show/fade/hide celebration state machines.
//! - [`config`] -- Configuration loading from `streamgarden.yaml`.
//! - [`engine`] -- [`GardenEngine`], the owned garden state and reducer.
//! - [`flower`] -- Growth stages, the rarity table, and placement.
//! - [`random`] -- [`RandomSource`] and its production and scripted sources.
//! - [`schedule`] -- Absolute-time periodic jobs.
//! - [`tally`] -- Per-user counters and milestone detection.
//! - [`watering`] -- Water level, rain, and saturation decay.
//!
//! [`Command`]: streamgarden_types::Command
//! [`GardenEvent`]: streamgarden_types::GardenEvent
//! [`GardenEngine`]: engine::GardenEngine
//! [`RandomSource`]: random::RandomSource

pub mod activity;
pub mod bunny;
pub mod celebration;
pub mod config;
pub mod engine;
pub mod flower;
pub mod random;
pub mod schedule;
pub mod tally;
pub mod watering;

pub use config::OverlayConfig;
pub use engine::GardenEngine;
pub use random::{RandomSource, RngSource, ScriptedRandom};
