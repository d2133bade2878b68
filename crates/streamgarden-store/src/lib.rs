//! Guardian store for the Streamgarden overlay.
//!
//! A guardian is a viewer whose lifetime picked total has reached 50. The
//! store keeps one row per username and only ever raises the recorded
//! count. Two backends share the same rules:
//!
//! - [`PgGuardianStore`] on `PostgreSQL`, used when `DATABASE_URL` is set.
//! - [`MemoryGuardianStore`] in process memory, for tests and local runs.
//!
//! [`GuardianBackend`] picks one at startup.
//!
//! # Modules
//!
//! - [`backend`] -- Enum dispatch over the two stores
//! - [`error`] -- Shared error types
//! - [`guardian_store`] -- The `guardians` table
//! - [`memory`] -- In-memory store
//! - [`postgres`] -- Connection pool and migrations

pub mod backend;
pub mod error;
pub mod guardian_store;
pub mod memory;
pub mod postgres;

pub use backend::GuardianBackend;
pub use error::StoreError;
pub use guardian_store::{DEFAULT_FLOWER_COUNT, GuardianRow, PgGuardianStore, UpsertOutcome};
pub use memory::MemoryGuardianStore;
pub use postgres::{PostgresConfig, PostgresPool};
