//! Identifier types.
//!
//! Guardians are durable rows and get a UUID v7 wrapper. Flowers live only
//! in memory and carry a readable string id: the planter plus the creation
//! timestamp in milliseconds, or a `test-<n>` tag for spawned test flowers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a guardian record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GuardianId(pub Uuid);

impl GuardianId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for GuardianId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for GuardianId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for GuardianId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Identifier for a flower in the garden.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FlowerId(pub String);

impl FlowerId {
    /// Id for a flower planted from chat: `<planter>-<unix millis>`.
    pub fn planted(username: &str, planted_at: DateTime<Utc>) -> Self {
        Self(format!("{username}-{}", planted_at.timestamp_millis()))
    }

    /// Id for a flower created by a moderator test spawn.
    pub fn test(sequence: u32) -> Self {
        Self(format!("test-{sequence}"))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FlowerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
