//! Core entity structs shared between the garden engine, the overlay API,
//! and the guardian store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ActivityKind, BannerPosition, BunnyPhase, CelebrationKind, CelebrationPhase, FlowerType,
    GrowthStage,
};
use crate::ids::{FlowerId, GuardianId};

// ---------------------------------------------------------------------------
// Flower
// ---------------------------------------------------------------------------

/// A flower planted in the community garden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Flower {
    /// Unique id (planter + creation millis, or a test tag).
    pub id: FlowerId,
    /// Species, drawn from the rarity table at plant time.
    #[serde(rename = "type")]
    pub flower_type: FlowerType,
    /// Optional sub-variant (tulip colour, wildflower image key). Never changes.
    pub specific_type: Option<String>,
    /// Horizontal placement in `[0, 100]`.
    pub x: f64,
    /// Username of the planter, as supplied by chat.
    pub planted_by: String,
    /// Creation time. The growth stage is a pure function of this.
    pub planted_at: DateTime<Utc>,
    /// Cached growth stage, refreshed by the growth tick.
    pub stage: GrowthStage,
    /// Last time anyone watered the garden while this flower was in it.
    pub last_watered: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Bunny
// ---------------------------------------------------------------------------

/// An active bunny visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BunnyVisit {
    /// Current phase of the visit.
    pub phase: BunnyPhase,
    /// When the visit began. Phases are measured from here.
    pub started_at: DateTime<Utc>,
    /// Horizontal position in `[0, 100]`.
    pub position: f64,
    /// Flowers the bunny intends to eat (0 for a weeds visit).
    pub eaten_count: u32,
    /// Render opacity, ramping from 0 to 1 during the first second.
    pub opacity: f64,
    /// Whether the eating phase has already removed its flowers.
    pub has_eaten: bool,
}

impl BunnyVisit {
    /// A visit with nothing to eat nibbles weeds instead.
    pub const fn is_weeds_visit(&self) -> bool {
        self.eaten_count == 0
    }
}

// ---------------------------------------------------------------------------
// Transient overlay state
// ---------------------------------------------------------------------------

/// A transient banner shown at the bottom of the garden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActivityMessage {
    /// Text shown to viewers.
    pub text: String,
    /// Tone of the message.
    pub kind: ActivityKind,
    /// When the banner disappears.
    pub expires_at: DateTime<Utc>,
}

/// Short-lived label naming a flower's owner and species once it is
/// recognisable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RevealAnnotation {
    /// The flower being revealed.
    pub flower_id: FlowerId,
    /// Label text.
    pub text: String,
    /// When the label disappears.
    pub expires_at: DateTime<Utc>,
}

/// A celebration currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CelebrationView {
    /// Which celebration.
    pub kind: CelebrationKind,
    /// Who earned it.
    pub username: String,
    /// Showing or fading.
    pub phase: CelebrationPhase,
    /// End of the current phase.
    pub until: DateTime<Utc>,
    /// Banner placement, for celebrations that move their banner.
    pub banner: Option<BannerPosition>,
}

/// One row of the picking leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// The gardener.
    pub username: String,
    /// Flowers picked this session.
    pub picked: u32,
}

/// Everything a freshly connected overlay needs to draw the garden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GardenSnapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// All flowers, in planting order.
    pub flowers: Vec<Flower>,
    /// Cosmetic water level, 0 to 100.
    pub water_level: u32,
    /// Cosmetic colour saturation percentage, 20 to 100.
    pub saturation: f64,
    /// End of the current rain shower, if it is raining.
    pub raining_until: Option<DateTime<Utc>>,
    /// The active bunny visit, if any.
    pub bunny: Option<BunnyVisit>,
    /// The current activity banner, if any.
    pub activity: Option<ActivityMessage>,
    /// Reveal labels still on screen.
    pub reveals: Vec<RevealAnnotation>,
    /// Celebrations still on screen.
    pub celebrations: Vec<CelebrationView>,
    /// Lifetime picked totals by user.
    pub picked_totals: BTreeMap<String, u32>,
}

// ---------------------------------------------------------------------------
// Guardian
// ---------------------------------------------------------------------------

/// A user whose lifetime picked total has reached 50. Stored durably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Guardian {
    /// Row id.
    pub id: GuardianId,
    /// Unique username.
    pub username: String,
    /// Highest lifetime picked total recorded for this user.
    pub flower_count: u32,
    /// When the guardian was first recorded.
    pub achieved_at: DateTime<Utc>,
}
