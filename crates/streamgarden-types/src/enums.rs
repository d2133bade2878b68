//! Enumeration types for the garden overlay.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Flowers
// ---------------------------------------------------------------------------

/// The species of a planted flower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FlowerType {
    /// Tall, rare.
    Rose,
    /// The most common flower; comes in several colours.
    Tulip,
    /// Tall, rare.
    Sunflower,
    /// Common.
    Daisy,
    /// Uncommon.
    Lily,
    /// Mixed bag of wild varieties, one of which (peony) grows tall.
    Wildflower,
}

impl FlowerType {
    /// Every flower type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Rose,
        Self::Tulip,
        Self::Sunflower,
        Self::Daisy,
        Self::Lily,
        Self::Wildflower,
    ];

    /// Lowercase display name, as used on the wire and in chat.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rose => "rose",
            Self::Tulip => "tulip",
            Self::Sunflower => "sunflower",
            Self::Daisy => "daisy",
            Self::Lily => "lily",
            Self::Wildflower => "wildflower",
        }
    }

    /// Parse a chat argument such as `Sunflower` or `roses`.
    pub fn from_name(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        let singular = lowered.strip_suffix("ies").map_or_else(
            || lowered.strip_suffix('s').unwrap_or(&lowered).to_owned(),
            |stem| format!("{stem}y"),
        );
        Self::ALL
            .into_iter()
            .find(|t| t.name() == lowered || t.name() == singular)
    }
}

impl core::fmt::Display for FlowerType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Growth phase of a flower. Ordered: a flower only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum GrowthStage {
    /// First 45 seconds.
    Sprout,
    /// 45 to 60 seconds.
    Blooming,
    /// 60 to 90 seconds. The species becomes recognisable here.
    Small,
    /// 90 to 150 seconds.
    Medium,
    /// 150 seconds and beyond.
    FullyMature,
}

/// Why flowers left the garden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum RemovalCause {
    /// Picked by their planter.
    Picked {
        /// Who picked them.
        username: String,
    },
    /// Cleared by a moderator because they were older than 30 minutes.
    Expired,
    /// Eaten during a bunny visit.
    EatenByBunny,
}

// ---------------------------------------------------------------------------
// Bunny
// ---------------------------------------------------------------------------

/// Phase of an active bunny visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum BunnyPhase {
    /// Hopping in, fading from transparent over the first second.
    Arriving,
    /// Nibbling flowers (or weeds).
    Eating,
    /// Bouncing around before leaving.
    Playing,
}

// ---------------------------------------------------------------------------
// Celebrations
// ---------------------------------------------------------------------------

/// A celebratory overlay. Each kind is an independent show/fade/hide cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum CelebrationKind {
    /// 10 lifetime picks.
    Flower,
    /// 20 lifetime picks.
    GardenLegend,
    /// 30 lifetime picks.
    MasterGardener,
    /// 40 lifetime picks.
    GardenElite,
    /// 50 lifetime picks; also records a guardian.
    NaturesGuardian,
    /// Someone tried to plant in a full garden.
    BeeParade,
    /// 60 lifetime picks; plays the embedded video.
    EasterEgg,
}

impl CelebrationKind {
    /// Every celebration kind.
    pub const ALL: [Self; 7] = [
        Self::Flower,
        Self::GardenLegend,
        Self::MasterGardener,
        Self::GardenElite,
        Self::NaturesGuardian,
        Self::BeeParade,
        Self::EasterEgg,
    ];

    /// The overlay event name that shows this celebration.
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Flower => "showFlowerCelebration",
            Self::GardenLegend => "showGardenLegendCelebration",
            Self::MasterGardener => "showMasterGardener",
            Self::GardenElite => "showGardenElite",
            Self::NaturesGuardian => "showNaturesGuardian",
            Self::BeeParade => "showBeeParadeCelebration",
            Self::EasterEgg => "showEasterEgg",
        }
    }

    /// Parse a celebration from its camelCase wire name.
    pub fn from_name(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| {
            serde_json::to_value(kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_lowercase))
                .is_some_and(|name| name == wanted)
        })
    }
}

/// Visible phase of a celebration overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CelebrationPhase {
    /// Fully on screen.
    Showing,
    /// Fading out.
    Fading,
}

/// Where the easter egg banner sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum BannerPosition {
    /// Centred over the video.
    Center,
    /// Tucked to the side after the first 30 seconds.
    Side,
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// Tone of an activity banner. Determines how long it stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ActivityKind {
    /// Routine confirmation (planted, watered, picked).
    Info,
    /// A refused command.
    Warning,
    /// A milestone or bunny announcement.
    Celebration,
}

/// Why the garden refused a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// The user already has two flowers younger than five minutes.
    AllowanceUsed,
    /// The garden holds its maximum number of flowers.
    GardenFull,
    /// The user has no flowers in the garden.
    NoFlowersPlanted,
    /// The user's flowers are still growing.
    NoneMature,
    /// The user's mature flowers are younger than five minutes.
    NoneOldEnough,
    /// No flower is older than thirty minutes.
    NoOldFlowers,
    /// A bunny is already visiting.
    BunnyAlreadyVisiting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flower_type_parses_plural_and_case() {
        assert_eq!(FlowerType::from_name("Sunflower"), Some(FlowerType::Sunflower));
        assert_eq!(FlowerType::from_name("roses"), Some(FlowerType::Rose));
        assert_eq!(FlowerType::from_name("daisies"), Some(FlowerType::Daisy));
        assert_eq!(FlowerType::from_name("lilies"), Some(FlowerType::Lily));
        assert_eq!(FlowerType::from_name("cactus"), None);
    }

    #[test]
    fn growth_stage_is_ordered() {
        assert!(GrowthStage::Sprout < GrowthStage::Blooming);
        assert!(GrowthStage::Medium < GrowthStage::FullyMature);
    }

    #[test]
    fn growth_stage_wire_name() {
        let json = serde_json::to_string(&GrowthStage::FullyMature).ok();
        assert_eq!(json.as_deref(), Some("\"fully-mature\""));
    }

    #[test]
    fn celebration_parses_wire_name() {
        assert_eq!(
            CelebrationKind::from_name("naturesGuardian"),
            Some(CelebrationKind::NaturesGuardian)
        );
        assert_eq!(CelebrationKind::from_name("beeparade"), Some(CelebrationKind::BeeParade));
        assert_eq!(CelebrationKind::from_name("confetti"), None);
    }

    #[test]
    fn removal_cause_is_tagged() {
        let json = serde_json::to_value(RemovalCause::Picked {
            username: "fern".to_owned(),
        })
        .ok();
        assert_eq!(
            json,
            Some(serde_json::json!({"kind": "picked", "username": "fern"}))
        );
    }
}
