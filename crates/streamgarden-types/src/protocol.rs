//! The in-process event protocol.
//!
//! Commands flow from the chat command source (or the overlay's own test
//! buttons) into the garden engine; [`GardenEvent`]s flow back out to the
//! overlay, the celebration layers, and the guardian store. Both travel as
//! `{ "event": <name>, "detail": { ... } }` envelopes, where `<name>` is the
//! stable protocol name (e.g. `plantFlower`, `showNaturesGuardian`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    BannerPosition, BunnyPhase, CelebrationKind, FlowerType, GrowthStage, RejectionReason,
    RemovalCause,
};
use crate::ids::FlowerId;
use crate::structs::{ActivityMessage, BunnyVisit, Flower, LeaderboardEntry, RevealAnnotation};

// ---------------------------------------------------------------------------
// Commands (inbound)
// ---------------------------------------------------------------------------

/// A named command addressed to the garden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "detail")]
#[ts(export, export_to = "bindings/")]
pub enum Command {
    /// `!plant [type]`
    #[serde(rename = "plantFlower")]
    Plant {
        /// Who is planting.
        username: String,
        /// Species requested in chat, if any.
        #[serde(default, rename = "flowerType")]
        flower_type: Option<FlowerType>,
    },
    /// `!water`
    #[serde(rename = "waterGarden")]
    Water {
        /// Who is watering.
        username: String,
    },
    /// `!pick`
    #[serde(rename = "pickFlowers")]
    Pick {
        /// Who is picking.
        username: String,
    },
    /// `!pickold` (moderators)
    #[serde(rename = "pickOldFlowers")]
    PickOld {
        /// The moderator.
        username: String,
    },
    /// `!startgarden` (moderators)
    #[serde(rename = "startGarden")]
    Start {
        /// The moderator.
        username: String,
    },
    /// `!resetgarden` (moderators)
    #[serde(rename = "resetGarden")]
    Reset {
        /// The moderator.
        username: String,
    },
    /// `!hidegarden` (moderators)
    #[serde(rename = "hideGarden")]
    Hide {
        /// The moderator.
        username: String,
    },
    /// `!testspawn` (moderators)
    #[serde(rename = "spawnTestFlowers")]
    SpawnTestFlowers {
        /// The moderator.
        username: String,
    },
    /// `!bunny` (moderators)
    #[serde(rename = "testBunnyVisit")]
    TestBunnyVisit {
        /// The moderator.
        username: String,
    },
    /// `!leaderboard`
    #[serde(rename = "requestLeaderboard")]
    RequestLeaderboard {
        /// Who asked.
        username: String,
    },
    /// Manually fire a celebration overlay (control panel test button).
    #[serde(rename = "triggerCelebration")]
    TriggerCelebration {
        /// Who the celebration is for.
        username: String,
        /// Which celebration.
        kind: CelebrationKind,
    },
}

impl Command {
    /// Stable protocol name of this command.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Plant { .. } => "plantFlower",
            Self::Water { .. } => "waterGarden",
            Self::Pick { .. } => "pickFlowers",
            Self::PickOld { .. } => "pickOldFlowers",
            Self::Start { .. } => "startGarden",
            Self::Reset { .. } => "resetGarden",
            Self::Hide { .. } => "hideGarden",
            Self::SpawnTestFlowers { .. } => "spawnTestFlowers",
            Self::TestBunnyVisit { .. } => "testBunnyVisit",
            Self::RequestLeaderboard { .. } => "requestLeaderboard",
            Self::TriggerCelebration { .. } => "triggerCelebration",
        }
    }

    /// The user who issued the command.
    pub fn username(&self) -> &str {
        match self {
            Self::Plant { username, .. }
            | Self::Water { username }
            | Self::Pick { username }
            | Self::PickOld { username }
            | Self::Start { username }
            | Self::Reset { username }
            | Self::Hide { username }
            | Self::SpawnTestFlowers { username }
            | Self::TestBunnyVisit { username }
            | Self::RequestLeaderboard { username }
            | Self::TriggerCelebration { username, .. } => username,
        }
    }
}

// ---------------------------------------------------------------------------
// Events (outbound)
// ---------------------------------------------------------------------------

/// Something the garden wants the overlay (or the host) to know about.
///
/// Serialized untagged: the JSON is the variant's fields, and the protocol
/// name comes from [`GardenEvent::name`]. Use [`GardenEvent::envelope`] to
/// produce the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum GardenEvent {
    /// The garden was shown and a fresh engine started.
    GardenShown {
        /// Who started it.
        username: String,
    },
    /// The garden was hidden and its engine torn down.
    GardenHidden {
        /// Who hid it.
        username: String,
    },
    /// A moderator wiped the garden.
    GardenReset {
        /// The moderator.
        username: String,
    },
    /// A new flower went in.
    FlowerPlanted {
        /// The flower.
        flower: Flower,
        /// The planter's flower count since their last pick.
        #[serde(rename = "flowerNumber")]
        flower_number: u32,
    },
    /// A flower's cached stage moved forward.
    FlowerGrew {
        /// The flower.
        id: FlowerId,
        /// Its new stage.
        stage: GrowthStage,
    },
    /// A flower became recognisable; show who planted what.
    FlowerRevealed {
        /// The reveal label.
        annotation: RevealAnnotation,
    },
    /// Flowers left the garden.
    FlowersRemoved {
        /// Removed flower ids.
        ids: Vec<FlowerId>,
        /// Why they were removed.
        cause: RemovalCause,
    },
    /// A new activity banner.
    Activity {
        /// The banner.
        message: ActivityMessage,
    },
    /// A command broke a garden rule and was ignored.
    CommandRejected {
        /// Who issued it.
        username: String,
        /// Which rule.
        reason: RejectionReason,
    },
    /// Someone watered the garden and it started (or kept) raining.
    RainStarted {
        /// When the shower ends.
        until: DateTime<Utc>,
        /// New water level.
        #[serde(rename = "waterLevel")]
        water_level: u32,
        /// Saturation, back at 100 after watering.
        saturation: f64,
    },
    /// The rain shower ended.
    RainStopped {},
    /// The cosmetic colour saturation changed.
    SaturationChanged {
        /// New saturation percentage.
        saturation: f64,
    },
    /// A bunny hopped in.
    BunnyArrived {
        /// The visit.
        visit: BunnyVisit,
    },
    /// The bunny moved to its next phase.
    BunnyPhaseChanged {
        /// The new phase.
        phase: BunnyPhase,
    },
    /// The bunny left.
    BunnyLeft {
        /// Flowers it actually ate.
        eaten: u32,
    },
    /// A celebration started. The protocol name depends on the kind.
    CelebrationShown {
        /// Which celebration.
        kind: CelebrationKind,
        /// Who earned it.
        username: String,
        /// When it starts fading.
        until: DateTime<Utc>,
    },
    /// A celebration moved its banner.
    CelebrationBannerMoved {
        /// Which celebration.
        kind: CelebrationKind,
        /// New banner position.
        position: BannerPosition,
    },
    /// A celebration began fading out.
    CelebrationFading {
        /// Which celebration.
        kind: CelebrationKind,
    },
    /// A celebration finished and is hidden.
    CelebrationHidden {
        /// Which celebration.
        kind: CelebrationKind,
    },
    /// A user's lifetime total reached the guardian threshold. The host
    /// records it in the guardian store.
    GuardianAchieved {
        /// The new guardian.
        username: String,
        /// Their lifetime total at the time.
        #[serde(rename = "flowerCount")]
        flower_count: u32,
    },
    /// Leaderboard of the session's top pickers.
    Leaderboard {
        /// Rows, best first.
        entries: Vec<LeaderboardEntry>,
    },
}

impl GardenEvent {
    /// Stable protocol name of this event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GardenShown { .. } => "gardenShown",
            Self::GardenHidden { .. } => "gardenHidden",
            Self::GardenReset { .. } => "gardenReset",
            Self::FlowerPlanted { .. } => "flowerPlanted",
            Self::FlowerGrew { .. } => "flowerGrew",
            Self::FlowerRevealed { .. } => "flowerRevealed",
            Self::FlowersRemoved { .. } => "flowersRemoved",
            Self::Activity { .. } => "gardenActivity",
            Self::CommandRejected { .. } => "commandRejected",
            Self::RainStarted { .. } => "rainStarted",
            Self::RainStopped {} => "rainStopped",
            Self::SaturationChanged { .. } => "saturationChanged",
            Self::BunnyArrived { .. } => "bunnyArrived",
            Self::BunnyPhaseChanged { .. } => "bunnyPhaseChanged",
            Self::BunnyLeft { .. } => "bunnyLeft",
            Self::CelebrationShown { kind, .. } => kind.event_name(),
            Self::CelebrationBannerMoved { .. } => "celebrationBannerMoved",
            Self::CelebrationFading { .. } => "celebrationFading",
            Self::CelebrationHidden { .. } => "celebrationHidden",
            Self::GuardianAchieved { .. } => "guardianAchieved",
            Self::Leaderboard { .. } => "showLeaderboard",
        }
    }

    /// Wrap the event in its `{event, detail}` wire envelope.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the payload cannot be encoded.
    pub fn envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        Ok(EventEnvelope {
            event: self.name().to_owned(),
            detail: serde_json::to_value(self)?,
        })
    }
}

/// Wire form of an outbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventEnvelope {
    /// Protocol name.
    pub event: String,
    /// Event payload.
    pub detail: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parses_from_envelope() {
        let raw = r#"{"event":"plantFlower","detail":{"username":"fern","flowerType":"sunflower"}}"#;
        let parsed: Result<Command, _> = serde_json::from_str(raw);
        assert_eq!(
            parsed.ok(),
            Some(Command::Plant {
                username: "fern".to_owned(),
                flower_type: Some(FlowerType::Sunflower),
            })
        );
    }

    #[test]
    fn plant_type_is_optional() {
        let raw = r#"{"event":"plantFlower","detail":{"username":"fern"}}"#;
        let parsed: Result<Command, _> = serde_json::from_str(raw);
        assert!(matches!(parsed, Ok(Command::Plant { flower_type: None, .. })));
    }

    #[test]
    fn command_name_matches_serde_tag() {
        let cmd = Command::PickOld {
            username: "mod".to_owned(),
        };
        let json = serde_json::to_value(&cmd).unwrap_or_default();
        assert_eq!(json["event"], cmd.name());
        assert_eq!(cmd.username(), "mod");
    }

    #[test]
    fn celebration_event_uses_kind_specific_name() {
        let event = GardenEvent::CelebrationShown {
            kind: CelebrationKind::NaturesGuardian,
            username: "moss".to_owned(),
            until: Utc::now(),
        };
        let envelope = event.envelope().ok();
        assert_eq!(
            envelope.as_ref().map(|e| e.event.as_str()),
            Some("showNaturesGuardian")
        );
        assert_eq!(
            envelope.map(|e| e.detail["username"].clone()),
            Some(serde_json::json!("moss"))
        );
    }

    #[test]
    fn guardian_event_detail_is_camel_case() {
        let event = GardenEvent::GuardianAchieved {
            username: "moss".to_owned(),
            flower_count: 50,
        };
        let detail = event.envelope().map(|e| e.detail).unwrap_or_default();
        assert_eq!(detail["flowerCount"], 50);
    }
}
