//! Celebration overlays.
//!
//! Every [`CelebrationKind`] is an independent state machine:
//!
//! ```text
//! Hidden --trigger--> Showing{until} --until--> Fading{until + 1s} --> Hidden
//! ```
//!
//! Different kinds may be on screen at the same time. Triggering a kind that
//! is already visible restarts it for the new user. There are no scheduled
//! callbacks: [`CelebrationDispatcher::advance`] is driven by the engine's
//! tick, so [`CelebrationDispatcher::clear_all`] cancels everything at once.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use streamgarden_types::{
    BannerPosition, CelebrationKind, CelebrationPhase, CelebrationView, GardenEvent,
};
use tracing::debug;

/// How long a celebration fades out for.
pub const FADE_MS: i64 = 1_000;

/// When the easter egg banner slides from the centre to the side.
pub const EASTER_EGG_BANNER_MOVE_MS: i64 = 30_000;

/// How long each celebration stays fully visible.
pub const fn showing_ms(kind: CelebrationKind) -> i64 {
    match kind {
        CelebrationKind::Flower | CelebrationKind::BeeParade => 35_000,
        CelebrationKind::GardenLegend => 45_000,
        CelebrationKind::MasterGardener => 40_000,
        CelebrationKind::GardenElite => 43_000,
        CelebrationKind::NaturesGuardian => 50_000,
        CelebrationKind::EasterEgg => 240_000,
    }
}

fn offset(at: DateTime<Utc>, ms: i64) -> DateTime<Utc> {
    at.checked_add_signed(Duration::milliseconds(ms)).unwrap_or(at)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    username: String,
    phase: CelebrationPhase,
    started_at: DateTime<Utc>,
    until: DateTime<Utc>,
    banner: Option<BannerPosition>,
}

/// Owns the state of every celebration overlay.
#[derive(Debug, Clone, Default)]
pub struct CelebrationDispatcher {
    slots: BTreeMap<CelebrationKind, Slot>,
}

impl CelebrationDispatcher {
    /// Create a dispatcher with nothing on screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `kind` for `username`, restarting it if it is already visible.
    pub fn trigger(
        &mut self,
        kind: CelebrationKind,
        username: &str,
        now: DateTime<Utc>,
    ) -> GardenEvent {
        let until = offset(now, showing_ms(kind));
        let banner = (kind == CelebrationKind::EasterEgg).then_some(BannerPosition::Center);
        if let Some(previous) = self.slots.get(&kind) {
            debug!(
                kind = kind.event_name(),
                previous = %previous.username,
                username,
                "restarting visible celebration"
            );
        }
        self.slots.insert(
            kind,
            Slot {
                username: username.to_owned(),
                phase: CelebrationPhase::Showing,
                started_at: now,
                until,
                banner,
            },
        );
        GardenEvent::CelebrationShown {
            kind,
            username: username.to_owned(),
            until,
        }
    }

    /// Move every celebration forward to `now`.
    ///
    /// A single call may carry a celebration through several transitions
    /// if the tick arrived late.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Vec<GardenEvent> {
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for (&kind, slot) in &mut self.slots {
            loop {
                if slot.phase == CelebrationPhase::Showing
                    && slot.banner == Some(BannerPosition::Center)
                    && now >= offset(slot.started_at, EASTER_EGG_BANNER_MOVE_MS)
                {
                    slot.banner = Some(BannerPosition::Side);
                    events.push(GardenEvent::CelebrationBannerMoved {
                        kind,
                        position: BannerPosition::Side,
                    });
                    continue;
                }
                if now < slot.until {
                    break;
                }
                match slot.phase {
                    CelebrationPhase::Showing => {
                        slot.phase = CelebrationPhase::Fading;
                        slot.until = offset(slot.until, FADE_MS);
                        events.push(GardenEvent::CelebrationFading { kind });
                    }
                    CelebrationPhase::Fading => {
                        finished.push(kind);
                        events.push(GardenEvent::CelebrationHidden { kind });
                        break;
                    }
                }
            }
        }

        for kind in finished {
            self.slots.remove(&kind);
        }
        events
    }

    /// Hide every celebration immediately, without fade events.
    pub fn clear_all(&mut self) {
        self.slots.clear();
    }

    /// Whether `kind` is showing or fading.
    pub fn is_visible(&self, kind: CelebrationKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Snapshot of the visible celebrations.
    pub fn views(&self) -> Vec<CelebrationView> {
        self.slots
            .iter()
            .map(|(&kind, slot)| CelebrationView {
                kind,
                username: slot.username.clone(),
                phase: slot.phase,
                until: slot.until,
                banner: slot.banner,
            })
            .collect()
    }
}
