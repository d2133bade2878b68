//! Per-user counters and milestone detection.
//!
//! Milestones are edge triggered: a threshold fires when a pick carries the
//! user's lifetime total across it, and never again for that user. A pick
//! that jumps across several thresholds fires all of them, lowest first.

use std::collections::{BTreeMap, BTreeSet};

use streamgarden_types::{CelebrationKind, LeaderboardEntry};

/// Lifetime pick thresholds and the celebration each one fires.
pub const MILESTONES: [(u32, CelebrationKind); 6] = [
    (10, CelebrationKind::Flower),
    (20, CelebrationKind::GardenLegend),
    (30, CelebrationKind::MasterGardener),
    (40, CelebrationKind::GardenElite),
    (50, CelebrationKind::NaturesGuardian),
    (60, CelebrationKind::EasterEgg),
];

/// Lifetime total at which a user becomes a guardian.
pub const GUARDIAN_THRESHOLD: u32 = 50;

/// A milestone crossed by a single pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    /// The threshold that was crossed.
    pub threshold: u32,
    /// The celebration it fires.
    pub kind: CelebrationKind,
}

/// Result of recording a pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickOutcome {
    /// Lifetime total before the pick.
    pub before: u32,
    /// Lifetime total after the pick.
    pub after: u32,
    /// Milestones newly crossed, ascending.
    pub milestones: Vec<Milestone>,
}

impl PickOutcome {
    /// Whether this pick made the user a guardian.
    pub fn crossed_guardian(&self) -> bool {
        self.milestones
            .iter()
            .any(|m| m.threshold == GUARDIAN_THRESHOLD)
    }
}

/// Session counters for every gardener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GardenerTally {
    planted_since_pick: BTreeMap<String, u32>,
    picked_totals: BTreeMap<String, u32>,
    fired: BTreeMap<String, BTreeSet<u32>>,
}

impl GardenerTally {
    /// Count a new flower for `username` and return their running number.
    pub fn record_plant(&mut self, username: &str) -> u32 {
        let count = self
            .planted_since_pick
            .entry(username.to_owned())
            .or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Add `picked` flowers to the user's lifetime total, reset their
    /// planting count, and report newly crossed milestones.
    pub fn record_pick(&mut self, username: &str, picked: u32) -> PickOutcome {
        self.planted_since_pick.remove(username);

        let total = self.picked_totals.entry(username.to_owned()).or_insert(0);
        let before = *total;
        let after = before.saturating_add(picked);
        *total = after;

        let fired = self.fired.entry(username.to_owned()).or_default();
        let milestones = MILESTONES
            .iter()
            .filter(|&&(threshold, _)| before < threshold && threshold <= after)
            .filter(|&&(threshold, _)| fired.insert(threshold))
            .map(|&(threshold, kind)| Milestone { threshold, kind })
            .collect();

        PickOutcome {
            before,
            after,
            milestones,
        }
    }

    /// Flowers planted by the user since their last pick.
    pub fn planted_since_pick(&self, username: &str) -> u32 {
        self.planted_since_pick.get(username).copied().unwrap_or(0)
    }

    /// Lifetime picked total for the user this session.
    pub fn picked_total(&self, username: &str) -> u32 {
        self.picked_totals.get(username).copied().unwrap_or(0)
    }

    /// All lifetime totals.
    pub const fn picked_totals(&self) -> &BTreeMap<String, u32> {
        &self.picked_totals
    }

    /// Top `limit` pickers, most picks first, ties by username.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .picked_totals
            .iter()
            .filter(|&(_, &picked)| picked > 0)
            .map(|(username, &picked)| LeaderboardEntry {
                username: username.clone(),
                picked,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.picked
                .cmp(&a.picked)
                .then_with(|| a.username.cmp(&b.username))
        });
        entries.truncate(limit);
        entries
    }

    /// Forget every counter.
    pub fn clear(&mut self) {
        self.planted_since_pick.clear();
        self.picked_totals.clear();
        self.fired.clear();
    }
}
