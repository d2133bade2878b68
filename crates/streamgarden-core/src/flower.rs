//! Flower rules: growth stages, the rarity table, sub-variants and
//! placement.
//!
//! # Growth
//!
//! | Stage        | Age          |
//! |--------------|--------------|
//! | Sprout       | [0, 45s)     |
//! | Blooming     | [45s, 60s)   |
//! | Small        | [60s, 90s)   |
//! | Medium       | [90s, 150s)  |
//! | Fully mature | 150s onwards |
//!
//! The stage is always recomputed from `planted_at`; the `stage` field on a
//! [`Flower`] is only a cache the growth tick refreshes.
//!
//! # Placement
//!
//! Tall flowers (roses, sunflowers and peony wildflowers) would hide the
//! garden if they stood in the middle, so they are confined to the two
//! edge bands `[5, 25]` and `[75, 95]`. Everything else may use `[5, 95]`.

use chrono::{DateTime, Utc};
use streamgarden_types::{Flower, FlowerType, GrowthStage};

use crate::random::RandomSource;

/// Age at which a sprout starts blooming.
pub const BLOOMING_AT_MS: i64 = 45_000;

/// Age at which a flower becomes recognisable.
pub const SMALL_AT_MS: i64 = 60_000;

/// Age at which a flower reaches medium size.
pub const MEDIUM_AT_MS: i64 = 90_000;

/// Age at which a flower is fully mature.
pub const MATURE_AT_MS: i64 = 150_000;

/// Species weights, drawn cumulatively in this order. Sums to 100.
pub const RARITY_TABLE: [(FlowerType, u32); 6] = [
    (FlowerType::Daisy, 25),
    (FlowerType::Wildflower, 20),
    (FlowerType::Lily, 15),
    (FlowerType::Tulip, 30),
    (FlowerType::Sunflower, 5),
    (FlowerType::Rose, 5),
];

/// Tulip colours.
pub const TULIP_COLORS: [&str; 6] = ["red", "pink", "yellow", "purple", "orange", "white"];

/// Wildflower image keys. `peony` grows tall.
pub const WILDFLOWER_VARIANTS: [&str; 6] =
    ["bluebell", "poppy", "cornflower", "lavender", "foxglove", "peony"];

/// The one wildflower variant that counts as tall.
pub const TALL_WILDFLOWER: &str = "peony";

/// Edge bands available to tall flowers.
pub const EDGE_BANDS: [(f64, f64); 2] = [(5.0, 25.0), (75.0, 95.0)];

/// Range available to every other flower.
pub const OPEN_RANGE: (f64, f64) = (5.0, 95.0);

/// Milliseconds between two instants, clamped at zero if the clock went
/// backwards.
pub fn elapsed_ms(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(since).num_milliseconds().max(0)
}

/// Growth stage for a flower of the given age.
pub const fn stage_for_age(age_ms: i64) -> GrowthStage {
    if age_ms < BLOOMING_AT_MS {
        GrowthStage::Sprout
    } else if age_ms < SMALL_AT_MS {
        GrowthStage::Blooming
    } else if age_ms < MEDIUM_AT_MS {
        GrowthStage::Small
    } else if age_ms < MATURE_AT_MS {
        GrowthStage::Medium
    } else {
        GrowthStage::FullyMature
    }
}

/// Age of a flower at `now`.
pub fn age_ms(flower: &Flower, now: DateTime<Utc>) -> i64 {
    elapsed_ms(flower.planted_at, now)
}

/// Growth stage of a flower at `now`, computed from its planting time.
pub fn stage_at(flower: &Flower, now: DateTime<Utc>) -> GrowthStage {
    stage_for_age(age_ms(flower, now))
}

/// Whether the flower is fully mature at `now`.
pub fn is_mature(flower: &Flower, now: DateTime<Utc>) -> bool {
    stage_at(flower, now) == GrowthStage::FullyMature
}

/// Draw a species from [`RARITY_TABLE`].
pub fn draw_flower_type(rng: &mut impl RandomSource) -> FlowerType {
    let total = RARITY_TABLE
        .iter()
        .fold(0_u32, |acc, &(_, weight)| acc.saturating_add(weight));
    let roll = rng.roll(total);

    let mut cumulative: u32 = 0;
    for &(flower_type, weight) in &RARITY_TABLE {
        cumulative = cumulative.saturating_add(weight);
        if roll < cumulative {
            return flower_type;
        }
    }
    FlowerType::Tulip
}

/// Draw the fixed sub-variant for a species, if it has any.
pub fn draw_specific_type(flower_type: FlowerType, rng: &mut impl RandomSource) -> Option<String> {
    let choices: &[&str] = match flower_type {
        FlowerType::Tulip => &TULIP_COLORS,
        FlowerType::Wildflower => &WILDFLOWER_VARIANTS,
        FlowerType::Rose | FlowerType::Sunflower | FlowerType::Daisy | FlowerType::Lily => {
            return None;
        }
    };
    let bound = u32::try_from(choices.len()).unwrap_or(u32::MAX);
    let index = usize::try_from(rng.roll(bound)).unwrap_or(0);
    choices.get(index).map(|choice| (*choice).to_owned())
}

/// Whether a flower of this species and variant is confined to the edges.
pub fn is_tall(flower_type: FlowerType, specific_type: Option<&str>) -> bool {
    match flower_type {
        FlowerType::Rose | FlowerType::Sunflower => true,
        FlowerType::Wildflower => specific_type == Some(TALL_WILDFLOWER),
        FlowerType::Tulip | FlowerType::Daisy | FlowerType::Lily => false,
    }
}

/// Pick a horizontal position for a new flower.
///
/// Tries up to `attempts` candidates and returns the first one at least
/// `spacing` away from every occupied position. If none qualifies, the
/// last candidate is used anyway.
pub fn choose_position(
    tall: bool,
    occupied: &[f64],
    spacing: f64,
    attempts: u32,
    rng: &mut impl RandomSource,
) -> f64 {
    let mut candidate = draw_candidate(tall, rng);
    for _ in 1..attempts.max(1) {
        if is_clear(candidate, occupied, spacing) {
            return candidate;
        }
        candidate = draw_candidate(tall, rng);
    }
    candidate
}

fn draw_candidate(tall: bool, rng: &mut impl RandomSource) -> f64 {
    let (low, high) = if tall {
        let band = usize::try_from(rng.roll(2)).unwrap_or(0);
        EDGE_BANDS.get(band).copied().unwrap_or(OPEN_RANGE)
    } else {
        OPEN_RANGE
    };
    (high - low).mul_add(rng.unit(), low)
}

fn is_clear(candidate: f64, occupied: &[f64], spacing: f64) -> bool {
    occupied.iter().all(|x| (candidate - x).abs() >= spacing)
}
