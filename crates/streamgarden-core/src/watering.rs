//! Water level, rain and colour saturation.
//!
//! None of this affects growth. Watering tops up a cosmetic water level,
//! starts a short rain shower, and restores full colour, which then holds
//! for a while before draining linearly to a floor.

use chrono::{DateTime, Duration, Utc};

use crate::config::GardenRules;
use crate::flower::elapsed_ms;

/// Maximum water level.
pub const MAX_WATER_LEVEL: u32 = 100;

/// Fully saturated colour.
pub const FULL_SATURATION: f64 = 100.0;

/// Saturation `now`, for a garden last watered at `watered_at`.
///
/// Holds at 100 for `hold_ms`, then falls linearly to `floor` over
/// `decay_ms`, then stays at `floor`.
#[allow(clippy::cast_precision_loss)]
pub fn saturation_at(
    watered_at: DateTime<Utc>,
    now: DateTime<Utc>,
    hold_ms: i64,
    decay_ms: i64,
    floor: f64,
) -> f64 {
    let elapsed = elapsed_ms(watered_at, now);
    if elapsed <= hold_ms {
        return FULL_SATURATION;
    }
    let into_decay = elapsed.saturating_sub(hold_ms);
    if decay_ms <= 0 || into_decay >= decay_ms {
        return floor;
    }
    let fraction = (into_decay as f64) / (decay_ms as f64);
    (floor - FULL_SATURATION).mul_add(fraction, FULL_SATURATION)
}

/// Result of a watering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Watered {
    /// End of the rain shower.
    pub rain_until: DateTime<Utc>,
    /// Water level after topping up.
    pub level: u32,
}

/// Water and rain state for one garden.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterState {
    level: u32,
    watered_at: DateTime<Utc>,
    rain_until: Option<DateTime<Utc>>,
    saturation: f64,
}

impl WaterState {
    /// A garden that starts at the configured level with full colour.
    pub const fn new(rules: &GardenRules, now: DateTime<Utc>) -> Self {
        Self {
            level: if rules.initial_water_level > MAX_WATER_LEVEL {
                MAX_WATER_LEVEL
            } else {
                rules.initial_water_level
            },
            watered_at: now,
            rain_until: None,
            saturation: FULL_SATURATION,
        }
    }

    /// Water the garden. A shower that is already falling restarts.
    pub fn water(&mut self, rules: &GardenRules, now: DateTime<Utc>) -> Watered {
        self.level = self
            .level
            .saturating_add(rules.water_step)
            .min(MAX_WATER_LEVEL);
        self.watered_at = now;
        self.saturation = FULL_SATURATION;
        let rain_until = now
            .checked_add_signed(Duration::milliseconds(rules.rain_duration_ms))
            .unwrap_or(now);
        self.rain_until = Some(rain_until);
        Watered {
            rain_until,
            level: self.level,
        }
    }

    /// Stop the rain once its window has passed. Returns `true` if it stopped.
    pub fn expire_rain(&mut self, now: DateTime<Utc>) -> bool {
        if self.rain_until.is_some_and(|until| now >= until) {
            self.rain_until = None;
            return true;
        }
        false
    }

    /// Recompute saturation. Returns the new value if it changed.
    pub fn refresh_saturation(&mut self, rules: &GardenRules, now: DateTime<Utc>) -> Option<f64> {
        let next = saturation_at(
            self.watered_at,
            now,
            rules.saturation_hold_ms,
            rules.saturation_decay_ms,
            rules.saturation_floor,
        );
        if (next - self.saturation).abs() < f64::EPSILON {
            return None;
        }
        self.saturation = next;
        Some(next)
    }

    /// Current water level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current saturation percentage.
    pub const fn saturation(&self) -> f64 {
        self.saturation
    }

    /// End of the current shower, if it is raining.
    pub const fn rain_until(&self) -> Option<DateTime<Utc>> {
        self.rain_until
    }
}
