//! Bunny visit timeline.
//!
//! A visit runs on a fixed schedule measured from its start:
//!
//! | Phase    | Window     |
//! |----------|------------|
//! | Arriving | [0, 10s)   |
//! | Eating   | [10s, 15s) |
//! | Playing  | [15s, 25s) |
//!
//! and ends at 25s. The bunny fades in over the first second. Flowers are
//! removed once, on entry to the eating phase; the engine owns the flower
//! list so it performs the removal when [`advance`] reports it.

use chrono::{DateTime, Utc};
use streamgarden_types::{BunnyPhase, BunnyVisit};

use crate::flower::elapsed_ms;
use crate::random::RandomSource;

/// When the bunny starts eating.
pub const EATING_AT_MS: i64 = 10_000;

/// When the bunny starts playing.
pub const PLAYING_AT_MS: i64 = 15_000;

/// When the visit ends.
pub const LEAVE_AT_MS: i64 = 25_000;

/// Fade-in duration at the start of a visit.
pub const FADE_IN_MS: i64 = 1_000;

/// Horizontal range the bunny may appear in.
pub const POSITION_RANGE: (f64, f64) = (10.0, 90.0);

/// Upper bound for the eat count given how many flowers are mature.
pub fn eat_limit(mature: usize, max_eaten: u32) -> u32 {
    let half = mature.div_ceil(2);
    u32::try_from(half).unwrap_or(u32::MAX).min(max_eaten)
}

/// Phase for a visit `elapsed` milliseconds in, or `None` once it is over.
pub const fn phase_at(elapsed: i64) -> Option<BunnyPhase> {
    if elapsed < EATING_AT_MS {
        Some(BunnyPhase::Arriving)
    } else if elapsed < PLAYING_AT_MS {
        Some(BunnyPhase::Eating)
    } else if elapsed < LEAVE_AT_MS {
        Some(BunnyPhase::Playing)
    } else {
        None
    }
}

/// Render opacity `elapsed` milliseconds into a visit.
#[allow(clippy::cast_precision_loss)]
pub fn opacity_at(elapsed: i64) -> f64 {
    if elapsed >= FADE_IN_MS {
        return 1.0;
    }
    (elapsed.max(0) as f64) / (FADE_IN_MS as f64)
}

/// Begin a visit. With `mature` ripe flowers in the garden the bunny plans
/// to eat between 1 and [`eat_limit`] of them; with none it eats weeds.
pub fn start_visit(
    now: DateTime<Utc>,
    mature: usize,
    max_eaten: u32,
    rng: &mut impl RandomSource,
) -> BunnyVisit {
    let limit = eat_limit(mature, max_eaten);
    let eaten_count = if limit == 0 {
        0
    } else {
        rng.roll(limit).saturating_add(1)
    };
    let (low, high) = POSITION_RANGE;
    BunnyVisit {
        phase: BunnyPhase::Arriving,
        started_at: now,
        position: (high - low).mul_add(rng.unit(), low),
        eaten_count,
        opacity: 0.0,
        has_eaten: false,
    }
}

/// What happened to a visit during one [`advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BunnyProgress {
    /// The phase changed to this.
    pub entered: Option<BunnyPhase>,
    /// The eating phase was reached for the first time; remove flowers now.
    pub eat_now: bool,
    /// The visit is over.
    pub finished: bool,
}

/// Move a visit forward to `now`.
pub fn advance(visit: &mut BunnyVisit, now: DateTime<Utc>) -> BunnyProgress {
    let elapsed = elapsed_ms(visit.started_at, now);
    visit.opacity = opacity_at(elapsed);

    let mut progress = BunnyProgress::default();
    match phase_at(elapsed) {
        Some(phase) => {
            if phase != visit.phase {
                visit.phase = phase;
                progress.entered = Some(phase);
            }
            if phase >= BunnyPhase::Eating && !visit.has_eaten {
                visit.has_eaten = true;
                progress.eat_now = true;
            }
        }
        None => {
            if !visit.has_eaten {
                visit.has_eaten = true;
                progress.eat_now = true;
            }
            progress.finished = true;
        }
    }
    progress
}
