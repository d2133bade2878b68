//! The garden engine.
//!
//! [`GardenEngine`] owns every piece of garden state: the flowers, the
//! per-user tallies, the bunny, water and rain, reveal labels, the activity
//! banner and the celebration overlays. It is constructed when the garden
//! is shown and dropped when it is hidden.
//!
//! Two entry points mutate it, both synchronous and both returning the
//! events the overlay should see:
//!
//! - [`GardenEngine::handle`] applies one [`Command`].
//! - [`GardenEngine::tick`] advances time-driven state: celebrations, the
//!   bunny timeline, rain, banner expiry, and the growth (5s), bunny check
//!   (10s) and saturation (30s) jobs.
//!
//! Every decision is made from absolute timestamps, so the host may tick as
//! often or as irregularly as it likes.

use chrono::{DateTime, Duration, Utc};
use streamgarden_types::{
    ActivityKind, ActivityMessage, BunnyVisit, CelebrationKind, Command, Flower, FlowerId,
    FlowerType, GardenEvent, GardenSnapshot, GrowthStage, RejectionReason, RemovalCause,
    RevealAnnotation,
};
use tracing::{debug, info};

use crate::activity::ActivityBanner;
use crate::bunny;
use crate::celebration::CelebrationDispatcher;
use crate::config::{GardenRules, ScheduleConfig};
use crate::flower::{self, elapsed_ms};
use crate::random::RandomSource;
use crate::schedule::Periodic;
use crate::tally::GardenerTally;
use crate::watering::WaterState;

/// Ages given to spawned test flowers, cycling, so every stage is on screen.
pub const TEST_SPAWN_AGES_MS: [i64; 6] = [0, 50_000, 75_000, 120_000, 200_000, 400_000];

/// The community garden.
#[derive(Debug)]
pub struct GardenEngine<R: RandomSource> {
    rules: GardenRules,
    rng: R,
    flowers: Vec<Flower>,
    tally: GardenerTally,
    water: WaterState,
    bunny: Option<BunnyVisit>,
    last_bunny_start: DateTime<Utc>,
    last_bee_parade: Option<DateTime<Utc>>,
    reveals: Vec<RevealAnnotation>,
    activity: ActivityBanner,
    celebrations: CelebrationDispatcher,
    growth_job: Periodic,
    bunny_job: Periodic,
    saturation_job: Periodic,
    test_sequence: u32,
}

impl<R: RandomSource> GardenEngine<R> {
    /// Create an empty garden at `now`.
    pub fn new(rules: GardenRules, schedule: &ScheduleConfig, rng: R, now: DateTime<Utc>) -> Self {
        let water = WaterState::new(&rules, now);
        Self {
            rules,
            rng,
            flowers: Vec::new(),
            tally: GardenerTally::default(),
            water,
            bunny: None,
            last_bunny_start: now,
            last_bee_parade: None,
            reveals: Vec::new(),
            activity: ActivityBanner::default(),
            celebrations: CelebrationDispatcher::new(),
            growth_job: Periodic::starting_at(schedule.growth_interval_ms, now),
            bunny_job: Periodic::starting_at(schedule.bunny_check_interval_ms, now),
            saturation_job: Periodic::starting_at(schedule.saturation_interval_ms, now),
            test_sequence: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply one command and return the resulting events.
    ///
    /// Rule violations are not errors: they produce a
    /// [`GardenEvent::CommandRejected`] and a warning banner, and leave the
    /// garden untouched.
    pub fn handle(&mut self, command: &Command, now: DateTime<Utc>) -> Vec<GardenEvent> {
        debug!(command = command.name(), username = command.username(), "handling command");
        match command {
            Command::Plant {
                username,
                flower_type,
            } => self.plant(username, *flower_type, now),
            Command::Water { username } => self.water(username, now),
            Command::Pick { username } => self.pick(username, now),
            Command::PickOld { username } => self.pick_old(username, now),
            Command::Start { username } => vec![GardenEvent::GardenShown {
                username: username.clone(),
            }],
            Command::Reset { username } => self.reset(username, now),
            Command::Hide { username } => self.hide(username, now),
            Command::SpawnTestFlowers { username } => self.spawn_test_flowers(username, now),
            Command::TestBunnyVisit { username } => self.manual_bunny_visit(username, now),
            Command::RequestLeaderboard { .. } => self.leaderboard(),
            Command::TriggerCelebration { username, kind } => {
                vec![self.celebrations.trigger(*kind, username, now)]
            }
        }
    }

    /// Plant a flower for `username`, honouring a requested species.
    pub fn plant(
        &mut self,
        username: &str,
        requested: Option<FlowerType>,
        now: DateTime<Utc>,
    ) -> Vec<GardenEvent> {
        let young = self
            .flowers
            .iter()
            .filter(|f| f.planted_by == username && flower::age_ms(f, now) < self.rules.allowance_window_ms)
            .count();
        if young >= self.rules.plant_allowance {
            return self.reject(username, RejectionReason::AllowanceUsed, now);
        }

        if self.flowers.len() >= self.rules.max_flowers {
            let mut events = self.reject(username, RejectionReason::GardenFull, now);
            let parade_due = self.last_bee_parade.is_none_or(|last| {
                elapsed_ms(last, now) >= self.rules.bee_parade_cooldown_ms
            });
            if parade_due {
                self.last_bee_parade = Some(now);
                events.push(
                    self.celebrations
                        .trigger(CelebrationKind::BeeParade, username, now),
                );
            }
            return events;
        }

        let flower_type = requested.unwrap_or_else(|| flower::draw_flower_type(&mut self.rng));
        let id = self.unique_id(FlowerId::planted(username, now));
        let new_flower = self.make_flower(id, flower_type, username, now, now);
        self.flowers.push(new_flower.clone());

        let flower_number = self.tally.record_plant(username);
        info!(
            username,
            flower = %new_flower.id,
            flower_type = flower_type.name(),
            flower_number,
            "flower planted"
        );

        let text = if flower_number <= 1 {
            format!(
                "{username} planted a {}. Flower #1, plant one more!",
                flower_type.name()
            )
        } else {
            format!(
                "{username} planted a {}. Flower #{flower_number}, plot complete!",
                flower_type.name()
            )
        };
        let message = self.activity.post(text, ActivityKind::Info, now);

        vec![
            GardenEvent::FlowerPlanted {
                flower: new_flower,
                flower_number,
            },
            GardenEvent::Activity { message },
        ]
    }

    /// Water the whole garden.
    pub fn water(&mut self, username: &str, now: DateTime<Utc>) -> Vec<GardenEvent> {
        for f in &mut self.flowers {
            f.last_watered = now;
        }
        let watered = self.water.water(&self.rules, now);
        info!(username, level = watered.level, "garden watered");

        let message = self.activity.post(
            format!("{username} watered the garden!"),
            ActivityKind::Info,
            now,
        );
        vec![
            GardenEvent::RainStarted {
                until: watered.rain_until,
                water_level: watered.level,
                saturation: self.water.saturation(),
            },
            GardenEvent::Activity { message },
        ]
    }

    /// Pick every one of the caller's flowers that is fully mature and old
    /// enough.
    pub fn pick(&mut self, username: &str, now: DateTime<Utc>) -> Vec<GardenEvent> {
        let mut owned = 0_usize;
        let mut mature = 0_usize;
        let mut eligible = Vec::new();
        for f in self.flowers.iter().filter(|f| f.planted_by == username) {
            owned = owned.saturating_add(1);
            if !flower::is_mature(f, now) {
                continue;
            }
            mature = mature.saturating_add(1);
            if flower::age_ms(f, now) >= self.rules.pick_min_age_ms {
                eligible.push(f.id.clone());
            }
        }

        if owned == 0 {
            return self.reject(username, RejectionReason::NoFlowersPlanted, now);
        }
        if mature == 0 {
            return self.reject(username, RejectionReason::NoneMature, now);
        }
        if eligible.is_empty() {
            return self.reject(username, RejectionReason::NoneOldEnough, now);
        }

        self.flowers.retain(|f| !eligible.contains(&f.id));
        let picked = u32::try_from(eligible.len()).unwrap_or(u32::MAX);
        let outcome = self.tally.record_pick(username, picked);
        info!(username, picked, total = outcome.after, "flowers picked");

        let message = self.activity.post(
            format!(
                "{username} picked {picked} {}! Lifetime total: {}",
                plural(picked, "flower", "flowers"),
                outcome.after
            ),
            ActivityKind::Info,
            now,
        );
        let mut events = vec![
            GardenEvent::FlowersRemoved {
                ids: eligible,
                cause: RemovalCause::Picked {
                    username: username.to_owned(),
                },
            },
            GardenEvent::Activity { message },
        ];

        for milestone in &outcome.milestones {
            info!(username, threshold = milestone.threshold, "milestone reached");
            events.push(self.celebrations.trigger(milestone.kind, username, now));
        }
        if outcome.crossed_guardian() {
            events.push(GardenEvent::GuardianAchieved {
                username: username.to_owned(),
                flower_count: outcome.after,
            });
        }
        if let Some(top) = outcome.milestones.last() {
            let message = self.activity.post(
                format!("{username} has picked {} flowers!", top.threshold),
                ActivityKind::Celebration,
                now,
            );
            events.push(GardenEvent::Activity { message });
        }
        events
    }

    /// Clear every flower older than the configured age, whoever owns it.
    pub fn pick_old(&mut self, username: &str, now: DateTime<Utc>) -> Vec<GardenEvent> {
        let max_age = self.rules.pick_old_age_ms;
        let old: Vec<FlowerId> = self
            .flowers
            .iter()
            .filter(|f| flower::age_ms(f, now) > max_age)
            .map(|f| f.id.clone())
            .collect();
        if old.is_empty() {
            return self.reject(username, RejectionReason::NoOldFlowers, now);
        }

        self.flowers.retain(|f| !old.contains(&f.id));
        let count = u32::try_from(old.len()).unwrap_or(u32::MAX);
        info!(username, count, "old flowers cleared");

        let message = self.activity.post(
            format!(
                "{username} cleared {count} old {}.",
                plural(count, "flower", "flowers")
            ),
            ActivityKind::Info,
            now,
        );
        vec![
            GardenEvent::FlowersRemoved {
                ids: old,
                cause: RemovalCause::Expired,
            },
            GardenEvent::Activity { message },
        ]
    }

    /// Wipe the garden back to an empty state.
    pub fn reset(&mut self, username: &str, now: DateTime<Utc>) -> Vec<GardenEvent> {
        self.clear(now);
        info!(username, "garden reset");
        vec![GardenEvent::GardenReset {
            username: username.to_owned(),
        }]
    }

    /// Clear everything ahead of the engine being dropped.
    pub fn hide(&mut self, username: &str, now: DateTime<Utc>) -> Vec<GardenEvent> {
        self.clear(now);
        info!(username, "garden hidden");
        vec![GardenEvent::GardenHidden {
            username: username.to_owned(),
        }]
    }

    /// Plant a batch of staggered test flowers for `username`. Does not
    /// count towards anyone's tally.
    pub fn spawn_test_flowers(&mut self, username: &str, now: DateTime<Utc>) -> Vec<GardenEvent> {
        let room = self.rules.max_flowers.saturating_sub(self.flowers.len());
        let count = self.rules.test_spawn_count.min(room);
        if count == 0 {
            return self.reject(username, RejectionReason::GardenFull, now);
        }

        let mut events = Vec::with_capacity(count.saturating_add(1));
        for age in TEST_SPAWN_AGES_MS.iter().cycle().take(count) {
            self.test_sequence = self.test_sequence.saturating_add(1);
            let planted_at = now
                .checked_sub_signed(Duration::milliseconds(*age))
                .unwrap_or(now);
            let flower_type = flower::draw_flower_type(&mut self.rng);
            let id = self.unique_id(FlowerId::test(self.test_sequence));
            let new_flower = self.make_flower(id, flower_type, username, planted_at, now);
            self.flowers.push(new_flower.clone());
            events.push(GardenEvent::FlowerPlanted {
                flower: new_flower,
                flower_number: 0,
            });
        }
        info!(username, count, "test flowers spawned");

        let message = self.activity.post(
            format!("Spawned {count} test flowers."),
            ActivityKind::Info,
            now,
        );
        events.push(GardenEvent::Activity { message });
        events
    }

    /// Start a bunny visit now, skipping the 20 minute gate.
    pub fn manual_bunny_visit(&mut self, username: &str, now: DateTime<Utc>) -> Vec<GardenEvent> {
        if self.bunny.is_some() {
            return self.reject(username, RejectionReason::BunnyAlreadyVisiting, now);
        }
        self.start_bunny(now)
    }

    /// The session leaderboard.
    pub fn leaderboard(&self) -> Vec<GardenEvent> {
        vec![GardenEvent::Leaderboard {
            entries: self.tally.leaderboard(self.rules.leaderboard_size),
        }]
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance every time-driven piece of state to `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<GardenEvent> {
        let mut events = self.celebrations.advance(now);

        self.advance_bunny(now, &mut events);

        if self.growth_job.poll(now) {
            self.grow(now, &mut events);
        }

        if self.bunny_job.poll(now)
            && self.bunny.is_none()
            && elapsed_ms(self.last_bunny_start, now) >= self.rules.bunny_interval_ms
        {
            events.extend(self.start_bunny(now));
        }

        if self.saturation_job.poll(now) {
            if let Some(saturation) = self.water.refresh_saturation(&self.rules, now) {
                events.push(GardenEvent::SaturationChanged { saturation });
            }
        }

        if self.water.expire_rain(now) {
            events.push(GardenEvent::RainStopped {});
        }

        self.activity.expire(now);
        self.reveals.retain(|r| now < r.expires_at);
        events
    }

    fn grow(&mut self, now: DateTime<Utc>, events: &mut Vec<GardenEvent>) {
        let reveal_until = now
            .checked_add_signed(Duration::milliseconds(self.rules.reveal_ms))
            .unwrap_or(now);
        for f in &mut self.flowers {
            let next = flower::stage_at(f, now);
            if next == f.stage {
                continue;
            }
            if f.stage < GrowthStage::Small && next >= GrowthStage::Small {
                let annotation = RevealAnnotation {
                    flower_id: f.id.clone(),
                    text: format!(
                        "{}'s {}",
                        f.planted_by,
                        f.specific_type
                            .as_deref()
                            .map_or_else(|| f.flower_type.name().to_owned(), |s| {
                                format!("{s} {}", f.flower_type.name())
                            })
                    ),
                    expires_at: reveal_until,
                };
                self.reveals.push(annotation.clone());
                events.push(GardenEvent::FlowerRevealed { annotation });
            }
            f.stage = next;
            events.push(GardenEvent::FlowerGrew {
                id: f.id.clone(),
                stage: next,
            });
        }
    }

    fn start_bunny(&mut self, now: DateTime<Utc>) -> Vec<GardenEvent> {
        let mature = self
            .flowers
            .iter()
            .filter(|f| flower::is_mature(f, now))
            .count();
        let visit = bunny::start_visit(now, mature, self.rules.bunny_max_eaten, &mut self.rng);
        info!(
            mature,
            planned = visit.eaten_count,
            weeds = visit.is_weeds_visit(),
            "bunny visit started"
        );
        self.last_bunny_start = now;
        self.bunny = Some(visit.clone());
        vec![GardenEvent::BunnyArrived { visit }]
    }

    fn advance_bunny(&mut self, now: DateTime<Utc>, events: &mut Vec<GardenEvent>) {
        let Some(mut visit) = self.bunny.take() else {
            return;
        };
        let progress = bunny::advance(&mut visit, now);

        if let Some(phase) = progress.entered {
            events.push(GardenEvent::BunnyPhaseChanged { phase });
        }
        if progress.eat_now {
            visit.eaten_count = self.bunny_eats(visit.eaten_count, now, events);
        }
        if progress.finished {
            info!(eaten = visit.eaten_count, "bunny left");
            events.push(GardenEvent::BunnyLeft {
                eaten: visit.eaten_count,
            });
        } else {
            self.bunny = Some(visit);
        }
    }

    /// Remove up to `planned` of the oldest mature flowers. Returns how
    /// many were actually eaten.
    fn bunny_eats(&mut self, planned: u32, now: DateTime<Utc>, events: &mut Vec<GardenEvent>) -> u32 {
        let mut mature: Vec<&Flower> = self
            .flowers
            .iter()
            .filter(|f| flower::is_mature(f, now))
            .collect();
        mature.sort_by_key(|f| f.planted_at);
        let eaten: Vec<FlowerId> = mature
            .into_iter()
            .take(usize::try_from(planned).unwrap_or(usize::MAX))
            .map(|f| f.id.clone())
            .collect();

        let count = u32::try_from(eaten.len()).unwrap_or(u32::MAX);
        let text = if count == 0 {
            "A bunny hopped by and munched on some weeds.".to_owned()
        } else {
            format!(
                "A bunny ate {count} {}!",
                plural(count, "flower", "flowers")
            )
        };
        if count > 0 {
            self.flowers.retain(|f| !eaten.contains(&f.id));
            events.push(GardenEvent::FlowersRemoved {
                ids: eaten,
                cause: RemovalCause::EatenByBunny,
            });
        }
        let message = self.activity.post(text, ActivityKind::Celebration, now);
        events.push(GardenEvent::Activity { message });
        count
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn make_flower(
        &mut self,
        id: FlowerId,
        flower_type: FlowerType,
        username: &str,
        planted_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Flower {
        let specific_type = flower::draw_specific_type(flower_type, &mut self.rng);
        let tall = flower::is_tall(flower_type, specific_type.as_deref());
        let occupied: Vec<f64> = self.flowers.iter().map(|f| f.x).collect();
        let x = flower::choose_position(
            tall,
            &occupied,
            self.rules.placement_spacing,
            self.rules.placement_attempts,
            &mut self.rng,
        );
        Flower {
            id,
            flower_type,
            specific_type,
            x,
            planted_by: username.to_owned(),
            planted_at,
            stage: flower::stage_for_age(elapsed_ms(planted_at, now)),
            last_watered: planted_at,
        }
    }

    fn unique_id(&self, base: FlowerId) -> FlowerId {
        let taken = |id: &FlowerId| self.flowers.iter().any(|f| &f.id == id);
        if !taken(&base) {
            return base;
        }
        let mut suffix: u32 = 1;
        loop {
            let candidate = FlowerId(format!("{base}-{suffix}"));
            if !taken(&candidate) {
                return candidate;
            }
            suffix = suffix.saturating_add(1);
        }
    }

    fn reject(
        &mut self,
        username: &str,
        reason: RejectionReason,
        now: DateTime<Utc>,
    ) -> Vec<GardenEvent> {
        debug!(username, ?reason, "command rejected");
        let message = self
            .activity
            .post(rejection_text(username, reason, &self.rules), ActivityKind::Warning, now);
        vec![
            GardenEvent::CommandRejected {
                username: username.to_owned(),
                reason,
            },
            GardenEvent::Activity { message },
        ]
    }

    fn clear(&mut self, now: DateTime<Utc>) {
        self.flowers.clear();
        self.tally.clear();
        self.water = WaterState::new(&self.rules, now);
        self.bunny = None;
        self.last_bunny_start = now;
        self.last_bee_parade = None;
        self.reveals.clear();
        self.activity.clear();
        self.celebrations.clear_all();
        self.growth_job.rebase(now);
        self.bunny_job.rebase(now);
        self.saturation_job.rebase(now);
        self.test_sequence = 0;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Flowers in planting order.
    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    /// Per-user counters.
    pub const fn tally(&self) -> &GardenerTally {
        &self.tally
    }

    /// The active bunny visit.
    pub const fn bunny(&self) -> Option<&BunnyVisit> {
        self.bunny.as_ref()
    }

    /// Water, rain and saturation.
    pub const fn water_state(&self) -> &WaterState {
        &self.water
    }

    /// Celebration overlays.
    pub const fn celebrations(&self) -> &CelebrationDispatcher {
        &self.celebrations
    }

    /// The current activity banner.
    pub const fn activity(&self) -> Option<&ActivityMessage> {
        self.activity.current()
    }

    /// Reveal labels still on screen.
    pub fn reveals(&self) -> &[RevealAnnotation] {
        &self.reveals
    }

    /// The rules this garden runs under.
    pub const fn rules(&self) -> &GardenRules {
        &self.rules
    }

    /// A serialisable view of the whole garden.
    pub fn snapshot(&self, now: DateTime<Utc>) -> GardenSnapshot {
        GardenSnapshot {
            taken_at: now,
            flowers: self.flowers.clone(),
            water_level: self.water.level(),
            saturation: self.water.saturation(),
            raining_until: self.water.rain_until(),
            bunny: self.bunny.clone(),
            activity: self.activity.current().cloned(),
            reveals: self.reveals.clone(),
            celebrations: self.celebrations.views(),
            picked_totals: self.tally.picked_totals().clone(),
        }
    }
}

fn plural(count: u32, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

fn rejection_text(username: &str, reason: RejectionReason, rules: &GardenRules) -> String {
    match reason {
        RejectionReason::AllowanceUsed => format!(
            "{username}, you've already planted {} flowers. Let them grow a bit!",
            rules.plant_allowance
        ),
        RejectionReason::GardenFull => {
            "The garden is full! Pick some flowers to make room.".to_owned()
        }
        RejectionReason::NoFlowersPlanted => {
            format!("{username}, you haven't planted any flowers yet. Try !plant")
        }
        RejectionReason::NoneMature => format!("{username}, your flowers are still growing."),
        RejectionReason::NoneOldEnough => {
            format!("{username}, your flowers need a little longer before picking.")
        }
        RejectionReason::NoOldFlowers => "No flowers are old enough to clear.".to_owned(),
        RejectionReason::BunnyAlreadyVisiting => "A bunny is already visiting!".to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;
    use crate::random::{RngSource, ScriptedRandom};

    const MINUTE: i64 = 60_000;
    const WINDOW: i64 = 5 * MINUTE;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    fn quiet_rules() -> GardenRules {
        GardenRules {
            bunny_interval_ms: i64::MAX,
            ..GardenRules::default()
        }
    }

    fn garden_with(rules: GardenRules) -> GardenEngine<RngSource<StdRng>> {
        GardenEngine::new(rules, &ScheduleConfig::default(), RngSource::seeded(42), at(0))
    }

    fn garden() -> GardenEngine<RngSource<StdRng>> {
        garden_with(quiet_rules())
    }

    fn plant(user: &str) -> Command {
        Command::Plant {
            username: user.to_owned(),
            flower_type: None,
        }
    }

    fn pick(user: &str) -> Command {
        Command::Pick {
            username: user.to_owned(),
        }
    }

    fn rejection(events: &[GardenEvent]) -> Option<RejectionReason> {
        events.iter().find_map(|e| match e {
            GardenEvent::CommandRejected { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    fn shown_kinds(events: &[GardenEvent]) -> Vec<CelebrationKind> {
        events
            .iter()
            .filter_map(|e| match e {
                GardenEvent::CelebrationShown { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Plant `count` flowers for `user` in allowance-sized batches, wait
    /// until they can be picked, and pick them. Returns the pick's events
    /// and the next free timestamp.
    fn grow_and_pick<R: RandomSource>(
        engine: &mut GardenEngine<R>,
        user: &str,
        count: u32,
        mut t: i64,
    ) -> (Vec<GardenEvent>, i64) {
        for i in 0..count {
            if i > 0 && i % 2 == 0 {
                t += WINDOW;
            }
            let events = engine.handle(&plant(user), at(t));
            assert_eq!(rejection(&events), None, "plant {i} at {t} rejected");
        }
        t += WINDOW;
        let events = engine.handle(&pick(user), at(t));
        (events, t + 1_000)
    }

    // -- plant -------------------------------------------------------------

    #[test]
    fn third_plant_within_window_is_refused() {
        let mut engine = garden();
        assert_eq!(rejection(&engine.handle(&plant("fern"), at(0))), None);
        assert_eq!(rejection(&engine.handle(&plant("fern"), at(10_000))), None);
        let third = engine.handle(&plant("fern"), at(20_000));
        assert_eq!(rejection(&third), Some(RejectionReason::AllowanceUsed));
        assert_eq!(engine.flowers().len(), 2);

        // Another gardener is unaffected.
        assert_eq!(rejection(&engine.handle(&plant("moss"), at(20_000))), None);
    }

    #[test]
    fn allowance_window_rolls() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        engine.handle(&plant("fern"), at(60_000));
        assert_eq!(
            rejection(&engine.handle(&plant("fern"), at(WINDOW - 1))),
            Some(RejectionReason::AllowanceUsed)
        );
        assert_eq!(rejection(&engine.handle(&plant("fern"), at(WINDOW))), None);
        assert_eq!(engine.flowers().len(), 3);
    }

    #[test]
    fn plant_messages_count_flowers() {
        let mut engine = garden();
        let first = engine.handle(&plant("fern"), at(0));
        assert!(matches!(
            &first[0],
            GardenEvent::FlowerPlanted { flower_number: 1, .. }
        ));
        assert!(engine.activity().unwrap().text.contains("Flower #1, plant one more"));

        engine.handle(&plant("fern"), at(1_000));
        assert!(engine.activity().unwrap().text.contains("Flower #2, plot complete"));
    }

    #[test]
    fn garden_never_exceeds_capacity() {
        let mut engine = garden();
        for n in 0..20 {
            let events = engine.handle(&plant(&format!("user{n}")), at(n * 10));
            assert_eq!(rejection(&events), None);
        }
        let full = engine.handle(&plant("late"), at(1_000));
        assert_eq!(rejection(&full), Some(RejectionReason::GardenFull));
        assert_eq!(engine.flowers().len(), 20);
        assert_eq!(shown_kinds(&full), vec![CelebrationKind::BeeParade]);
    }

    #[test]
    fn bee_parade_is_rate_limited() {
        let mut engine = garden();
        for n in 0..20 {
            engine.handle(&plant(&format!("user{n}")), at(n));
        }
        assert_eq!(shown_kinds(&engine.handle(&plant("a"), at(1_000))).len(), 1);
        assert!(shown_kinds(&engine.handle(&plant("b"), at(2_000))).is_empty());
        assert_eq!(
            shown_kinds(&engine.handle(&plant("c"), at(1_000 + WINDOW))).len(),
            1
        );
    }

    #[test]
    fn allowance_is_checked_before_capacity() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        engine.handle(&plant("fern"), at(1));
        for n in 0..18 {
            engine.handle(&plant(&format!("user{n}")), at(2 + n));
        }
        let events = engine.handle(&plant("fern"), at(100));
        assert_eq!(rejection(&events), Some(RejectionReason::AllowanceUsed));
        assert!(shown_kinds(&events).is_empty());
    }

    #[test]
    fn forced_sunflower_lands_in_edge_band() {
        for seed in 0..50 {
            let mut engine = GardenEngine::new(
                quiet_rules(),
                &ScheduleConfig::default(),
                RngSource::seeded(seed),
                at(0),
            );
            let events = engine.handle(
                &Command::Plant {
                    username: "fern".to_owned(),
                    flower_type: Some(FlowerType::Sunflower),
                },
                at(0),
            );
            let GardenEvent::FlowerPlanted { flower, .. } = &events[0] else {
                panic!("expected a planted flower");
            };
            assert_eq!(flower.flower_type, FlowerType::Sunflower);
            assert!(
                (5.0..=25.0).contains(&flower.x) || (75.0..=95.0).contains(&flower.x),
                "x = {}",
                flower.x
            );
        }
    }

    #[test]
    fn scripted_draw_picks_species_and_variant() {
        // type roll 0.70 -> tulip, colour roll 0.20 -> pink, position 0.5 -> 50.
        let rng = ScriptedRandom::new(&[0.70, 0.20, 0.5]);
        let mut engine = GardenEngine::new(quiet_rules(), &ScheduleConfig::default(), rng, at(0));
        engine.handle(&plant("fern"), at(0));
        let flower = &engine.flowers()[0];
        assert_eq!(flower.flower_type, FlowerType::Tulip);
        assert_eq!(flower.specific_type.as_deref(), Some("pink"));
        assert!((flower.x - 50.0).abs() < 1e-9);
        assert_eq!(flower.stage, GrowthStage::Sprout);
        assert_eq!(flower.last_watered, flower.planted_at);
    }

    #[test]
    fn same_millisecond_plants_get_distinct_ids() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        engine.handle(&plant("fern"), at(0));
        let ids: Vec<_> = engine.flowers().iter().map(|f| f.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
    }

    // -- water -------------------------------------------------------------

    #[test]
    fn watering_stamps_flowers_and_starts_rain() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        engine.handle(&plant("moss"), at(0));
        let events = engine.handle(
            &Command::Water {
                username: "ivy".to_owned(),
            },
            at(30_000),
        );
        assert!(engine.flowers().iter().all(|f| f.last_watered == at(30_000)));
        assert!(matches!(
            &events[0],
            GardenEvent::RainStarted { water_level: 75, .. }
        ));
        assert!(engine.tick(at(34_000)).iter().all(|e| *e != GardenEvent::RainStopped {}));
        assert!(engine.tick(at(35_000)).contains(&GardenEvent::RainStopped {}));
    }

    #[test]
    fn saturation_decays_on_its_own_schedule() {
        let mut engine = garden();
        let mut seen = Vec::new();
        for s in (0..=12 * 60).step_by(5) {
            for e in engine.tick(at(s * 1_000)) {
                if let GardenEvent::SaturationChanged { saturation } = e {
                    seen.push(saturation);
                }
            }
        }
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[1] <= w[0]));
        assert!((engine.water_state().saturation() - 20.0).abs() < 1e-9);
    }

    // -- pick --------------------------------------------------------------

    #[test]
    fn pick_failure_branches() {
        let mut engine = garden();
        assert_eq!(
            rejection(&engine.handle(&pick("fern"), at(0))),
            Some(RejectionReason::NoFlowersPlanted)
        );
        engine.handle(&plant("fern"), at(0));
        assert_eq!(
            rejection(&engine.handle(&pick("fern"), at(100_000))),
            Some(RejectionReason::NoneMature)
        );
        assert_eq!(
            rejection(&engine.handle(&pick("fern"), at(200_000))),
            Some(RejectionReason::NoneOldEnough)
        );
        let picked = engine.handle(&pick("fern"), at(WINDOW));
        assert_eq!(rejection(&picked), None);
        assert!(engine.flowers().is_empty());
    }

    #[test]
    fn pick_only_takes_own_flowers() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        engine.handle(&plant("moss"), at(0));
        engine.handle(&pick("fern"), at(WINDOW));
        assert_eq!(engine.flowers().len(), 1);
        assert_eq!(engine.flowers()[0].planted_by, "moss");
    }

    #[test]
    fn first_pick_counts_without_celebrating() {
        let mut engine = garden();
        let (events, _) = grow_and_pick(&mut engine, "fern", 1, 0);
        assert_eq!(engine.tally().picked_total("fern"), 1);
        assert!(shown_kinds(&events).is_empty());
        assert_eq!(engine.tally().planted_since_pick("fern"), 0);
    }

    #[test]
    fn jumping_past_ten_fires_only_the_first_milestone() {
        let mut engine = garden();
        let mut t = 0;
        for _ in 0..4 {
            t = grow_and_pick(&mut engine, "fern", 2, t).1;
        }
        assert_eq!(engine.tally().picked_total("fern"), 8);

        let (events, _) = grow_and_pick(&mut engine, "fern", 7, t);
        assert_eq!(engine.tally().picked_total("fern"), 15);
        assert_eq!(shown_kinds(&events), vec![CelebrationKind::Flower]);
    }

    #[test]
    fn reaching_fifty_requests_one_guardian_upsert() {
        let mut engine = garden();
        let mut t = 0;
        for _ in 0..24 {
            t = grow_and_pick(&mut engine, "fern", 2, t).1;
        }
        t = grow_and_pick(&mut engine, "fern", 1, t).1;
        assert_eq!(engine.tally().picked_total("fern"), 49);

        let (events, next) = grow_and_pick(&mut engine, "fern", 1, t);
        assert_eq!(shown_kinds(&events), vec![CelebrationKind::NaturesGuardian]);
        let upserts: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GardenEvent::GuardianAchieved { .. }))
            .collect();
        assert_eq!(
            upserts,
            vec![&GardenEvent::GuardianAchieved {
                username: "fern".to_owned(),
                flower_count: 50,
            }]
        );

        let (later, _) = grow_and_pick(&mut engine, "fern", 1, next);
        assert!(shown_kinds(&later).is_empty());
        assert!(!later.iter().any(|e| matches!(e, GardenEvent::GuardianAchieved { .. })));
    }

    #[test]
    fn jumping_past_fifty_records_the_new_total() {
        let mut engine = garden();
        let mut t = 0;
        for _ in 0..22 {
            t = grow_and_pick(&mut engine, "fern", 2, t).1;
        }
        assert_eq!(engine.tally().picked_total("fern"), 44);

        let (events, _) = grow_and_pick(&mut engine, "fern", 8, t);
        assert_eq!(engine.tally().picked_total("fern"), 52);
        assert_eq!(shown_kinds(&events), vec![CelebrationKind::NaturesGuardian]);
        let upserts: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GardenEvent::GuardianAchieved { .. }))
            .collect();
        assert_eq!(
            upserts,
            vec![&GardenEvent::GuardianAchieved {
                username: "fern".to_owned(),
                flower_count: 52,
            }]
        );
    }

    // -- pick old ----------------------------------------------------------

    #[test]
    fn pick_old_is_idempotent() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        engine.handle(&plant("moss"), at(10 * MINUTE));
        let mod_cmd = Command::PickOld {
            username: "mod".to_owned(),
        };

        assert_eq!(
            rejection(&engine.handle(&mod_cmd, at(30 * MINUTE))),
            Some(RejectionReason::NoOldFlowers)
        );
        let first = engine.handle(&mod_cmd, at(31 * MINUTE));
        assert!(matches!(
            &first[0],
            GardenEvent::FlowersRemoved { ids, cause: RemovalCause::Expired } if ids.len() == 1
        ));
        assert_eq!(engine.flowers().len(), 1);

        let second = engine.handle(&mod_cmd, at(31 * MINUTE));
        assert_eq!(rejection(&second), Some(RejectionReason::NoOldFlowers));
        assert_eq!(engine.flowers().len(), 1);
    }

    // -- growth ------------------------------------------------------------

    #[test]
    fn growth_tick_refreshes_stage_and_reveals_once() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        let mut reveals = 0;
        let mut stages = Vec::new();
        for s in (0..=200).step_by(5) {
            for e in engine.tick(at(s * 1_000)) {
                match e {
                    GardenEvent::FlowerRevealed { annotation } => {
                        reveals += 1;
                        assert!(annotation.text.starts_with("fern's"));
                        assert_eq!(annotation.expires_at, at(s * 1_000 + 3_000));
                    }
                    GardenEvent::FlowerGrew { stage, .. } => stages.push(stage),
                    _ => {}
                }
            }
        }
        assert_eq!(reveals, 1);
        assert_eq!(
            stages,
            vec![
                GrowthStage::Blooming,
                GrowthStage::Small,
                GrowthStage::Medium,
                GrowthStage::FullyMature
            ]
        );
        assert!(engine.reveals().is_empty());
    }

    // -- bunny -------------------------------------------------------------

    #[test]
    fn bunny_eats_the_oldest_mature_flowers() {
        let mut engine = garden();
        for (n, user) in ["a", "b", "c", "d"].iter().enumerate() {
            engine.handle(&plant(user), at(i64::try_from(n).unwrap() * 1_000));
        }
        engine.handle(&plant("young"), at(150_000));

        let start = engine.handle(
            &Command::TestBunnyVisit {
                username: "mod".to_owned(),
            },
            at(160_000),
        );
        let GardenEvent::BunnyArrived { visit } = &start[0] else {
            panic!("expected the bunny to arrive");
        };
        let planned = visit.eaten_count;
        assert!((1..=2).contains(&planned));

        let events = engine.tick(at(170_000));
        assert!(events.contains(&GardenEvent::BunnyPhaseChanged {
            phase: streamgarden_types::BunnyPhase::Eating
        }));
        let removed = events
            .iter()
            .find_map(|e| match e {
                GardenEvent::FlowersRemoved {
                    ids,
                    cause: RemovalCause::EatenByBunny,
                } => Some(ids.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(removed.len(), usize::try_from(planned).unwrap());
        let oldest: Vec<_> = ["a", "b"]
            .iter()
            .take(removed.len())
            .map(|u| u.to_string())
            .collect();
        let eaten_owners: Vec<_> = removed
            .iter()
            .map(|id| id.as_str().split('-').next().unwrap().to_owned())
            .collect();
        assert_eq!(eaten_owners, oldest);
        assert_eq!(engine.flowers().len(), 5 - removed.len());

        // Nothing more is eaten during the rest of the visit.
        let rest = engine.tick(at(180_000));
        assert!(!rest.iter().any(|e| matches!(e, GardenEvent::FlowersRemoved { .. })));
        let end = engine.tick(at(185_000));
        assert!(end.contains(&GardenEvent::BunnyLeft { eaten: planned }));
        assert!(engine.bunny().is_none());
    }

    #[test]
    fn only_one_bunny_at_a_time() {
        let mut engine = garden();
        let cmd = Command::TestBunnyVisit {
            username: "mod".to_owned(),
        };
        let first = engine.handle(&cmd, at(0));
        assert!(matches!(&first[0], GardenEvent::BunnyArrived { visit } if visit.is_weeds_visit()));
        assert_eq!(
            rejection(&engine.handle(&cmd, at(5_000))),
            Some(RejectionReason::BunnyAlreadyVisiting)
        );
        engine.tick(at(25_000));
        assert_eq!(rejection(&engine.handle(&cmd, at(26_000))), None);
    }

    #[test]
    fn automatic_bunny_waits_twenty_minutes() {
        let mut engine = garden_with(GardenRules::default());
        let mut arrivals = Vec::new();
        for s in (0..=45 * 60).step_by(10) {
            let t = s * 1_000;
            if engine
                .tick(at(t))
                .iter()
                .any(|e| matches!(e, GardenEvent::BunnyArrived { .. }))
            {
                arrivals.push(t);
            }
        }
        assert_eq!(arrivals, vec![20 * MINUTE, 40 * MINUTE]);
    }

    // -- reset, hide, spawn, leaderboard ----------------------------------

    #[test]
    fn reset_clears_everything() {
        let mut engine = garden();
        let t = grow_and_pick(&mut engine, "fern", 2, 0).1;
        engine.handle(&plant("moss"), at(t));
        engine.handle(
            &Command::Water {
                username: "moss".to_owned(),
            },
            at(t),
        );
        engine.handle(
            &Command::TriggerCelebration {
                username: "moss".to_owned(),
                kind: CelebrationKind::EasterEgg,
            },
            at(t),
        );
        engine.handle(
            &Command::TestBunnyVisit {
                username: "mod".to_owned(),
            },
            at(t),
        );

        let events = engine.handle(
            &Command::Reset {
                username: "mod".to_owned(),
            },
            at(t + 1_000),
        );
        assert_eq!(
            events,
            vec![GardenEvent::GardenReset {
                username: "mod".to_owned()
            }]
        );
        let snapshot = engine.snapshot(at(t + 1_000));
        assert!(snapshot.flowers.is_empty());
        assert!(snapshot.picked_totals.is_empty());
        assert!(snapshot.bunny.is_none());
        assert!(snapshot.raining_until.is_none());
        assert!(snapshot.celebrations.is_empty());
        assert!(snapshot.activity.is_none());
        assert_eq!(snapshot.water_level, 50);

        // No stale timers fire afterwards.
        let later = engine.tick(at(t + 300_000));
        assert!(!later.iter().any(|e| matches!(
            e,
            GardenEvent::BunnyLeft { .. } | GardenEvent::CelebrationHidden { .. } | GardenEvent::RainStopped {}
        )));
    }

    #[test]
    fn test_spawn_staggers_ages_within_capacity() {
        let mut engine = garden();
        let cmd = Command::SpawnTestFlowers {
            username: "mod".to_owned(),
        };
        engine.handle(&cmd, at(1_000_000));
        let stages: Vec<_> = engine.flowers().iter().map(|f| f.stage).collect();
        assert_eq!(
            stages,
            vec![
                GrowthStage::Sprout,
                GrowthStage::Blooming,
                GrowthStage::Small,
                GrowthStage::Medium,
                GrowthStage::FullyMature,
                GrowthStage::FullyMature
            ]
        );
        assert!(engine.flowers().iter().all(|f| f.id.as_str().starts_with("test-")));
        assert_eq!(engine.tally().planted_since_pick("mod"), 0);

        for _ in 0..3 {
            engine.handle(&cmd, at(1_000_000));
        }
        assert_eq!(engine.flowers().len(), 20);
        assert_eq!(
            rejection(&engine.handle(&cmd, at(1_000_000))),
            Some(RejectionReason::GardenFull)
        );
    }

    #[test]
    fn leaderboard_lists_top_pickers() {
        let mut engine = garden();
        let t = grow_and_pick(&mut engine, "fern", 2, 0).1;
        grow_and_pick(&mut engine, "moss", 1, t);
        let events = engine.handle(
            &Command::RequestLeaderboard {
                username: "ivy".to_owned(),
            },
            at(t),
        );
        let GardenEvent::Leaderboard { entries } = &events[0] else {
            panic!("expected a leaderboard");
        };
        assert_eq!(entries[0].username, "fern");
        assert_eq!(entries[0].picked, 2);
        assert_eq!(entries[1].username, "moss");
        assert_eq!(events[0].name(), "showLeaderboard");
    }

    #[test]
    fn hide_clears_state() {
        let mut engine = garden();
        engine.handle(&plant("fern"), at(0));
        let events = engine.handle(
            &Command::Hide {
                username: "mod".to_owned(),
            },
            at(1_000),
        );
        assert_eq!(events[0].name(), "gardenHidden");
        assert!(engine.flowers().is_empty());
    }
}
