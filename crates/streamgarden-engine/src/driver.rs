//! The garden driver: the single task that owns the engine.
//!
//! Commands arrive from the overlay's queue and ticks from a
//! [`tokio::time::interval`]; each is applied to the engine one at a time,
//! so every read-modify-write is atomic. The engine exists only while the
//! garden is shown: `startGarden` builds it and `hideGarden` drops it,
//! which cancels every pending timer and celebration with it.
//!
//! Every resulting event is broadcast to overlay clients, a
//! `guardianAchieved` event spawns a fire-and-forget guardian upsert, and
//! the published [`GardenView`] is refreshed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use streamgarden_core::config::{GardenRules, OverlayConfig, ScheduleConfig};
use streamgarden_core::{GardenEngine, RandomSource};
use streamgarden_overlay::{AppState, GardenView};
use streamgarden_types::{Command, GardenEvent};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Owns the garden engine while the garden is shown.
pub struct GardenDriver<R: RandomSource> {
    state: Arc<AppState>,
    rules: GardenRules,
    schedule: ScheduleConfig,
    new_rng: Box<dyn FnMut() -> R + Send + Sync>,
    engine: Option<GardenEngine<R>>,
}

impl<R: RandomSource> GardenDriver<R> {
    /// A driver with the garden hidden. `new_rng` seeds each new garden.
    pub fn new<F>(state: Arc<AppState>, config: &OverlayConfig, new_rng: F) -> Self
    where
        F: FnMut() -> R + Send + Sync + 'static,
    {
        Self {
            state,
            rules: config.garden.clone(),
            schedule: config.schedule.clone(),
            new_rng: Box::new(new_rng),
            engine: None,
        }
    }

    /// Whether a garden is running.
    pub const fn is_shown(&self) -> bool {
        self.engine.is_some()
    }

    /// Run until every command sender is gone.
    pub async fn run(mut self, mut queue: mpsc::Receiver<Command>) {
        let period = Duration::from_millis(self.schedule.tick_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(tick_ms = self.schedule.tick_interval_ms, "garden driver running");

        loop {
            tokio::select! {
                command = queue.recv() => {
                    let Some(command) = command else {
                        info!("command queue closed, garden driver stopping");
                        return;
                    };
                    self.on_command(&command, Utc::now()).await;
                }
                _ = ticker.tick() => {
                    if self.is_shown() {
                        self.on_tick(Utc::now()).await;
                    }
                }
            }
        }
    }

    /// Apply one command and publish what it caused.
    pub async fn on_command(&mut self, command: &Command, now: DateTime<Utc>) {
        debug!(command = command.name(), username = command.username(), "command received");
        let events = self.apply(command, now);
        self.dispatch(&events, now).await;
    }

    /// Advance the running garden's timers and publish what changed.
    pub async fn on_tick(&mut self, now: DateTime<Utc>) {
        let events = self
            .engine
            .as_mut()
            .map(|engine| engine.tick(now))
            .unwrap_or_default();
        self.dispatch(&events, now).await;
    }

    fn apply(&mut self, command: &Command, now: DateTime<Utc>) -> Vec<GardenEvent> {
        match command {
            Command::Start { username } if self.engine.is_none() => {
                let rng = (self.new_rng)();
                self.engine = Some(GardenEngine::new(
                    self.rules.clone(),
                    &self.schedule,
                    rng,
                    now,
                ));
                info!(username, "garden started");
                return vec![GardenEvent::GardenShown {
                    username: username.clone(),
                }];
            }
            Command::Hide { username } => {
                if let Some(mut engine) = self.engine.take() {
                    info!(username, "garden hidden");
                    return engine.hide(username, now);
                }
            }
            _ => {}
        }

        match self.engine.as_mut() {
            Some(engine) => engine.handle(command, now),
            None => {
                debug!(command = command.name(), "garden hidden, command ignored");
                Vec::new()
            }
        }
    }

    async fn dispatch(&self, events: &[GardenEvent], now: DateTime<Utc>) {
        for event in events {
            let receivers = self.state.broadcast(event);
            debug!(event = event.name(), receivers, "event broadcast");

            if let GardenEvent::GuardianAchieved {
                username,
                flower_count,
            } = event
            {
                self.record_guardian(username.clone(), *flower_count);
            }
        }

        let view = GardenView {
            visible: self.engine.is_some(),
            snapshot: self.engine.as_ref().map(|engine| engine.snapshot(now)),
        };
        self.state.publish_view(view).await;
    }

    fn record_guardian(&self, username: String, flower_count: u32) {
        let guardians = self.state.guardians.clone();
        tokio::spawn(async move {
            if let Err(e) = guardians.add(&username, Some(flower_count)).await {
                warn!(username, flower_count, error = %e, "guardian upsert failed");
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use streamgarden_core::ScriptedRandom;
    use streamgarden_core::config::{ChatConfig, StreamElementsConfig};
    use streamgarden_store::MemoryGuardianStore;
    use streamgarden_types::EventEnvelope;
    use tokio::sync::broadcast;

    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000_i64.saturating_add(ms)).unwrap_or_default()
    }

    fn setup() -> (
        GardenDriver<ScriptedRandom>,
        Arc<AppState>,
        mpsc::Receiver<Command>,
        MemoryGuardianStore,
    ) {
        let store = MemoryGuardianStore::new();
        let (state, queue) = AppState::new(
            store.clone().into(),
            &ChatConfig::default(),
            StreamElementsConfig::default(),
        );
        let state = Arc::new(state);
        let driver = GardenDriver::new(
            Arc::clone(&state),
            &OverlayConfig::default(),
            ScriptedRandom::default,
        );
        (driver, state, queue, store)
    }

    fn drain(rx: &mut broadcast::Receiver<EventEnvelope>) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            names.push(envelope.event);
        }
        names
    }

    fn start() -> Command {
        Command::Start {
            username: "mod".to_owned(),
        }
    }

    fn plant(username: &str) -> Command {
        Command::Plant {
            username: username.to_owned(),
            flower_type: None,
        }
    }

    #[tokio::test]
    async fn commands_are_ignored_while_hidden() {
        let (mut driver, state, _queue, _store) = setup();
        let mut rx = state.subscribe();

        driver.on_command(&plant("fern"), at(0)).await;

        assert!(!driver.is_shown());
        assert!(drain(&mut rx).is_empty());
        assert!(!state.view().await.visible);
    }

    #[tokio::test]
    async fn start_builds_a_garden_and_publishes_it() {
        let (mut driver, state, _queue, _store) = setup();
        let mut rx = state.subscribe();

        driver.on_command(&start(), at(0)).await;
        driver.on_command(&plant("fern"), at(1_000)).await;

        assert!(driver.is_shown());
        let names = drain(&mut rx);
        assert_eq!(names[0], "gardenShown");
        assert!(names.contains(&"flowerPlanted".to_owned()));

        let view = state.view().await;
        assert!(view.visible);
        assert_eq!(view.snapshot.map(|s| s.flowers.len()), Some(1));
    }

    #[tokio::test]
    async fn hide_drops_the_garden() {
        let (mut driver, state, _queue, _store) = setup();
        let mut rx = state.subscribe();

        driver.on_command(&start(), at(0)).await;
        driver.on_command(&plant("fern"), at(1_000)).await;
        driver
            .on_command(
                &Command::Hide {
                    username: "mod".to_owned(),
                },
                at(2_000),
            )
            .await;

        assert!(!driver.is_shown());
        assert!(drain(&mut rx).contains(&"gardenHidden".to_owned()));
        assert_eq!(state.view().await, GardenView::default());

        // A fresh start begins from an empty garden.
        driver.on_command(&start(), at(3_000)).await;
        let view = state.view().await;
        assert_eq!(view.snapshot.map(|s| s.flowers.len()), Some(0));
    }

    #[tokio::test]
    async fn ticks_do_nothing_while_hidden() {
        let (mut driver, state, _queue, _store) = setup();
        let mut rx = state.subscribe();
        driver.on_tick(at(60_000)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn ticks_grow_flowers() {
        let (mut driver, state, _queue, _store) = setup();
        driver.on_command(&start(), at(0)).await;
        driver.on_command(&plant("fern"), at(0)).await;
        let mut rx = state.subscribe();

        driver.on_tick(at(61_000)).await;

        assert!(drain(&mut rx).contains(&"flowerRevealed".to_owned()));
    }

    #[tokio::test]
    async fn guardian_event_is_recorded_in_the_store() {
        let (driver, _state, _queue, store) = setup();

        driver
            .dispatch(
                &[GardenEvent::GuardianAchieved {
                    username: "fern".to_owned(),
                    flower_count: 50,
                }],
                at(0),
            )
            .await;

        let mut recorded = Vec::new();
        for _ in 0..50 {
            recorded = store.list().await;
            if !recorded.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].username, "fern");
        assert_eq!(recorded[0].flower_count, 50);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn driver_loop_can_be_spawned() {
        let (driver, _state, queue, _store) = setup();
        let run = driver.run(queue);
        assert_send(&run);
    }

    #[tokio::test]
    async fn run_drains_the_queue() {
        let (driver, state, queue, _store) = setup();
        let mut rx = state.subscribe();
        let handle = tokio::spawn(driver.run(queue));

        state.submit(start()).await.unwrap();
        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.event, "gardenShown");

        handle.abort();
    }
}
