#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration: the simulation clock and the controller that owns
//! the world, pumps every system in fixed order, and evaluates the outcome.
//!
//! One call to [`SessionController::advance`] runs at most one tick. Within a
//! tick the phases always execute in the same order: queued input commands,
//! clock advance, wave scheduling, defender actions, attacker movement,
//! projectile movement, combat resolution, economy drops, and finally the
//! end-of-session check. Combat therefore always resolves against the tick's
//! final positions, and input only ever lands on a tick boundary.

use std::time::Duration;

use lane_defence_core::{
    catalog,
    level::LevelConfig,
    Command, DefenderKind, Event, GridCoord, LevelId, Outcome, PickupId, SessionReport,
};
use lane_defence_system_combat::CombatResolver;
use lane_defence_system_defense::DefenseActions;
use lane_defence_system_economy::{Config as EconomyConfig, Economy};
use lane_defence_system_waves::WaveScheduler;
use lane_defence_world::{self as world, query, World};

/// Converts monotonic timestamps into clamped simulation deltas.
///
/// The clock never reads time itself; adapters feed it their own monotonic
/// "now" and receive the delta the simulation should advance by. A stalled
/// frame is clamped to [`SimulationClock::MAX_DELTA`] and the surplus real
/// time is discarded, so gameplay never leaps to catch up.
#[derive(Debug, Default)]
pub struct SimulationClock {
    reference: Option<Duration>,
    paused: bool,
}

impl SimulationClock {
    /// Largest delta a single tick is allowed to simulate.
    pub const MAX_DELTA: Duration = Duration::from_millis(100);

    /// Creates an unpaused clock with no time reference yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock to `now`, yielding the delta to simulate.
    ///
    /// Returns `None` while paused, on the anchoring first observation, and
    /// when no time elapsed since the previous observation.
    pub fn advance(&mut self, now: Duration) -> Option<Duration> {
        if self.paused {
            return None;
        }
        let reference = match self.reference {
            Some(reference) => reference,
            None => {
                self.reference = Some(now);
                return None;
            }
        };
        self.reference = Some(now);
        let dt = now.saturating_sub(reference).min(Self::MAX_DELTA);
        (!dt.is_zero()).then_some(dt)
    }

    /// Stops the clock; subsequent advances yield nothing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restarts a paused clock.
    ///
    /// The time reference is dropped, so the next advance re-anchors it and
    /// the paused span is never simulated.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.reference = None;
        }
    }

    /// Reports whether the clock is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Owns one session: the world, the systems, and the tick pump.
#[derive(Debug)]
pub struct SessionController {
    level_id: LevelId,
    level: LevelConfig,
    seed: u64,
    clock: SimulationClock,
    world: World,
    waves: WaveScheduler,
    defense: DefenseActions,
    combat: CombatResolver,
    economy: Economy,
    pending: Vec<Command>,
    scratch: Vec<Command>,
    tick_events: Vec<Event>,
    events: Vec<Event>,
    outcome: Option<Outcome>,
}

impl SessionController {
    /// Creates a controller ready to run the provided level.
    #[must_use]
    pub fn new(level_id: LevelId, level: LevelConfig, seed: u64) -> Self {
        log::info!(
            "session started: '{}' with {} waves and {} resources",
            level.name,
            level.waves.len(),
            level.initial_resources,
        );
        Self {
            world: World::new(&level),
            waves: WaveScheduler::new(&level),
            defense: DefenseActions::new(),
            combat: CombatResolver::new(),
            economy: Economy::new(EconomyConfig::new(catalog::SKY_DROP_INTERVAL, seed)),
            level_id,
            level,
            seed,
            clock: SimulationClock::new(),
            pending: Vec::new(),
            scratch: Vec::new(),
            tick_events: Vec::new(),
            events: Vec::new(),
            outcome: None,
        }
    }

    /// Queues a placement request for the next tick boundary.
    pub fn place_defender(&mut self, kind: DefenderKind, cell: GridCoord) {
        self.pending.push(Command::PlaceDefender { kind, cell });
    }

    /// Queues a removal request for the next tick boundary.
    pub fn remove_defender(&mut self, cell: GridCoord) {
        self.pending.push(Command::RemoveDefender { cell });
    }

    /// Queues a pickup collection request for the next tick boundary.
    pub fn collect_pickup(&mut self, pickup: PickupId) {
        self.pending.push(Command::CollectPickup { pickup });
    }

    /// Pauses the session; queued requests stay queued until it resumes.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Resumes a paused session without simulating the paused span.
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Reports whether the session is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Advances the session toward `now`, running at most one tick.
    ///
    /// Does nothing once the session has ended.
    pub fn advance(&mut self, now: Duration) {
        if self.outcome.is_some() {
            return;
        }
        if let Some(dt) = self.clock.advance(now) {
            self.run_tick(dt);
        }
    }

    /// Terminal result of the session, once one exists.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Summary of the finished session for persistence and the UI.
    #[must_use]
    pub fn report(&self) -> Option<SessionReport> {
        self.outcome.map(|outcome| SessionReport {
            outcome,
            level: self.level_id,
            attackers_defeated: query::attackers_defeated(&self.world),
            defenders_lost: query::defenders_lost(&self.world),
            duration: query::now(&self.world),
        })
    }

    /// Read-only access to the world for presentation queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The level this session is running.
    #[must_use]
    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    /// Identifier of the level this session is running.
    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    /// Hands the events accumulated since the previous call to the caller.
    #[must_use]
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Rebuilds the session in place for a fresh run of the provided level.
    ///
    /// The session seed is kept, so restarting the same level replays the
    /// same sky-drop schedule.
    pub fn restart(&mut self, level_id: LevelId, level: LevelConfig) {
        *self = Self::new(level_id, level, self.seed);
    }

    fn run_tick(&mut self, dt: Duration) {
        self.tick_events.clear();

        // Input lands ahead of the clock, so a placement requested between
        // ticks exists before the wave and defender phases observe the grid.
        let queued = std::mem::take(&mut self.pending);
        for command in queued {
            world::apply(&mut self.world, command, &mut self.tick_events);
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.tick_events);

        let alive = query::alive_attackers(&self.world);
        self.waves
            .handle(&self.tick_events, alive, &mut self.scratch);
        self.flush_commands();

        let defenders = query::defender_view(&self.world);
        let attackers = query::attacker_view(&self.world);
        self.defense
            .handle(&defenders, &attackers, &mut self.scratch);
        self.flush_commands();

        world::apply(
            &mut self.world,
            Command::StepAttackers { dt },
            &mut self.tick_events,
        );
        world::apply(
            &mut self.world,
            Command::StepProjectiles { dt },
            &mut self.tick_events,
        );

        let projectiles = query::projectile_view(&self.world);
        let attackers = query::attacker_view(&self.world);
        self.combat
            .handle(&projectiles, &attackers, &mut self.scratch);
        self.flush_commands();

        self.economy.handle(&self.tick_events, &mut self.scratch);
        self.flush_commands();

        self.evaluate_end();
        self.events.append(&mut self.tick_events);
    }

    fn flush_commands(&mut self) {
        if self.scratch.is_empty() {
            return;
        }
        let mut commands = std::mem::take(&mut self.scratch);
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.tick_events);
        }
        self.scratch = commands;
    }

    fn evaluate_end(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        // A breach on the same tick the last wave clears still loses.
        let outcome = if query::breached(&self.world) {
            Some(Outcome::Defeat)
        } else if self.waves.is_complete() && query::alive_attackers(&self.world) == 0 {
            Some(Outcome::Victory)
        } else {
            None
        };
        if let Some(outcome) = outcome {
            self.outcome = Some(outcome);
            log::info!(
                "session over: {:?} on '{}' after {:.1}s",
                outcome,
                self.level.name,
                query::now(&self.world).as_secs_f32(),
            );
        }
    }
}
