#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative state for the lane-defence simulation.
//!
//! The world owns every entity on the playfield and mutates exclusively in
//! response to [`Command`] values, broadcasting [`Event`] values describing
//! what actually changed. Systems and adapters never reach into world state
//! directly; they observe it through the read-only functions in [`query`].
//!
//! Entities killed by a command stay in storage with a cleared alive flag
//! until the next [`Command::Tick`] compacts them. Queries filter on the
//! flag, so a death is invisible from the moment it happens.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use lane_defence_core::{
    catalog::{self, DefenderBehavior},
    level::{LevelConfig, LevelModifiers},
    playfield, AttackerId, AttackerKind, Command, DefenderId, DefenderKind, DropSource, Event,
    GridCoord, Lane, PickupId, PlacementError, ProjectileId, ProjectileKind, RemovalError,
    SlowPayload,
};

mod defenders;

use crate::defenders::{DefenderRegistry, OccupancyGrid};

/// Applies a command to the world, appending resulting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::StepAttackers { dt } => world.step_attackers(dt, out_events),
        Command::StepProjectiles { dt } => world.step_projectiles(dt, out_events),
        Command::PlaceDefender { kind, cell } => world.place_defender(kind, cell, out_events),
        Command::RemoveDefender { cell } => world.remove_defender(cell, out_events),
        Command::SpawnAttacker { kind, lane } => world.spawn_attacker(kind, lane, out_events),
        Command::FireProjectile { defender } => world.fire_projectile(defender, out_events),
        Command::ProduceResource { defender } => world.produce_resource(defender, out_events),
        Command::Detonate { defender } => world.detonate(defender, out_events),
        Command::HitAttacker {
            projectile,
            attacker,
        } => world.hit_attacker(projectile, attacker, out_events),
        Command::DropResource { cell } => world.drop_resource(cell, out_events),
        Command::CollectPickup { pickup } => world.collect_pickup(pickup, out_events),
        Command::AnnounceWave {
            index,
            total,
            final_wave,
        } => out_events.push(Event::WaveAnnounced {
            index,
            total,
            final_wave,
        }),
    }
}

/// Read-only queries over world state.
pub mod query {
    use std::time::Duration;

    use lane_defence_core::{
        catalog, AttackerSnapshot, AttackerView, DefenderId, DefenderKind, DefenderSnapshot,
        DefenderView, GridCoord, PickupSnapshot, PickupView, ProjectileSnapshot, ProjectileView,
    };

    use crate::World;

    /// Captures a snapshot of every defender on the grid.
    #[must_use]
    pub fn defender_view(world: &World) -> DefenderView {
        let snapshots = world
            .defenders
            .iter()
            .map(|state| DefenderSnapshot {
                id: state.id,
                kind: state.kind,
                cell: state.cell,
                health: state.health,
                max_health: state.max_health,
                ready_in: state.ready_in(world.now),
            })
            .collect();
        DefenderView::from_snapshots(snapshots)
    }

    /// Captures a snapshot of every alive attacker.
    #[must_use]
    pub fn attacker_view(world: &World) -> AttackerView {
        let snapshots = world
            .attackers
            .iter()
            .filter(|attacker| attacker.alive)
            .map(|attacker| AttackerSnapshot {
                id: attacker.id,
                kind: attacker.kind,
                lane: attacker.lane,
                position: attacker.position,
                health: attacker.health,
                max_health: attacker.max_health,
                slow_multiplier: attacker.slow_multiplier,
            })
            .collect();
        AttackerView::from_snapshots(snapshots)
    }

    /// Captures a snapshot of every alive projectile.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots = world
            .projectiles
            .iter()
            .filter(|projectile| projectile.alive)
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                kind: projectile.kind,
                lane: projectile.lane,
                position: projectile.position,
                damage: projectile.damage,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Captures a snapshot of every uncollected pickup.
    #[must_use]
    pub fn pickup_view(world: &World) -> PickupView {
        let snapshots = world
            .pickups
            .iter()
            .filter(|pickup| pickup.alive)
            .map(|pickup| PickupSnapshot {
                id: pickup.id,
                cell: pickup.cell,
                amount: pickup.amount,
                expires_at: pickup.expires_at,
            })
            .collect();
        PickupView::from_snapshots(snapshots)
    }

    /// Current resource pool total.
    #[must_use]
    pub fn resources(world: &World) -> u32 {
        world.resources
    }

    /// Total simulated time elapsed since the session started.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Number of attackers currently alive on the playfield.
    #[must_use]
    pub fn alive_attackers(world: &World) -> usize {
        world
            .attackers
            .iter()
            .filter(|attacker| attacker.alive)
            .count()
    }

    /// Reports whether any attacker has crossed the defended boundary.
    #[must_use]
    pub fn breached(world: &World) -> bool {
        world.breached
    }

    /// Identifier of the defender occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: GridCoord) -> Option<DefenderId> {
        world.defenders.occupant(cell)
    }

    /// Reports whether the pool covers the kind's cost with its cooldown elapsed.
    #[must_use]
    pub fn can_afford(world: &World, kind: DefenderKind) -> bool {
        let profile = catalog::defender_profile(kind);
        let cost = world.modifiers.effective_cost(kind, profile.cost);
        world.resources >= cost && cooldown_remaining(world, kind).is_zero()
    }

    /// Time left before the provided kind may be placed again.
    #[must_use]
    pub fn cooldown_remaining(world: &World, kind: DefenderKind) -> Duration {
        world
            .cooldown_until
            .get(&kind)
            .map_or(Duration::ZERO, |until| until.saturating_sub(world.now))
    }

    /// Number of attackers that died during the session so far.
    #[must_use]
    pub fn attackers_defeated(world: &World) -> u32 {
        world.attackers_defeated
    }

    /// Number of defenders lost to attacker damage so far.
    #[must_use]
    pub fn defenders_lost(world: &World) -> u32 {
        world.defenders_lost
    }
}

/// Complete authoritative state of one simulation session.
#[derive(Debug)]
pub struct World {
    now: Duration,
    resources: u32,
    allowed_kinds: Vec<DefenderKind>,
    modifiers: LevelModifiers,
    cooldown_until: BTreeMap<DefenderKind, Duration>,
    defenders: DefenderRegistry,
    attackers: Vec<Attacker>,
    next_attacker_id: AttackerId,
    projectiles: Vec<Projectile>,
    next_projectile_id: ProjectileId,
    pickups: Vec<Pickup>,
    next_pickup_id: PickupId,
    pending_credits: VecDeque<PendingCredit>,
    breached: bool,
    attackers_defeated: u32,
    defenders_lost: u32,
}

impl World {
    /// Creates a fresh world initialized from the provided level.
    #[must_use]
    pub fn new(level: &LevelConfig) -> Self {
        Self {
            now: Duration::ZERO,
            resources: level.initial_resources,
            allowed_kinds: level.allowed_kinds.clone(),
            modifiers: level.modifiers.clone(),
            cooldown_until: BTreeMap::new(),
            defenders: DefenderRegistry::new(),
            attackers: Vec::new(),
            next_attacker_id: AttackerId::new(0),
            projectiles: Vec::new(),
            next_projectile_id: ProjectileId::new(0),
            pickups: Vec::new(),
            next_pickup_id: PickupId::new(0),
            pending_credits: VecDeque::new(),
            breached: false,
            attackers_defeated: 0,
            defenders_lost: 0,
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.now = self.now.saturating_add(dt);
        let now = self.now;
        out_events.push(Event::TimeAdvanced { now, dt });

        // Compact entities that finished dying during the previous tick.
        self.attackers.retain(|attacker| attacker.alive);
        self.projectiles.retain(|projectile| projectile.alive);
        self.pickups.retain(|pickup| pickup.alive);

        // Settle deferred credits whose delay elapsed, oldest first.
        while let Some(credit) = self.pending_credits.front().copied() {
            if credit.due > now {
                break;
            }
            let _ = self.pending_credits.pop_front();
            self.resources = self.resources.saturating_add(credit.amount);
            out_events.push(Event::ResourceCredited {
                amount: credit.amount,
                pool: self.resources,
            });
        }

        for pickup in &mut self.pickups {
            if pickup.alive && now >= pickup.expires_at {
                pickup.alive = false;
                out_events.push(Event::PickupExpired { pickup: pickup.id });
            }
        }
    }

    fn step_attackers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let now = self.now;
        let dt_secs = dt.as_secs_f32();
        for index in 0..self.attackers.len() {
            if !self.attackers[index].alive {
                continue;
            }
            let profile = catalog::attacker_profile(self.attackers[index].kind);

            // An elapsed slow wears off before the attacker acts.
            if let Some(until) = self.attackers[index].slow_until {
                if now >= until {
                    self.attackers[index].slow_until = None;
                    self.attackers[index].slow_multiplier = 1.0;
                }
            }

            // Engagement is re-evaluated from the current cell every step, so
            // a defender dying or being removed releases its attacker without
            // extra bookkeeping.
            let lane = self.attackers[index].lane;
            let position = self.attackers[index].position;
            let target = playfield::cell_at(lane.row(), position)
                .and_then(|cell| self.defenders.occupant(cell));

            if let Some(defender) = target {
                let due = match self.attackers[index].last_strike {
                    None => true,
                    Some(last) => now.saturating_sub(last) >= profile.attack_interval,
                };
                if due {
                    self.attackers[index].last_strike = Some(now);
                    let attacker = self.attackers[index].id;
                    if let Some(outcome) = self.defenders.damage(defender, profile.damage) {
                        out_events.push(Event::DefenderStruck {
                            defender,
                            attacker,
                            damage: profile.damage,
                            health: outcome.health,
                        });
                        if let Some((kind, cell)) = outcome.destroyed {
                            self.defenders_lost = self.defenders_lost.saturating_add(1);
                            out_events.push(Event::DefenderDied {
                                defender,
                                kind,
                                cell,
                            });
                        }
                    }
                }
                continue;
            }

            let speed = profile.speed * self.attackers[index].slow_multiplier;
            self.attackers[index].position -= speed * dt_secs;
            if self.attackers[index].position < playfield::defence_line() {
                self.attackers[index].alive = false;
                let attacker = self.attackers[index].id;
                out_events.push(Event::AttackerExited { attacker, lane });
                if !self.breached {
                    self.breached = true;
                    out_events.push(Event::DefencesBreached { lane });
                }
            }
        }
    }

    fn step_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let distance = catalog::PROJECTILE_SPEED * dt.as_secs_f32();
        for projectile in &mut self.projectiles {
            if !projectile.alive {
                continue;
            }
            projectile.position += distance;
            if projectile.position > playfield::projectile_bound() {
                projectile.alive = false;
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
            }
        }
    }

    fn place_defender(&mut self, kind: DefenderKind, cell: GridCoord, out_events: &mut Vec<Event>) {
        if !self.allowed_kinds.contains(&kind) {
            out_events.push(Event::PlacementRejected {
                kind,
                cell,
                reason: PlacementError::InvalidKind,
            });
            return;
        }
        if !OccupancyGrid::in_bounds(cell) {
            out_events.push(Event::PlacementRejected {
                kind,
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return;
        }
        if self.defenders.occupant(cell).is_some() {
            out_events.push(Event::PlacementRejected {
                kind,
                cell,
                reason: PlacementError::SlotOccupied,
            });
            return;
        }
        let profile = catalog::defender_profile(kind);
        let cost = self.modifiers.effective_cost(kind, profile.cost);
        if self.resources < cost {
            out_events.push(Event::PlacementRejected {
                kind,
                cell,
                reason: PlacementError::InsufficientResources,
            });
            return;
        }
        if let Some(until) = self.cooldown_until.get(&kind) {
            if self.now < *until {
                out_events.push(Event::PlacementRejected {
                    kind,
                    cell,
                    reason: PlacementError::OnCooldown,
                });
                return;
            }
        }

        // All checks passed; the spend and the construction are one step.
        self.resources -= cost;
        let cooldown = self.modifiers.effective_cooldown(kind, profile.cooldown);
        let _ = self.cooldown_until.insert(kind, self.now + cooldown);
        let defender = self.defenders.place(kind, cell, self.now);
        out_events.push(Event::ResourceSpent {
            kind,
            amount: cost,
            pool: self.resources,
        });
        out_events.push(Event::DefenderPlaced {
            defender,
            kind,
            cell,
        });
    }

    fn remove_defender(&mut self, cell: GridCoord, out_events: &mut Vec<Event>) {
        if !OccupancyGrid::in_bounds(cell) {
            out_events.push(Event::RemovalRejected {
                cell,
                reason: RemovalError::OutOfBounds,
            });
            return;
        }
        let defender = match self.defenders.occupant(cell) {
            Some(defender) => defender,
            None => {
                out_events.push(Event::RemovalRejected {
                    cell,
                    reason: RemovalError::SlotEmpty,
                });
                return;
            }
        };
        // Manual removal refunds nothing and is not a combat loss.
        let _ = self.defenders.remove(defender);
        out_events.push(Event::DefenderRemoved { defender, cell });
    }

    fn spawn_attacker(&mut self, kind: AttackerKind, lane: Lane, out_events: &mut Vec<Event>) {
        if lane.row() >= playfield::GRID_ROWS {
            return;
        }
        let profile = catalog::attacker_profile(kind);
        let health = self.modifiers.scaled_attacker_health(profile.health);
        let id = self.next_attacker_id;
        self.next_attacker_id = AttackerId::new(id.get().wrapping_add(1));
        let position = playfield::attacker_entry();
        self.attackers.push(Attacker {
            id,
            kind,
            lane,
            position,
            health,
            max_health: health,
            slow_multiplier: 1.0,
            slow_until: None,
            last_strike: None,
            alive: true,
        });
        out_events.push(Event::AttackerSpawned {
            attacker: id,
            kind,
            lane,
            position,
        });
    }

    fn fire_projectile(&mut self, defender: DefenderId, out_events: &mut Vec<Event>) {
        let state = match self.defenders.state(defender) {
            Some(state) => state,
            None => return,
        };
        let profile = catalog::defender_profile(state.kind);
        let (kind, slow) = match profile.behavior {
            DefenderBehavior::Shooter { projectile, slow } => (projectile, slow),
            _ => return,
        };
        if state.ready_in(self.now) != Some(Duration::ZERO) {
            return;
        }
        let cell = state.cell;
        let lane = cell.lane();
        // A stale order fizzles if the lane emptied since the system looked.
        if !self
            .attackers
            .iter()
            .any(|attacker| attacker.alive && attacker.lane == lane)
        {
            return;
        }

        if let Some(state) = self.defenders.state_mut(defender) {
            state.last_action = Some(self.now);
        }
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        let position = playfield::cell_center(cell.column()) + playfield::MUZZLE_OFFSET;
        self.projectiles.push(Projectile {
            id,
            kind,
            lane,
            position,
            damage: profile.damage,
            slow,
            alive: true,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            kind,
            lane,
            position,
        });
    }

    fn produce_resource(&mut self, defender: DefenderId, out_events: &mut Vec<Event>) {
        let (amount, cell) = match self.defenders.state(defender) {
            Some(state) => match catalog::defender_profile(state.kind).behavior {
                DefenderBehavior::Producer { amount, .. }
                    if state.ready_in(self.now) == Some(Duration::ZERO) =>
                {
                    (amount, state.cell)
                }
                _ => return,
            },
            None => return,
        };
        if let Some(state) = self.defenders.state_mut(defender) {
            state.last_action = Some(self.now);
        }
        self.spawn_pickup(amount, cell, DropSource::Producer(defender), out_events);
    }

    fn detonate(&mut self, defender: DefenderId, out_events: &mut Vec<Event>) {
        let (radius, damage, cell) = match self.defenders.state(defender) {
            Some(state) => {
                let profile = catalog::defender_profile(state.kind);
                match profile.behavior {
                    DefenderBehavior::Detonator { blast_radius }
                        if state.ready_in(self.now) == Some(Duration::ZERO) =>
                    {
                        (blast_radius, profile.damage, state.cell)
                    }
                    _ => return,
                }
            }
            None => return,
        };

        // Detonation consumes the defender without counting as a loss.
        let _ = self.defenders.remove(defender);
        out_events.push(Event::DefenderDetonated { defender, cell });

        for attacker in &mut self.attackers {
            if !attacker.alive {
                continue;
            }
            // Attackers outside the grid have no cell and escape the blast.
            let within = playfield::cell_at(attacker.lane.row(), attacker.position)
                .map_or(false, |attacker_cell| {
                    attacker_cell.chebyshev_distance(cell) <= radius
                });
            if !within {
                continue;
            }
            attacker.health = attacker.health.saturating_sub(damage);
            out_events.push(Event::AttackerBlasted {
                attacker: attacker.id,
                defender,
                damage,
                health: attacker.health,
            });
            if attacker.health == 0 {
                attacker.alive = false;
                self.attackers_defeated = self.attackers_defeated.saturating_add(1);
                out_events.push(Event::AttackerDied {
                    attacker: attacker.id,
                    kind: attacker.kind,
                    lane: attacker.lane,
                });
            }
        }
    }

    fn hit_attacker(
        &mut self,
        projectile: ProjectileId,
        attacker: AttackerId,
        out_events: &mut Vec<Event>,
    ) {
        let projectile_index = match self
            .projectiles
            .iter()
            .position(|candidate| candidate.alive && candidate.id == projectile)
        {
            Some(index) => index,
            None => return,
        };
        let attacker_index = match self
            .attackers
            .iter()
            .position(|candidate| candidate.alive && candidate.id == attacker)
        {
            Some(index) => index,
            None => return,
        };

        let damage = self.projectiles[projectile_index].damage;
        let slow = self.projectiles[projectile_index].slow;
        self.projectiles[projectile_index].alive = false;

        let now = self.now;
        let target = &mut self.attackers[attacker_index];
        target.health = target.health.saturating_sub(damage);
        out_events.push(Event::AttackerHit {
            attacker,
            projectile,
            damage,
            health: target.health,
        });
        if target.health == 0 {
            target.alive = false;
            out_events.push(Event::AttackerDied {
                attacker,
                kind: target.kind,
                lane: target.lane,
            });
            self.attackers_defeated = self.attackers_defeated.saturating_add(1);
            return;
        }
        if let Some(payload) = slow {
            // Reapplication restarts the timer; the newest payload wins.
            let until = now + payload.duration();
            target.slow_multiplier = 1.0 - payload.fraction();
            target.slow_until = Some(until);
            out_events.push(Event::AttackerSlowed {
                attacker,
                multiplier: target.slow_multiplier,
                until,
            });
        }
    }

    fn drop_resource(&mut self, cell: GridCoord, out_events: &mut Vec<Event>) {
        if !OccupancyGrid::in_bounds(cell) {
            return;
        }
        self.spawn_pickup(catalog::SKY_DROP_AMOUNT, cell, DropSource::Sky, out_events);
    }

    fn collect_pickup(&mut self, pickup: PickupId, out_events: &mut Vec<Event>) {
        let amount = match self
            .pickups
            .iter_mut()
            .find(|candidate| candidate.alive && candidate.id == pickup)
        {
            Some(found) => {
                found.alive = false;
                found.amount
            }
            None => return,
        };
        self.pending_credits.push_back(PendingCredit {
            due: self.now + catalog::CREDIT_DELAY,
            amount,
        });
        out_events.push(Event::PickupCollected { pickup });
    }

    fn spawn_pickup(
        &mut self,
        amount: u32,
        cell: GridCoord,
        source: DropSource,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.next_pickup_id;
        self.next_pickup_id = PickupId::new(id.get().wrapping_add(1));
        self.pickups.push(Pickup {
            id,
            cell,
            amount,
            expires_at: self.now + catalog::PICKUP_LIFETIME,
            alive: true,
        });
        out_events.push(Event::ResourceDropped {
            pickup: id,
            amount,
            cell,
            source,
        });
    }
}

#[derive(Debug)]
struct Attacker {
    id: AttackerId,
    kind: AttackerKind,
    lane: Lane,
    position: f32,
    health: u32,
    max_health: u32,
    slow_multiplier: f32,
    slow_until: Option<Duration>,
    last_strike: Option<Duration>,
    alive: bool,
}

#[derive(Debug)]
struct Projectile {
    id: ProjectileId,
    kind: ProjectileKind,
    lane: Lane,
    position: f32,
    damage: u32,
    slow: Option<SlowPayload>,
    alive: bool,
}

#[derive(Debug)]
struct Pickup {
    id: PickupId,
    cell: GridCoord,
    amount: u32,
    expires_at: Duration,
    alive: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingCredit {
    due: Duration,
    amount: u32,
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use lane_defence_core::{
        level::{LevelConfig, LevelModifiers},
        playfield, AttackerId, AttackerKind, Command, DefenderId, DefenderKind, Event, GridCoord,
        Lane, PickupId, PlacementError, ProjectileId, RemovalError,
    };
    use std::time::Duration;

    fn test_level() -> LevelConfig {
        LevelConfig {
            name: String::from("test level"),
            initial_resources: 200,
            allowed_kinds: vec![
                DefenderKind::Sunflower,
                DefenderKind::Peashooter,
                DefenderKind::Wallnut,
                DefenderKind::Snowpea,
                DefenderKind::Cherrybomb,
            ],
            wave_interval: Duration::from_secs(20),
            waves: Vec::new(),
            modifiers: LevelModifiers::default(),
        }
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn tick(world: &mut World, dt: Duration) -> Vec<Event> {
        run(world, Command::Tick { dt })
    }

    fn placed_id(events: &[Event]) -> DefenderId {
        events
            .iter()
            .find_map(|event| match event {
                Event::DefenderPlaced { defender, .. } => Some(*defender),
                _ => None,
            })
            .expect("placement succeeded")
    }

    fn spawned_id(events: &[Event]) -> AttackerId {
        events
            .iter()
            .find_map(|event| match event {
                Event::AttackerSpawned { attacker, .. } => Some(*attacker),
                _ => None,
            })
            .expect("attacker spawned")
    }

    fn fired_id(events: &[Event]) -> ProjectileId {
        events
            .iter()
            .find_map(|event| match event {
                Event::ProjectileFired { projectile, .. } => Some(*projectile),
                _ => None,
            })
            .expect("projectile fired")
    }

    fn dropped_id(events: &[Event]) -> PickupId {
        events
            .iter()
            .find_map(|event| match event {
                Event::ResourceDropped { pickup, .. } => Some(*pickup),
                _ => None,
            })
            .expect("pickup dropped")
    }

    fn strike(events: &[Event]) -> Option<(DefenderId, u32)> {
        events.iter().find_map(|event| match event {
            Event::DefenderStruck {
                defender, health, ..
            } => Some((*defender, *health)),
            _ => None,
        })
    }

    fn assert_rejected(events: &[Event], expected: PlacementError) {
        assert!(events.iter().any(|event| matches!(
            event,
            Event::PlacementRejected { reason, .. } if *reason == expected
        )));
    }

    #[test]
    fn placement_spends_and_occupies() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 0),
            },
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::DefenderPlaced { .. })));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ResourceSpent {
                amount: 100,
                pool: 100,
                ..
            }
        )));
        assert_eq!(query::resources(&world), 100);
        assert!(query::occupant(&world, GridCoord::new(0, 0)).is_some());
    }

    #[test]
    fn placement_rejections_report_the_first_failing_check() {
        let mut level = test_level();
        level.allowed_kinds = vec![DefenderKind::Peashooter];
        let mut world = World::new(&level);

        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Snowpea,
                cell: GridCoord::new(0, 0),
            },
        );
        assert_rejected(&events, PlacementError::InvalidKind);

        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(5, 0),
            },
        );
        assert_rejected(&events, PlacementError::OutOfBounds);

        let _ = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 0),
            },
        );
        // Occupancy is checked before the still-running cooldown.
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 0),
            },
        );
        assert_rejected(&events, PlacementError::SlotOccupied);
    }

    #[test]
    fn failed_placement_deducts_nothing() {
        let mut level = test_level();
        level.initial_resources = 99;
        let mut world = World::new(&level);
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(2, 1),
            },
        );
        assert_rejected(&events, PlacementError::InsufficientResources);
        assert_eq!(query::resources(&world), 99);
        assert!(query::occupant(&world, GridCoord::new(2, 1)).is_none());
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let mut world = World::new(&test_level());
        let _ = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 0),
            },
        );
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 1),
            },
        );
        assert_rejected(&events, PlacementError::OnCooldown);

        let _ = tick(&mut world, Duration::from_secs(5));
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 1),
            },
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::DefenderPlaced { .. })));
        assert_eq!(query::resources(&world), 0);
    }

    #[test]
    fn affordability_requires_both_funds_and_an_elapsed_cooldown() {
        let mut world = World::new(&test_level());
        assert!(query::can_afford(&world, DefenderKind::Peashooter));
        let _ = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 0),
            },
        );
        assert!(!query::can_afford(&world, DefenderKind::Peashooter));
        let _ = tick(&mut world, Duration::from_secs(5));
        assert!(query::can_afford(&world, DefenderKind::Peashooter));
        assert!(!query::can_afford(&world, DefenderKind::Snowpea));
    }

    #[test]
    fn manual_removal_frees_the_slot_without_refund() {
        let mut world = World::new(&test_level());
        let _ = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Wallnut,
                cell: GridCoord::new(4, 1),
            },
        );
        assert_eq!(query::resources(&world), 150);
        let events = run(
            &mut world,
            Command::RemoveDefender {
                cell: GridCoord::new(4, 1),
            },
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::DefenderRemoved { .. })));
        assert_eq!(query::resources(&world), 150);
        assert_eq!(query::defenders_lost(&world), 0);

        let events = run(
            &mut world,
            Command::RemoveDefender {
                cell: GridCoord::new(4, 1),
            },
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::RemovalRejected {
                reason: RemovalError::SlotEmpty,
                ..
            }
        )));
    }

    #[test]
    fn attackers_march_at_catalog_speed() {
        let mut world = World::new(&test_level());
        let _ = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(2),
            },
        );
        let start = playfield::attacker_entry();
        let _ = tick(&mut world, Duration::from_secs(1));
        let _ = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_secs(1),
            },
        );
        let view = query::attacker_view(&world);
        let snapshot = view.iter().next().expect("attacker is alive");
        assert!((snapshot.position - (start - 30.0)).abs() < 1e-3);
    }

    #[test]
    fn engaged_attackers_strike_immediately_then_hold_cadence() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Wallnut,
                cell: GridCoord::new(0, 2),
            },
        );
        let defender = placed_id(&events);
        let _ = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(0),
            },
        );

        // First step only walks the attacker into the wall's cell.
        let _ = tick(&mut world, Duration::from_secs(2));
        let events = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_secs(2),
            },
        );
        assert_eq!(strike(&events), None);

        // Contact: the first strike lands without waiting an interval.
        let _ = tick(&mut world, Duration::from_millis(100));
        let events = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_millis(100),
            },
        );
        assert_eq!(strike(&events), Some((defender, 580)));

        // Half an interval later nothing lands, and the attacker holds
        // position instead of walking through the wall.
        let _ = tick(&mut world, Duration::from_millis(500));
        let events = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_millis(500),
            },
        );
        assert_eq!(strike(&events), None);

        let _ = tick(&mut world, Duration::from_millis(500));
        let events = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_millis(500),
            },
        );
        assert_eq!(strike(&events), Some((defender, 560)));

        let view = query::attacker_view(&world);
        let snapshot = view.iter().next().expect("attacker is alive");
        assert!((snapshot.position - 275.0).abs() < 1e-3);
    }

    #[test]
    fn defender_death_frees_the_slot_and_counts_one_loss() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Cherrybomb,
                cell: GridCoord::new(0, 2),
            },
        );
        let defender = placed_id(&events);
        let _ = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(0),
            },
        );

        let _ = tick(&mut world, Duration::from_secs(2));
        let _ = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_secs(2),
            },
        );
        let mut died = false;
        for _ in 0..3 {
            let _ = tick(&mut world, Duration::from_secs(1));
            let events = run(
                &mut world,
                Command::StepAttackers {
                    dt: Duration::from_secs(1),
                },
            );
            died |= events.iter().any(|event| {
                matches!(event, Event::DefenderDied { defender: dead, .. } if *dead == defender)
            });
        }
        assert!(died);
        assert_eq!(query::defenders_lost(&world), 1);
        assert!(query::occupant(&world, GridCoord::new(0, 2)).is_none());
    }

    #[test]
    fn first_boundary_crossing_raises_the_breach_flag_once() {
        let mut world = World::new(&test_level());
        let _ = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(0),
            },
        );
        let _ = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(4),
            },
        );
        let mut breaches = 0;
        let mut exits = 0;
        for _ in 0..20 {
            let _ = tick(&mut world, Duration::from_secs(1));
            let events = run(
                &mut world,
                Command::StepAttackers {
                    dt: Duration::from_secs(1),
                },
            );
            breaches += events
                .iter()
                .filter(|event| matches!(event, Event::DefencesBreached { .. }))
                .count();
            exits += events
                .iter()
                .filter(|event| matches!(event, Event::AttackerExited { .. }))
                .count();
        }
        assert_eq!(exits, 2);
        assert_eq!(breaches, 1);
        assert!(query::breached(&world));
        assert_eq!(query::alive_attackers(&world), 0);
    }

    #[test]
    fn detonation_hits_adjacent_rows_but_not_beyond() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Cherrybomb,
                cell: GridCoord::new(2, 1),
            },
        );
        let defender = placed_id(&events);
        for row in 0..playfield::GRID_ROWS {
            let _ = run(
                &mut world,
                Command::SpawnAttacker {
                    kind: AttackerKind::Normal,
                    lane: Lane::new(row),
                },
            );
        }

        // Walk every attacker onto the grid while the fuse burns.
        let _ = tick(&mut world, Duration::from_secs(2));
        let _ = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_secs(2),
            },
        );
        let events = run(&mut world, Command::Detonate { defender });
        assert!(events.is_empty());

        let _ = tick(&mut world, Duration::from_secs(1));
        let _ = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_secs(1),
            },
        );
        let events = run(&mut world, Command::Detonate { defender });
        let deaths: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                Event::AttackerDied { lane, .. } => Some(lane.row()),
                _ => None,
            })
            .collect();
        assert_eq!(deaths, vec![1, 2, 3]);
        assert_eq!(query::alive_attackers(&world), 2);
        assert_eq!(query::attackers_defeated(&world), 3);
        assert!(query::occupant(&world, GridCoord::new(2, 1)).is_none());
    }

    #[test]
    fn projectiles_fly_and_expire_past_the_bound() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(0, 0),
            },
        );
        let defender = placed_id(&events);

        // No target in the lane: the order fizzles without cost.
        let events = run(&mut world, Command::FireProjectile { defender });
        assert!(events.is_empty());

        let _ = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(0),
            },
        );
        let events = run(&mut world, Command::FireProjectile { defender });
        let _ = fired_id(&events);
        let view = query::projectile_view(&world);
        let position = view.iter().next().expect("projectile is alive").position;
        assert!((position - 75.0).abs() < 1e-3);

        // Firing again before the interval elapses fizzles too.
        let events = run(&mut world, Command::FireProjectile { defender });
        assert!(events.is_empty());

        let _ = run(
            &mut world,
            Command::StepProjectiles {
                dt: Duration::from_secs(1),
            },
        );
        let view = query::projectile_view(&world);
        let position = view.iter().next().expect("projectile is alive").position;
        assert!((position - 275.0).abs() < 1e-3);

        let events = run(
            &mut world,
            Command::StepProjectiles {
                dt: Duration::from_secs(1),
            },
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileExpired { .. })));
        assert!(query::projectile_view(&world).iter().next().is_none());
    }

    #[test]
    fn lethal_hits_count_toward_defeated_attackers() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Peashooter,
                cell: GridCoord::new(2, 0),
            },
        );
        let defender = placed_id(&events);
        let events = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(2),
            },
        );
        let attacker = spawned_id(&events);

        let mut hits = 0;
        for _ in 0..10 {
            let _ = tick(&mut world, Duration::from_secs(2));
            let events = run(&mut world, Command::FireProjectile { defender });
            let projectile = fired_id(&events);
            let events = run(&mut world, Command::HitAttacker { projectile, attacker });
            hits += 1;
            if events
                .iter()
                .any(|event| matches!(event, Event::AttackerDied { .. }))
            {
                break;
            }
        }
        assert_eq!(hits, 10);
        assert_eq!(query::attackers_defeated(&world), 1);
        assert_eq!(query::alive_attackers(&world), 0);

        // With the lane empty again, further fire orders fizzle.
        let _ = tick(&mut world, Duration::from_secs(2));
        let events = run(&mut world, Command::FireProjectile { defender });
        assert!(events.is_empty());
    }

    #[test]
    fn slow_halves_speed_then_expires_on_schedule() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Snowpea,
                cell: GridCoord::new(1, 0),
            },
        );
        let defender = placed_id(&events);
        let events = run(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::Normal,
                lane: Lane::new(1),
            },
        );
        let attacker = spawned_id(&events);
        let events = run(&mut world, Command::FireProjectile { defender });
        let projectile = fired_id(&events);
        let events = run(&mut world, Command::HitAttacker { projectile, attacker });
        assert!(events.iter().any(|event| matches!(
            event,
            Event::AttackerSlowed { multiplier, .. } if (*multiplier - 0.5).abs() < 1e-6
        )));

        // Still halved just before the deadline.
        let _ = tick(&mut world, Duration::from_millis(2999));
        let _ = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_millis(2999),
            },
        );
        let view = query::attacker_view(&world);
        let snapshot = view.iter().next().expect("attacker is alive");
        assert!((snapshot.slow_multiplier - 0.5).abs() < 1e-6);

        // Restored once the deadline passes.
        let _ = tick(&mut world, Duration::from_millis(2));
        let _ = run(
            &mut world,
            Command::StepAttackers {
                dt: Duration::from_millis(2),
            },
        );
        let view = query::attacker_view(&world);
        let snapshot = view.iter().next().expect("attacker is alive");
        assert!((snapshot.slow_multiplier - 1.0).abs() < 1e-6);
    }

    #[test]
    fn collected_pickups_credit_after_the_deferral() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::Sunflower,
                cell: GridCoord::new(3, 0),
            },
        );
        let defender = placed_id(&events);
        assert_eq!(query::resources(&world), 150);

        // The first yield waits a full interval from placement.
        let _ = tick(&mut world, Duration::from_secs(14));
        let events = run(&mut world, Command::ProduceResource { defender });
        assert!(events.is_empty());

        let _ = tick(&mut world, Duration::from_secs(1));
        let events = run(&mut world, Command::ProduceResource { defender });
        let pickup = dropped_id(&events);

        let events = run(&mut world, Command::CollectPickup { pickup });
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::PickupCollected { .. })));
        assert!(query::pickup_view(&world).iter().next().is_none());
        assert_eq!(query::resources(&world), 150);

        // Double collection is inert.
        let events = run(&mut world, Command::CollectPickup { pickup });
        assert!(events.is_empty());

        let _ = tick(&mut world, Duration::from_millis(499));
        assert_eq!(query::resources(&world), 150);
        let events = tick(&mut world, Duration::from_millis(1));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ResourceCredited {
                amount: 50,
                pool: 200,
            }
        )));
        assert_eq!(query::resources(&world), 200);
    }

    #[test]
    fn uncollected_pickups_expire() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::DropResource {
                cell: GridCoord::new(0, 0),
            },
        );
        let pickup = dropped_id(&events);
        assert_eq!(query::pickup_view(&world).iter().count(), 1);

        let events = tick(&mut world, Duration::from_secs(8));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::PickupExpired { .. })));
        assert!(query::pickup_view(&world).iter().next().is_none());

        // An expired pickup can no longer be collected.
        let events = run(&mut world, Command::CollectPickup { pickup });
        assert!(events.is_empty());
        let _ = tick(&mut world, Duration::from_secs(1));
        assert_eq!(query::resources(&world), 200);
    }

    #[test]
    fn wave_announcements_echo_to_the_event_stream() {
        let mut world = World::new(&test_level());
        let events = run(
            &mut world,
            Command::AnnounceWave {
                index: 2,
                total: 3,
                final_wave: false,
            },
        );
        assert_eq!(
            events,
            vec![Event::WaveAnnounced {
                index: 2,
                total: 3,
                final_wave: false,
            }]
        );
    }
}
