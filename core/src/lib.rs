#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and the session submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod level;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    ///
    /// The world settles due resource credits, expires stale pickups, and
    /// compacts entities that died during the previous tick before any other
    /// phase of the new tick observes them.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Advances every alive attacker by the provided delta time.
    ///
    /// Attackers re-evaluate their targets, strike an engaged defender, or
    /// move down their lane; an attacker crossing the defended boundary exits
    /// the world and raises the breach flag.
    StepAttackers {
        /// Duration of simulated time covered by the movement step.
        dt: Duration,
    },
    /// Advances every alive projectile by the provided delta time.
    StepProjectiles {
        /// Duration of simulated time covered by the movement step.
        dt: Duration,
    },
    /// Requests placement of a defender at the provided grid cell.
    PlaceDefender {
        /// Kind of defender to construct.
        kind: DefenderKind,
        /// Cell that should receive the defender.
        cell: GridCoord,
    },
    /// Requests removal of the defender occupying the provided cell.
    ///
    /// Removal refunds nothing and does not count toward combat losses.
    RemoveDefender {
        /// Cell whose occupant should be removed.
        cell: GridCoord,
    },
    /// Requests that a new attacker enter the world at the lane's spawn edge.
    SpawnAttacker {
        /// Kind of attacker to spawn.
        kind: AttackerKind,
        /// Lane the attacker will advance along.
        lane: Lane,
    },
    /// Requests that a ready shooter defender emit one projectile.
    FireProjectile {
        /// Identifier of the defender attempting to fire.
        defender: DefenderId,
    },
    /// Requests that a ready producer defender emit one resource pickup.
    ProduceResource {
        /// Identifier of the defender producing the pickup.
        defender: DefenderId,
    },
    /// Requests that a detonator defender whose fuse elapsed explode.
    Detonate {
        /// Identifier of the detonating defender.
        defender: DefenderId,
    },
    /// Requests that a projectile strike an attacker sharing its lane.
    HitAttacker {
        /// Identifier of the projectile delivering the hit.
        projectile: ProjectileId,
        /// Identifier of the attacker receiving the hit.
        attacker: AttackerId,
    },
    /// Requests a sky-drop resource pickup at the provided cell.
    DropResource {
        /// Cell that should receive the pickup.
        cell: GridCoord,
    },
    /// Requests collection of an uncollected resource pickup.
    ///
    /// The pool is credited only after the fixed deferred-credit delay.
    CollectPickup {
        /// Identifier of the pickup being collected.
        pickup: PickupId,
    },
    /// Announces a wave transition to the presentation event stream.
    AnnounceWave {
        /// One-based index of the wave that is starting.
        index: u32,
        /// Total number of waves in the level.
        total: u32,
        /// Indicates whether this is the level's final wave.
        final_wave: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Total simulated time elapsed since the session started.
        now: Duration,
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a defender was placed into the world.
    DefenderPlaced {
        /// Identifier assigned to the defender by the world.
        defender: DefenderId,
        /// Kind of defender that was placed.
        kind: DefenderKind,
        /// Cell the defender occupies.
        cell: GridCoord,
    },
    /// Reports that a defender placement request was rejected.
    PlacementRejected {
        /// Kind of defender requested for placement.
        kind: DefenderKind,
        /// Cell provided in the placement request.
        cell: GridCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a defender was manually removed from the world.
    DefenderRemoved {
        /// Identifier of the defender that was removed.
        defender: DefenderId,
        /// Cell the defender previously occupied.
        cell: GridCoord,
    },
    /// Reports that a defender removal request was rejected.
    RemovalRejected {
        /// Cell provided in the removal request.
        cell: GridCoord,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Reports that an attacker struck the defender it is engaging.
    DefenderStruck {
        /// Identifier of the defender that was struck.
        defender: DefenderId,
        /// Identifier of the attacker that delivered the strike.
        attacker: AttackerId,
        /// Amount of damage applied by the strike.
        damage: u32,
        /// Health remaining after the strike.
        health: u32,
    },
    /// Confirms that a defender died to attacker damage.
    DefenderDied {
        /// Identifier of the defender that died.
        defender: DefenderId,
        /// Kind of the defender that died.
        kind: DefenderKind,
        /// Cell the defender occupied; the slot is free again.
        cell: GridCoord,
    },
    /// Confirms that a detonator defender exploded and left the grid.
    DefenderDetonated {
        /// Identifier of the defender that detonated.
        defender: DefenderId,
        /// Cell at the center of the blast.
        cell: GridCoord,
    },
    /// Confirms that an attacker entered the world.
    AttackerSpawned {
        /// Identifier assigned to the attacker by the world.
        attacker: AttackerId,
        /// Kind of attacker that spawned.
        kind: AttackerKind,
        /// Lane the attacker advances along.
        lane: Lane,
        /// Lane position the attacker spawned at, in world units.
        position: f32,
    },
    /// Reports that a projectile hit an attacker.
    AttackerHit {
        /// Identifier of the attacker that was hit.
        attacker: AttackerId,
        /// Identifier of the projectile that delivered the hit.
        projectile: ProjectileId,
        /// Amount of damage applied by the hit.
        damage: u32,
        /// Health remaining after the hit.
        health: u32,
    },
    /// Reports that a slow effect was applied to an attacker.
    AttackerSlowed {
        /// Identifier of the slowed attacker.
        attacker: AttackerId,
        /// Speed multiplier in effect while the slow lasts.
        multiplier: f32,
        /// Simulated time at which the slow expires.
        until: Duration,
    },
    /// Reports that a detonator blast damaged an attacker.
    AttackerBlasted {
        /// Identifier of the attacker caught in the blast.
        attacker: AttackerId,
        /// Identifier of the defender that detonated.
        defender: DefenderId,
        /// Amount of damage applied by the blast.
        damage: u32,
        /// Health remaining after the blast.
        health: u32,
    },
    /// Confirms that an attacker died.
    AttackerDied {
        /// Identifier of the attacker that died.
        attacker: AttackerId,
        /// Kind of the attacker that died.
        kind: AttackerKind,
        /// Lane the attacker occupied.
        lane: Lane,
    },
    /// Confirms that an attacker crossed the defended boundary and left.
    AttackerExited {
        /// Identifier of the attacker that exited.
        attacker: AttackerId,
        /// Lane the attacker exited from.
        lane: Lane,
    },
    /// Reports the first boundary breach of the session.
    ///
    /// Emitted at most once per session; later exits do not repeat it.
    DefencesBreached {
        /// Lane the breaching attacker exited from.
        lane: Lane,
    },
    /// Confirms that a shooter defender emitted a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile by the world.
        projectile: ProjectileId,
        /// Kind of projectile that was fired.
        kind: ProjectileKind,
        /// Lane the projectile travels along.
        lane: Lane,
        /// Lane position the projectile started at, in world units.
        position: f32,
    },
    /// Confirms that a projectile left the playfield without hitting.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
    },
    /// Confirms that a resource pickup appeared on the playfield.
    ResourceDropped {
        /// Identifier assigned to the pickup by the world.
        pickup: PickupId,
        /// Amount the pickup will credit once collected.
        amount: u32,
        /// Cell the pickup occupies.
        cell: GridCoord,
        /// What produced the pickup.
        source: DropSource,
    },
    /// Confirms that a pickup was collected and its credit scheduled.
    PickupCollected {
        /// Identifier of the collected pickup.
        pickup: PickupId,
    },
    /// Confirms that an uncollected pickup expired and was discarded.
    PickupExpired {
        /// Identifier of the expired pickup.
        pickup: PickupId,
    },
    /// Confirms that a deferred credit landed in the resource pool.
    ResourceCredited {
        /// Amount added to the pool.
        amount: u32,
        /// Pool total after the credit.
        pool: u32,
    },
    /// Confirms that a successful placement spent resources.
    ResourceSpent {
        /// Kind of defender the resources paid for.
        kind: DefenderKind,
        /// Amount deducted from the pool.
        amount: u32,
        /// Pool total after the deduction.
        pool: u32,
    },
    /// Echoes a wave announcement for the presentation layer.
    WaveAnnounced {
        /// One-based index of the wave that is starting.
        index: u32,
        /// Total number of waves in the level.
        total: u32,
        /// Indicates whether this is the level's final wave.
        final_wave: bool,
    },
}

/// Identifies what created a resource pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropSource {
    /// Periodic sky drop scheduled by the economy system.
    Sky,
    /// A producer defender emitted the pickup.
    Producer(DefenderId),
}

/// Unique identifier assigned to a defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefenderId(u32);

impl DefenderId {
    /// Creates a new defender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttackerId(u32);

impl AttackerId {
    /// Creates a new attacker identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a resource pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifies a campaign level. Level one is the campaign opener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided one-based number.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the one-based level number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Horizontal row along which attackers advance and projectiles travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lane(u32);

impl Lane {
    /// Creates a new lane wrapper from a zero-based row index.
    #[must_use]
    pub const fn new(row: u32) -> Self {
        Self(row)
    }

    /// Retrieves the zero-based row index of the lane.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    row: u32,
    column: u32,
}

impl GridCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Lane that runs through this cell.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        Lane::new(self.row)
    }

    /// Computes the Chebyshev distance between two cell coordinates.
    ///
    /// Both the row and column deltas count, so a radius-one neighborhood is
    /// the full surrounding ring including diagonals.
    #[must_use]
    pub fn chebyshev_distance(self, other: GridCoord) -> u32 {
        self.row
            .abs_diff(other.row)
            .max(self.column.abs_diff(other.column))
    }
}

/// Playfield geometry shared by the world, systems, and adapters.
///
/// Lane positions are measured in world units increasing from the defended
/// edge on the left toward the attacker entry on the right. Each grid cell
/// spans one stride: 90 units of interior plus a 5-unit gutter.
pub mod playfield {
    use super::GridCoord;

    /// Number of lanes (grid rows) on the playfield.
    pub const GRID_ROWS: u32 = 5;
    /// Number of placement columns on the playfield.
    pub const GRID_COLUMNS: u32 = 3;
    /// Distance between the left edges of two adjacent cells.
    pub const CELL_STRIDE: f32 = 95.0;
    /// Offset from a cell's left edge to its center.
    pub const CELL_CENTER_OFFSET: f32 = 45.0;
    /// Offset from a shooter's cell center to its projectile muzzle.
    pub const MUZZLE_OFFSET: f32 = 30.0;
    /// Maximum projectile/attacker distance that still counts as a hit.
    pub const HIT_RADIUS: f32 = 40.0;
    /// Margin past the grid edges used for spawn, exit, and despawn bounds.
    pub const BOUNDARY_MARGIN: f32 = 50.0;

    /// Total width of the placement grid in world units.
    #[must_use]
    pub const fn grid_width() -> f32 {
        GRID_COLUMNS as f32 * CELL_STRIDE
    }

    /// Lane position at which attackers enter the playfield.
    #[must_use]
    pub const fn attacker_entry() -> f32 {
        grid_width() + BOUNDARY_MARGIN
    }

    /// Lane position past which an attacker has breached the defences.
    #[must_use]
    pub const fn defence_line() -> f32 {
        -BOUNDARY_MARGIN
    }

    /// Lane position past which a projectile despawns without hitting.
    #[must_use]
    pub const fn projectile_bound() -> f32 {
        grid_width() + BOUNDARY_MARGIN
    }

    /// Lane position of the center of the provided column.
    #[must_use]
    pub fn cell_center(column: u32) -> f32 {
        column as f32 * CELL_STRIDE + CELL_CENTER_OFFSET
    }

    /// Grid column containing the provided lane position, if any.
    ///
    /// Positions left of the grid or past its right edge have no column;
    /// entities there can neither engage defenders nor be caught in blasts.
    #[must_use]
    pub fn column_at(position: f32) -> Option<u32> {
        if position < 0.0 {
            return None;
        }
        let column = (position / CELL_STRIDE) as u32;
        (column < GRID_COLUMNS).then_some(column)
    }

    /// Cell containing the provided lane row and position, if any.
    #[must_use]
    pub fn cell_at(row: u32, position: f32) -> Option<GridCoord> {
        if row >= GRID_ROWS {
            return None;
        }
        column_at(position).map(|column| GridCoord::new(row, column))
    }
}

/// Closed set of defender kinds available to the placement surface.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DefenderKind {
    /// Producer that periodically emits resource pickups.
    Sunflower,
    /// Shooter that fires plain projectiles down its lane.
    Peashooter,
    /// Passive wall that only blocks with its health.
    Wallnut,
    /// Shooter that fires slowing projectiles down its lane.
    Snowpea,
    /// Detonator that explodes once its fuse elapses.
    Cherrybomb,
}

/// Closed set of attacker kinds a level may spawn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AttackerKind {
    /// Baseline attacker.
    Normal,
    /// Hardened attacker with extra health.
    Cone,
    /// Heavily armored attacker that moves and strikes faster.
    Bucket,
}

/// Kinds of projectiles shooters can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Plain projectile that only deals damage.
    Plain,
    /// Projectile that also applies a slow payload on hit.
    Slowing,
}

/// Temporary speed reduction carried by slowing projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowPayload {
    fraction: f32,
    duration: Duration,
}

impl SlowPayload {
    /// Creates a new slow payload from a speed fraction and duration.
    #[must_use]
    pub const fn new(fraction: f32, duration: Duration) -> Self {
        Self { fraction, duration }
    }

    /// Fraction of speed removed while the slow is active.
    #[must_use]
    pub const fn fraction(&self) -> f32 {
        self.fraction
    }

    /// How long the slow lasts from the moment it is applied.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// Reasons a defender placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested kind is not on the level's allow-list.
    InvalidKind,
    /// The requested cell lies outside the placement grid.
    OutOfBounds,
    /// The requested cell already holds a live defender.
    SlotOccupied,
    /// The resource pool cannot cover the kind's current cost.
    InsufficientResources,
    /// The kind's placement cooldown has not elapsed yet.
    OnCooldown,
}

/// Reasons a defender removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// The requested cell lies outside the placement grid.
    OutOfBounds,
    /// The requested cell holds no defender.
    SlotEmpty,
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every wave was dispatched and cleared without a breach.
    Victory,
    /// An attacker crossed the defended boundary.
    Defeat,
}

/// Summary handed to the persistence collaborator when a session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Terminal result of the session.
    pub outcome: Outcome,
    /// Level the session played.
    pub level: LevelId,
    /// Number of attackers that died during the session.
    pub attackers_defeated: u32,
    /// Number of defenders lost to attacker damage.
    pub defenders_lost: u32,
    /// Simulated time the session ran for.
    pub duration: Duration,
}

/// Immutable representation of a single defender's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefenderSnapshot {
    /// Identifier allocated to the defender by the world.
    pub id: DefenderId,
    /// Kind of defender that was constructed.
    pub kind: DefenderKind,
    /// Cell the defender occupies.
    pub cell: GridCoord,
    /// Current health of the defender.
    pub health: u32,
    /// Health the defender was constructed with.
    pub max_health: u32,
    /// Time until the defender's next action; `None` for kinds that never act.
    pub ready_in: Option<Duration>,
}

/// Read-only snapshot describing all defenders on the grid.
#[derive(Clone, Debug, Default)]
pub struct DefenderView {
    snapshots: Vec<DefenderSnapshot>,
}

impl DefenderView {
    /// Creates a new defender view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured defender snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenderSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenderSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single attacker's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackerSnapshot {
    /// Identifier allocated to the attacker by the world.
    pub id: AttackerId,
    /// Kind of the attacker.
    pub kind: AttackerKind,
    /// Lane the attacker advances along.
    pub lane: Lane,
    /// Current lane position in world units.
    pub position: f32,
    /// Current health of the attacker.
    pub health: u32,
    /// Health the attacker spawned with, after level modifiers.
    pub max_health: u32,
    /// Speed multiplier currently in effect; `1.0` when unslowed.
    pub slow_multiplier: f32,
}

/// Read-only snapshot describing all alive attackers.
#[derive(Clone, Debug, Default)]
pub struct AttackerView {
    snapshots: Vec<AttackerSnapshot>,
}

impl AttackerView {
    /// Creates a new attacker view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AttackerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured attacker snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AttackerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AttackerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Kind of the projectile.
    pub kind: ProjectileKind,
    /// Lane the projectile travels along.
    pub lane: Lane,
    /// Current lane position in world units.
    pub position: f32,
    /// Damage the projectile delivers on hit.
    pub damage: u32,
}

/// Read-only snapshot describing all alive projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single pickup's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickupSnapshot {
    /// Identifier allocated to the pickup by the world.
    pub id: PickupId,
    /// Cell the pickup occupies.
    pub cell: GridCoord,
    /// Amount the pickup credits once collected.
    pub amount: u32,
    /// Simulated time at which the pickup expires if uncollected.
    pub expires_at: Duration,
}

/// Read-only snapshot describing all uncollected pickups.
#[derive(Clone, Debug, Default)]
pub struct PickupView {
    snapshots: Vec<PickupSnapshot>,
}

impl PickupView {
    /// Creates a new pickup view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PickupSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured pickup snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PickupSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PickupSnapshot> {
        self.snapshots
    }
}
