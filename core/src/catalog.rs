//! Static configuration tables for defender and attacker kinds.
//!
//! Every number the simulation balances around lives here: costs, cooldowns,
//! health pools, damage, and the per-kind behavior variant. The tables are
//! compiled in; levels adjust them only through
//! [`LevelModifiers`](crate::level::LevelModifiers).

use std::time::Duration;

use crate::{AttackerKind, DefenderKind, ProjectileKind, SlowPayload};

/// Travel speed of every projectile, in world units per second.
pub const PROJECTILE_SPEED: f32 = 200.0;
/// Interval between periodic sky drops.
pub const SKY_DROP_INTERVAL: Duration = Duration::from_secs(10);
/// Amount credited by a sky-drop pickup.
pub const SKY_DROP_AMOUNT: u32 = 25;
/// How long an uncollected pickup survives on the playfield.
pub const PICKUP_LIFETIME: Duration = Duration::from_secs(8);
/// Delay between collecting a pickup and the pool credit landing.
pub const CREDIT_DELAY: Duration = Duration::from_millis(500);
/// How long a slowing projectile's payload suppresses attacker speed.
pub const SLOW_DURATION: Duration = Duration::from_secs(3);

/// Behavior variant a defender kind exhibits once placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefenderBehavior {
    /// Periodically emits a resource pickup at the defender's cell.
    Producer {
        /// Amount each emitted pickup credits once collected.
        amount: u32,
        /// Interval between productions, measured from the previous one.
        interval: Duration,
    },
    /// Fires projectiles down the lane while an attacker occupies it.
    Shooter {
        /// Kind of projectile the shooter emits.
        projectile: ProjectileKind,
        /// Slow payload attached to each projectile, if any.
        slow: Option<SlowPayload>,
    },
    /// Blocks the lane with health alone.
    Wall,
    /// Explodes once at fuse expiry, damaging a Chebyshev neighborhood.
    Detonator {
        /// Blast radius in whole cells, rows and columns alike.
        blast_radius: u32,
    },
}

/// Static configuration of a defender kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderProfile {
    /// Resource cost deducted on placement, before level modifiers.
    pub cost: u32,
    /// Placement cooldown for the kind, before level modifiers.
    pub cooldown: Duration,
    /// Health the defender is constructed with.
    pub health: u32,
    /// Damage per shot, strike, or blast; zero for kinds that deal none.
    pub damage: u32,
    /// Attack interval for shooters, or fuse length for detonators.
    pub attack_interval: Duration,
    /// Behavior variant the kind exhibits.
    pub behavior: DefenderBehavior,
}

/// Static configuration of an attacker kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackerProfile {
    /// Health the attacker spawns with, before level modifiers.
    pub health: u32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Damage applied per melee strike.
    pub damage: u32,
    /// Interval between melee strikes while engaging.
    pub attack_interval: Duration,
}

/// Looks up the static profile of a defender kind.
#[must_use]
pub const fn defender_profile(kind: DefenderKind) -> DefenderProfile {
    match kind {
        DefenderKind::Sunflower => DefenderProfile {
            cost: 50,
            cooldown: Duration::from_millis(5_000),
            health: 100,
            damage: 0,
            attack_interval: Duration::ZERO,
            behavior: DefenderBehavior::Producer {
                amount: 50,
                interval: Duration::from_millis(15_000),
            },
        },
        DefenderKind::Peashooter => DefenderProfile {
            cost: 100,
            cooldown: Duration::from_millis(5_000),
            health: 150,
            damage: 20,
            attack_interval: Duration::from_millis(2_000),
            behavior: DefenderBehavior::Shooter {
                projectile: ProjectileKind::Plain,
                slow: None,
            },
        },
        DefenderKind::Wallnut => DefenderProfile {
            cost: 50,
            cooldown: Duration::from_millis(20_000),
            health: 600,
            damage: 0,
            attack_interval: Duration::ZERO,
            behavior: DefenderBehavior::Wall,
        },
        DefenderKind::Snowpea => DefenderProfile {
            cost: 175,
            cooldown: Duration::from_millis(7_000),
            health: 150,
            damage: 20,
            attack_interval: Duration::from_millis(2_500),
            behavior: DefenderBehavior::Shooter {
                projectile: ProjectileKind::Slowing,
                slow: Some(SlowPayload::new(0.5, SLOW_DURATION)),
            },
        },
        DefenderKind::Cherrybomb => DefenderProfile {
            cost: 150,
            cooldown: Duration::from_millis(30_000),
            health: 50,
            damage: 1_800,
            attack_interval: Duration::from_millis(3_000),
            behavior: DefenderBehavior::Detonator { blast_radius: 1 },
        },
    }
}

/// Looks up the static profile of an attacker kind.
#[must_use]
pub const fn attacker_profile(kind: AttackerKind) -> AttackerProfile {
    match kind {
        AttackerKind::Normal => AttackerProfile {
            health: 200,
            speed: 30.0,
            damage: 20,
            attack_interval: Duration::from_millis(1_000),
        },
        AttackerKind::Cone => AttackerProfile {
            health: 500,
            speed: 30.0,
            damage: 20,
            attack_interval: Duration::from_millis(1_000),
        },
        AttackerKind::Bucket => AttackerProfile {
            health: 1_200,
            speed: 40.0,
            damage: 30,
            attack_interval: Duration::from_millis(800),
        },
    }
}
