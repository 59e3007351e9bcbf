#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves same-lane projectile hits into hit commands.

use lane_defence_core::{
    playfield, AttackerId, AttackerView, Command, Lane, ProjectileView,
};

/// Combat resolver that pairs each projectile with at most one attacker.
///
/// Projectiles are walked in identifier order, and each one strikes the first
/// attacker in identifier order that shares its lane and sits within the hit
/// radius. Proximity does not enter the tie-break: an attacker earlier in the
/// order takes the hit even when a later one is closer. Damage dealt earlier
/// in the pass counts immediately, so an attacker driven to zero health on
/// the pass ledger is transparent to the remaining projectiles, which fall
/// through to the next attacker in order.
#[derive(Debug, Default)]
pub struct CombatResolver {
    ledger: Vec<LedgerEntry>,
    scratch: Vec<Command>,
}

impl CombatResolver {
    /// Creates a new combat resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::HitAttacker` entries for every projectile that connects.
    pub fn handle(
        &mut self,
        projectiles: &ProjectileView,
        attackers: &AttackerView,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();
        self.ledger.clear();
        self.ledger
            .extend(attackers.iter().map(|attacker| LedgerEntry {
                id: attacker.id,
                lane: attacker.lane,
                position: attacker.position,
                remaining: attacker.health,
            }));

        if self.ledger.is_empty() {
            return;
        }

        for projectile in projectiles.iter() {
            let target = self.ledger.iter_mut().find(|entry| {
                entry.remaining > 0
                    && entry.lane == projectile.lane
                    && (entry.position - projectile.position).abs() < playfield::HIT_RADIUS
            });
            if let Some(entry) = target {
                entry.remaining = entry.remaining.saturating_sub(projectile.damage);
                self.scratch.push(Command::HitAttacker {
                    projectile: projectile.id,
                    attacker: entry.id,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[derive(Debug)]
struct LedgerEntry {
    id: AttackerId,
    lane: Lane,
    position: f32,
    remaining: u32,
}
