#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns ready defenders into action commands.

use std::time::Duration;

use lane_defence_core::{
    catalog::{self, DefenderBehavior},
    AttackerView, Command, DefenderView, Lane,
};

/// Defender action system that queues fire, produce, and detonate commands.
///
/// Decisions are made against snapshot views, so the world re-validates
/// readiness when it executes each command; a defender that died or fired
/// between the snapshot and the command simply fizzles. Shooters hold their
/// fire while their lane is empty, which also leaves their attack timer
/// untouched: the next attacker to enter the lane is met with an immediate
/// shot.
#[derive(Debug, Default)]
pub struct DefenseActions {
    scratch: Vec<Command>,
}

impl DefenseActions {
    /// Creates a new defense action system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one action command per ready defender.
    pub fn handle(
        &mut self,
        defenders: &DefenderView,
        attackers: &AttackerView,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for defender in defenders.iter() {
            if defender.ready_in != Some(Duration::ZERO) {
                continue;
            }
            match catalog::defender_profile(defender.kind).behavior {
                DefenderBehavior::Shooter { .. } => {
                    if lane_contested(attackers, defender.cell.lane()) {
                        self.scratch.push(Command::FireProjectile {
                            defender: defender.id,
                        });
                    }
                }
                DefenderBehavior::Producer { .. } => {
                    self.scratch.push(Command::ProduceResource {
                        defender: defender.id,
                    });
                }
                DefenderBehavior::Detonator { .. } => {
                    self.scratch.push(Command::Detonate {
                        defender: defender.id,
                    });
                }
                DefenderBehavior::Wall => {}
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn lane_contested(attackers: &AttackerView, lane: Lane) -> bool {
    attackers.iter().any(|attacker| attacker.lane == lane)
}
