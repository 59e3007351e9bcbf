//! Fixed-timestep driver that replays a defense plan against a live
//! session, logging the event stream as it unfolds.

use std::collections::VecDeque;
use std::time::Duration;

use lane_defence_core::{Event, SessionReport};
use lane_defence_session::SessionController;
use lane_defence_world::query;

use crate::plan::{CollectionPolicy, DefensePlan, PlannedPlacement};

/// Timing configuration for a headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunConfig {
    /// Virtual time between session advances.
    pub(crate) timestep: Duration,
    /// Simulated-time cap after which an undecided run aborts.
    pub(crate) time_cap: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timestep: Duration::from_millis(50),
            time_cap: Duration::from_secs(600),
        }
    }
}

/// How a headless run ended.
#[derive(Debug)]
pub(crate) enum RunEnd {
    /// The session reached a terminal outcome.
    Finished(SessionReport),
    /// The cap elapsed with the session still undecided.
    CapReached(Duration),
}

/// Drives the session at a fixed virtual timestep until it decides or the
/// cap is hit, issuing the plan's placements at their scheduled times.
pub(crate) fn run(
    controller: &mut SessionController,
    plan: &DefensePlan,
    config: &RunConfig,
) -> RunEnd {
    let mut upcoming: VecDeque<PlannedPlacement> = plan.schedule().into();
    let mut step = 0u32;

    loop {
        let now = config.timestep * step;
        if now > config.time_cap {
            return RunEnd::CapReached(query::now(controller.world()));
        }

        while let Some(placement) = upcoming.front().copied() {
            if Duration::from_millis(placement.at) > now {
                break;
            }
            let _ = upcoming.pop_front();
            log::debug!(
                "requesting {:?} at row {} column {}",
                placement.kind,
                placement.row,
                placement.column
            );
            controller.place_defender(placement.kind, placement.cell());
        }

        controller.advance(now);
        for event in controller.take_events() {
            log_event(&event);
            if let Event::ResourceDropped { pickup, .. } = event {
                if plan.collection == CollectionPolicy::Eager {
                    controller.collect_pickup(pickup);
                }
            }
        }

        if let Some(report) = controller.report() {
            return RunEnd::Finished(report);
        }
        step += 1;
    }
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { now, dt } => log::trace!(
            "time advanced to {:.2}s (+{}ms)",
            now.as_secs_f32(),
            dt.as_millis()
        ),
        Event::DefenderPlaced {
            defender,
            kind,
            cell,
        } => log::info!(
            "placed {kind:?} ({defender:?}) at row {} column {}",
            cell.row(),
            cell.column()
        ),
        Event::PlacementRejected { kind, cell, reason } => log::warn!(
            "placement of {kind:?} at row {} column {} rejected: {reason:?}",
            cell.row(),
            cell.column()
        ),
        Event::DefenderRemoved { defender, cell } => log::info!(
            "removed {defender:?} from row {} column {}",
            cell.row(),
            cell.column()
        ),
        Event::RemovalRejected { cell, reason } => log::warn!(
            "removal at row {} column {} rejected: {reason:?}",
            cell.row(),
            cell.column()
        ),
        Event::DefenderStruck {
            defender,
            attacker,
            damage,
            health,
        } => log::debug!("{defender:?} struck by {attacker:?} for {damage}, {health} left"),
        Event::DefenderDied {
            defender,
            kind,
            cell,
        } => log::info!(
            "{kind:?} ({defender:?}) destroyed at row {} column {}",
            cell.row(),
            cell.column()
        ),
        Event::DefenderDetonated { defender, cell } => log::info!(
            "{defender:?} detonated at row {} column {}",
            cell.row(),
            cell.column()
        ),
        Event::AttackerSpawned {
            attacker,
            kind,
            lane,
            position,
        } => log::info!(
            "{kind:?} ({attacker:?}) entered lane {} at x={position:.0}",
            lane.row()
        ),
        Event::AttackerHit {
            attacker,
            projectile,
            damage,
            health,
        } => log::debug!("{attacker:?} hit by {projectile:?} for {damage}, {health} left"),
        Event::AttackerSlowed {
            attacker,
            multiplier,
            until,
        } => log::debug!(
            "{attacker:?} slowed to x{multiplier:.2} until {:.2}s",
            until.as_secs_f32()
        ),
        Event::AttackerBlasted {
            attacker,
            defender,
            damage,
            health,
        } => log::debug!(
            "{attacker:?} caught in blast from {defender:?} for {damage}, {health} left"
        ),
        Event::AttackerDied {
            attacker,
            kind,
            lane,
        } => log::info!("{kind:?} ({attacker:?}) died in lane {}", lane.row()),
        Event::AttackerExited { attacker, lane } => log::warn!(
            "{attacker:?} crossed the defence line in lane {}",
            lane.row()
        ),
        Event::DefencesBreached { lane } => {
            log::warn!("defences breached in lane {}", lane.row())
        }
        Event::ProjectileFired {
            projectile,
            kind,
            lane,
            position,
        } => log::trace!(
            "{projectile:?} ({kind:?}) fired in lane {} from x={position:.0}",
            lane.row()
        ),
        Event::ProjectileExpired { projectile } => {
            log::trace!("{projectile:?} left the playfield unspent")
        }
        Event::ResourceDropped {
            pickup,
            amount,
            cell,
            source,
        } => log::debug!(
            "{pickup:?} worth {amount} dropped at row {} column {} ({source:?})",
            cell.row(),
            cell.column()
        ),
        Event::PickupCollected { pickup } => log::debug!("{pickup:?} collected"),
        Event::PickupExpired { pickup } => log::debug!("{pickup:?} expired uncollected"),
        Event::ResourceCredited { amount, pool } => {
            log::debug!("credited {amount}, pool at {pool}")
        }
        Event::ResourceSpent { kind, amount, pool } => {
            log::debug!("spent {amount} on {kind:?}, pool at {pool}")
        }
        Event::WaveAnnounced {
            index,
            total,
            final_wave,
        } => {
            if *final_wave {
                log::info!("final wave {index}/{total} incoming");
            } else {
                log::info!("wave {index}/{total} incoming");
            }
        }
    }
}
