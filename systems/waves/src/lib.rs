#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system that converts a level's declarative wave list
//! into timed attacker spawn commands.

use std::time::Duration;

use lane_defence_core::{
    level::{LevelConfig, WavePlan},
    AttackerKind, Command, Event, Lane,
};

/// Pure system that walks a level's waves and emits spawn commands.
///
/// The scheduler moves through one phase per wave: it spawns the wave's
/// queue relative to the wave's start time, then waits for the playfield to
/// clear and the inter-wave cooldown to elapse before starting the next
/// wave. Both conditions are measured against the wave's start, so a wave
/// cleared quickly still holds the line until its cooldown runs out.
#[derive(Debug)]
pub struct WaveScheduler {
    interval: Duration,
    waves: Vec<WavePlan>,
    queue: Vec<QueueItem>,
    phase: Phase,
}

impl WaveScheduler {
    /// Creates a scheduler for the provided level.
    #[must_use]
    pub fn new(level: &LevelConfig) -> Self {
        Self {
            interval: level.wave_interval,
            waves: level.waves.clone(),
            queue: Vec::new(),
            phase: Phase::Idle,
        }
    }

    /// Consumes tick events and the alive-attacker count to emit commands.
    ///
    /// The first tick activates wave one immediately; spawn delays for a
    /// wave reached through the clearing phase begin counting on the tick
    /// after the transition.
    pub fn handle(&mut self, events: &[Event], alive_attackers: usize, out: &mut Vec<Command>) {
        let now = match latest_time(events) {
            Some(now) => now,
            None => return,
        };

        if let Phase::Idle = self.phase {
            self.enter_wave(0, now, out);
        }

        if let Phase::Clearing { wave, started_at } = self.phase {
            if alive_attackers == 0 && now.saturating_sub(started_at) >= self.interval {
                self.enter_wave(wave + 1, now, out);
            }
            return;
        }

        if let Phase::Active { wave, started_at } = self.phase {
            let elapsed = now.saturating_sub(started_at);
            let mut all_spawned = true;
            for item in &mut self.queue {
                if !item.spawned && elapsed >= item.delay {
                    item.spawned = true;
                    out.push(Command::SpawnAttacker {
                        kind: item.kind,
                        lane: item.lane,
                    });
                }
                all_spawned &= item.spawned;
            }
            if all_spawned {
                self.phase = Phase::Clearing { wave, started_at };
            }
        }
    }

    /// True once every wave has been dispatched and the last one cleared.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    fn enter_wave(&mut self, wave: usize, now: Duration, out: &mut Vec<Command>) {
        if wave >= self.waves.len() {
            self.phase = Phase::Complete;
            return;
        }
        self.queue.clear();
        self.queue
            .extend(self.waves[wave].entries.iter().map(|entry| QueueItem {
                kind: entry.kind,
                lane: entry.lane,
                delay: entry.delay,
                spawned: false,
            }));
        self.phase = Phase::Active {
            wave,
            started_at: now,
        };
        let index = wave as u32 + 1;
        let total = self.waves.len() as u32;
        out.push(Command::AnnounceWave {
            index,
            total,
            final_wave: index == total,
        });
    }
}

fn latest_time(events: &[Event]) -> Option<Duration> {
    let mut latest = None;
    for event in events {
        if let Event::TimeAdvanced { now, .. } = event {
            latest = Some(*now);
        }
    }
    latest
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Idle,
    Active { wave: usize, started_at: Duration },
    Clearing { wave: usize, started_at: Duration },
    Complete,
}

#[derive(Clone, Copy, Debug)]
struct QueueItem {
    kind: AttackerKind,
    lane: Lane,
    delay: Duration,
    spawned: bool,
}
