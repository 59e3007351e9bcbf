#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic economy system that schedules the periodic sky drops.

use std::time::Duration;

use lane_defence_core::{catalog, playfield, Command, Event, GridCoord};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const RNG_STREAM_SKY_DROP: &str = "economy/sky-drop";

/// Configuration parameters required to construct the economy system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    drop_interval: Duration,
    session_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided drop cadence and seed.
    #[must_use]
    pub const fn new(drop_interval: Duration, session_seed: u64) -> Self {
        Self {
            drop_interval,
            session_seed,
        }
    }

    /// Creates a configuration with the catalog cadence and the provided seed.
    #[must_use]
    pub const fn with_seed(session_seed: u64) -> Self {
        Self::new(catalog::SKY_DROP_INTERVAL, session_seed)
    }
}

/// Pure system that deterministically emits sky-drop commands.
///
/// Tick deltas accumulate until a full drop interval elapsed; each drained
/// interval rolls one in-bounds cell from a dedicated ChaCha8 stream derived
/// from the session seed, so replaying a session replays the drop positions.
#[derive(Debug)]
pub struct Economy {
    drop_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Economy {
    /// Creates a new economy system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let seed = derive_labeled_seed(config.session_seed, RNG_STREAM_SKY_DROP);
        Self {
            drop_interval: config.drop_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes tick events to emit one drop command per elapsed interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.drop_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt, .. } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= self.drop_interval {
            self.accumulator -= self.drop_interval;
            let cell = self.roll_cell();
            out.push(Command::DropResource { cell });
        }
    }

    fn roll_cell(&mut self) -> GridCoord {
        let row = self.rng.gen_range(0..playfield::GRID_ROWS);
        let column = self.rng.gen_range(0..playfield::GRID_COLUMNS);
        GridCoord::new(row, column)
    }
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}
