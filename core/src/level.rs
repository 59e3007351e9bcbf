//! Level configuration: the wire format levels are authored in and the
//! validated form the simulation consumes.
//!
//! Authored levels use 1-based rows and millisecond delays; conversion to
//! the internal representation happens exactly once, when a session loads
//! the level. The wire shape is shared by the TOML campaign files and by
//! custom JSON level files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{playfield, AttackerKind, DefenderKind, Lane};

/// Validated level description consumed read-only by a session.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    /// Display name shown by the presentation layer.
    pub name: String,
    /// Resource pool the session starts with.
    pub initial_resources: u32,
    /// Defender kinds the player may place in this level.
    pub allowed_kinds: Vec<DefenderKind>,
    /// Minimum time between the start of consecutive waves.
    pub wave_interval: Duration,
    /// Ordered waves the scheduler dispatches.
    pub waves: Vec<WavePlan>,
    /// Adjustments this level applies to the static catalog.
    pub modifiers: LevelModifiers,
}

impl LevelConfig {
    /// Validates a raw authored level and converts it to internal form.
    pub fn from_raw(raw: RawLevel) -> Result<Self, LevelError> {
        if raw.waves.is_empty() {
            return Err(LevelError::NoWaves);
        }

        let mut waves = Vec::with_capacity(raw.waves.len());
        for (index, wave) in raw.waves.into_iter().enumerate() {
            if wave.zombies.is_empty() {
                return Err(LevelError::EmptyWave { wave: index + 1 });
            }
            let mut entries = Vec::with_capacity(wave.zombies.len());
            for spawn in wave.zombies {
                if spawn.row == 0 || spawn.row > playfield::GRID_ROWS {
                    return Err(LevelError::RowOutOfRange {
                        wave: index + 1,
                        row: spawn.row,
                        rows: playfield::GRID_ROWS,
                    });
                }
                entries.push(WaveEntry {
                    kind: spawn.kind,
                    lane: Lane::new(spawn.row - 1),
                    delay: Duration::from_millis(spawn.delay),
                });
            }
            waves.push(WavePlan { entries });
        }

        Ok(Self {
            name: raw.name.unwrap_or_else(|| String::from("custom level")),
            initial_resources: raw.initial_resources,
            allowed_kinds: raw.allowed_kinds,
            wave_interval: Duration::from_millis(raw.wave_interval),
            waves,
            modifiers: raw.modifiers.map(LevelModifiers::from_raw).unwrap_or_default(),
        })
    }

    /// Reports whether the level allows placing the provided kind.
    #[must_use]
    pub fn allows(&self, kind: DefenderKind) -> bool {
        self.allowed_kinds.contains(&kind)
    }
}

/// One wave of the level: an ordered list of timed spawns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WavePlan {
    /// Spawns belonging to the wave, delays relative to wave start.
    pub entries: Vec<WaveEntry>,
}

/// A single scheduled spawn within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveEntry {
    /// Kind of attacker to spawn.
    pub kind: AttackerKind,
    /// Lane the attacker enters on, zero-based.
    pub lane: Lane,
    /// Delay from the wave's start time to this spawn.
    pub delay: Duration,
}

/// Per-level adjustments applied on top of the static catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelModifiers {
    cooldown_scale: f32,
    kind_cooldown_scale: BTreeMap<DefenderKind, f32>,
    kind_cost_delta: BTreeMap<DefenderKind, i32>,
    attacker_health_scale: f32,
}

impl LevelModifiers {
    fn from_raw(raw: RawModifiers) -> Self {
        Self {
            cooldown_scale: raw.cooldown_scale.unwrap_or(1.0),
            kind_cooldown_scale: raw.kind_cooldown_scale.unwrap_or_default(),
            kind_cost_delta: raw.kind_cost_delta.unwrap_or_default(),
            attacker_health_scale: raw.attacker_health_scale.unwrap_or(1.0),
        }
    }

    /// Placement cost of a kind after the level's cost delta, clamped at zero.
    #[must_use]
    pub fn effective_cost(&self, kind: DefenderKind, base: u32) -> u32 {
        let delta = self.kind_cost_delta.get(&kind).copied().unwrap_or(0);
        let adjusted = i64::from(base) + i64::from(delta);
        u32::try_from(adjusted.max(0)).unwrap_or(0)
    }

    /// Placement cooldown of a kind after global and per-kind scaling.
    #[must_use]
    pub fn effective_cooldown(&self, kind: DefenderKind, base: Duration) -> Duration {
        let kind_scale = self.kind_cooldown_scale.get(&kind).copied().unwrap_or(1.0);
        base.mul_f32(self.cooldown_scale * kind_scale)
    }

    /// Attacker spawn health after the level's health scale, floored.
    #[must_use]
    pub fn scaled_attacker_health(&self, base: u32) -> u32 {
        (base as f32 * self.attacker_health_scale).floor() as u32
    }
}

impl Default for LevelModifiers {
    fn default() -> Self {
        Self {
            cooldown_scale: 1.0,
            kind_cooldown_scale: BTreeMap::new(),
            kind_cost_delta: BTreeMap::new(),
            attacker_health_scale: 1.0,
        }
    }
}

/// Authored level exactly as it appears on the wire.
///
/// `{ initialResources, allowedKinds, waves: [{ zombies: [{type, row,
/// delay}] }], waveInterval, modifiers? }` with 1-based rows and
/// millisecond intervals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawLevel {
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resource pool the session starts with.
    pub initial_resources: u32,
    /// Defender kinds the player may place.
    pub allowed_kinds: Vec<DefenderKind>,
    /// Minimum time between wave starts, in milliseconds.
    pub wave_interval: u64,
    /// Ordered wave descriptions.
    pub waves: Vec<RawWave>,
    /// Optional catalog adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<RawModifiers>,
}

/// One authored wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWave {
    /// Spawns belonging to the wave.
    pub zombies: Vec<RawSpawn>,
}

/// One authored spawn entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSpawn {
    /// Kind of attacker to spawn.
    #[serde(rename = "type")]
    pub kind: AttackerKind,
    /// Row the attacker enters on, 1-based as authored.
    pub row: u32,
    /// Delay from wave start in milliseconds.
    pub delay: u64,
}

/// Authored modifier block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawModifiers {
    /// Global multiplier applied to every placement cooldown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_scale: Option<f32>,
    /// Per-kind cooldown multipliers, composed with the global scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind_cooldown_scale: Option<BTreeMap<DefenderKind, f32>>,
    /// Per-kind cost deltas; negative values discount the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind_cost_delta: Option<BTreeMap<DefenderKind, i32>>,
    /// Multiplier applied to attacker spawn health, floored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker_health_scale: Option<f32>,
}

/// Reasons an authored level fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The level defines no waves at all.
    #[error("level defines no waves")]
    NoWaves,
    /// A wave contains no spawn entries.
    #[error("wave {wave} contains no spawns")]
    EmptyWave {
        /// One-based index of the offending wave.
        wave: usize,
    },
    /// A spawn references a row outside the playfield.
    #[error("wave {wave} references row {row}, expected 1..={rows}")]
    RowOutOfRange {
        /// One-based index of the offending wave.
        wave: usize,
        /// Row value found in the authored data.
        row: u32,
        /// Number of rows the playfield actually has.
        rows: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{LevelConfig, LevelError, RawLevel, RawModifiers, RawSpawn, RawWave};
    use crate::{catalog, AttackerKind, DefenderKind, Lane};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn raw_level(rows: &[u32]) -> RawLevel {
        RawLevel {
            name: Some(String::from("fixture")),
            initial_resources: 150,
            allowed_kinds: vec![DefenderKind::Sunflower, DefenderKind::Peashooter],
            wave_interval: 25_000,
            waves: vec![RawWave {
                zombies: rows
                    .iter()
                    .map(|row| RawSpawn {
                        kind: AttackerKind::Normal,
                        row: *row,
                        delay: 2_000,
                    })
                    .collect(),
            }],
            modifiers: None,
        }
    }

    #[test]
    fn rows_convert_from_one_based_to_lanes() {
        let config = LevelConfig::from_raw(raw_level(&[1, 3, 5])).expect("valid level");
        let lanes: Vec<Lane> = config.waves[0].entries.iter().map(|e| e.lane).collect();
        assert_eq!(lanes, vec![Lane::new(0), Lane::new(2), Lane::new(4)]);
        assert_eq!(config.wave_interval, Duration::from_secs(25));
    }

    #[test]
    fn row_zero_is_rejected() {
        let err = LevelConfig::from_raw(raw_level(&[0])).expect_err("row 0 invalid");
        assert_eq!(
            err,
            LevelError::RowOutOfRange {
                wave: 1,
                row: 0,
                rows: 5
            }
        );
    }

    #[test]
    fn rows_past_the_grid_are_rejected() {
        let err = LevelConfig::from_raw(raw_level(&[6])).expect_err("row 6 invalid");
        assert!(matches!(err, LevelError::RowOutOfRange { row: 6, .. }));
    }

    #[test]
    fn level_without_waves_is_rejected() {
        let mut raw = raw_level(&[1]);
        raw.waves.clear();
        assert_eq!(
            LevelConfig::from_raw(raw).expect_err("no waves"),
            LevelError::NoWaves
        );
    }

    #[test]
    fn cost_delta_discounts_and_clamps_at_zero() {
        let mut deltas = BTreeMap::new();
        let _ = deltas.insert(DefenderKind::Snowpea, -50);
        let _ = deltas.insert(DefenderKind::Peashooter, -500);
        let mut raw = raw_level(&[1]);
        raw.modifiers = Some(RawModifiers {
            kind_cost_delta: Some(deltas),
            ..RawModifiers::default()
        });
        let config = LevelConfig::from_raw(raw).expect("valid level");

        let snowpea = catalog::defender_profile(DefenderKind::Snowpea).cost;
        assert_eq!(
            config.modifiers.effective_cost(DefenderKind::Snowpea, snowpea),
            125
        );
        let pea = catalog::defender_profile(DefenderKind::Peashooter).cost;
        assert_eq!(
            config.modifiers.effective_cost(DefenderKind::Peashooter, pea),
            0
        );
        assert_eq!(
            config.modifiers.effective_cost(DefenderKind::Wallnut, 50),
            50
        );
    }

    #[test]
    fn kind_cooldown_scale_halves_exactly() {
        let mut scales = BTreeMap::new();
        let _ = scales.insert(DefenderKind::Wallnut, 0.5);
        let mut raw = raw_level(&[1]);
        raw.modifiers = Some(RawModifiers {
            kind_cooldown_scale: Some(scales),
            ..RawModifiers::default()
        });
        let config = LevelConfig::from_raw(raw).expect("valid level");

        let scaled = config
            .modifiers
            .effective_cooldown(DefenderKind::Wallnut, Duration::from_secs(20));
        assert_eq!(scaled, Duration::from_secs(10));
        let untouched = config
            .modifiers
            .effective_cooldown(DefenderKind::Peashooter, Duration::from_secs(5));
        assert_eq!(untouched, Duration::from_secs(5));
    }

    #[test]
    fn cooldown_scales_compose_multiplicatively() {
        let mut scales = BTreeMap::new();
        let _ = scales.insert(DefenderKind::Wallnut, 0.5);
        let mut raw = raw_level(&[1]);
        raw.modifiers = Some(RawModifiers {
            cooldown_scale: Some(0.7),
            kind_cooldown_scale: Some(scales),
            ..RawModifiers::default()
        });
        let config = LevelConfig::from_raw(raw).expect("valid level");

        let scaled = config
            .modifiers
            .effective_cooldown(DefenderKind::Wallnut, Duration::from_secs(20));
        assert!((scaled.as_secs_f32() - 7.0).abs() < 1e-3);
        let global_only = config
            .modifiers
            .effective_cooldown(DefenderKind::Peashooter, Duration::from_secs(10));
        assert!((global_only.as_secs_f32() - 7.0).abs() < 1e-3);
    }

    #[test]
    fn attacker_health_scale_floors_the_result() {
        let mut raw = raw_level(&[1]);
        raw.modifiers = Some(RawModifiers {
            attacker_health_scale: Some(1.2),
            ..RawModifiers::default()
        });
        let config = LevelConfig::from_raw(raw).expect("valid level");
        assert_eq!(config.modifiers.scaled_attacker_health(200), 240);
        assert_eq!(config.modifiers.scaled_attacker_health(25), 30);
    }
}
