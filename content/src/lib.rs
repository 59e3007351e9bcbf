#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Built-in campaign: five authored levels embedded at compile time.
//!
//! Level sources live under `levels/` in the shared authored TOML shape
//! and are decoded on lookup, so a load failure means the shipped data
//! itself is broken. The crate's tests parse every level to catch that
//! before it ships.

use lane_defence_core::level::{LevelConfig, LevelError, RawLevel};
use lane_defence_core::{DefenderKind, LevelId};
use thiserror::Error;

const LEVEL_SOURCES: [&str; 5] = [
    include_str!("../levels/level1.toml"),
    include_str!("../levels/level2.toml"),
    include_str!("../levels/level3.toml"),
    include_str!("../levels/level4.toml"),
    include_str!("../levels/level5.toml"),
];

/// Number of levels in the campaign.
#[must_use]
pub const fn campaign_len() -> u32 {
    LEVEL_SOURCES.len() as u32
}

/// Loads one campaign level by its one-based identifier.
pub fn level(id: LevelId) -> Result<LevelConfig, CampaignError> {
    let index = id
        .get()
        .checked_sub(1)
        .map(|number| number as usize)
        .filter(|index| *index < LEVEL_SOURCES.len())
        .ok_or(CampaignError::UnknownLevel { id })?;
    let raw: RawLevel = toml::from_str(LEVEL_SOURCES[index])
        .map_err(|source| CampaignError::Malformed { id, source })?;
    LevelConfig::from_raw(raw).map_err(|source| CampaignError::Invalid { id, source })
}

/// Loads every campaign level in play order.
pub fn campaign() -> Result<Vec<LevelConfig>, CampaignError> {
    (1..=campaign_len())
        .map(|number| level(LevelId::new(number)))
        .collect()
}

/// Defender kind that completing the provided level unlocks, if any.
#[must_use]
pub const fn unlock_for(id: LevelId) -> Option<DefenderKind> {
    match id.get() {
        1 => Some(DefenderKind::Snowpea),
        2 => Some(DefenderKind::Cherrybomb),
        _ => None,
    }
}

/// Reasons a campaign level fails to load.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// The identifier names no campaign level.
    #[error("no campaign level {}, expected 1..={}", id.get(), campaign_len())]
    UnknownLevel {
        /// Identifier that was requested.
        id: LevelId,
    },
    /// The embedded source failed to decode as TOML.
    #[error("campaign level {} source is malformed", id.get())]
    Malformed {
        /// Level whose source failed to decode.
        id: LevelId,
        /// Underlying decode error.
        source: toml::de::Error,
    },
    /// The decoded level failed structural validation.
    #[error("campaign level {} is invalid", id.get())]
    Invalid {
        /// Level whose data failed validation.
        id: LevelId,
        /// Underlying validation error.
        source: LevelError,
    },
}
