#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Campaign progress and lifetime statistics, persisted as a JSON file.
//!
//! The store never fails the caller: a missing file yields defaults, a
//! corrupt or version-mismatched file is logged and replaced by defaults,
//! and an unwritable location leaves the store operating in memory for the
//! rest of the process. Losing saved progress is the worst case.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lane_defence_core::{DefenderKind, LevelId, Outcome, SessionReport};

/// Format version written to and expected from the save file.
const SAVE_VERSION: u32 = 1;

/// File-backed store for campaign progress and lifetime statistics.
#[derive(Debug)]
pub struct ProgressStore {
    path: Option<PathBuf>,
    data: SaveData,
}

impl ProgressStore {
    /// Opens the store backed by the provided file.
    ///
    /// The file is read once, eagerly. Unusable contents are logged and
    /// replaced with defaults; the path is kept so later saves can still
    /// succeed.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match read_save(&path) {
            Ok(Some(data)) => data,
            Ok(None) => SaveData::default(),
            Err(error) => {
                log::warn!("save data at {} unusable: {error}", path.display());
                SaveData::default()
            }
        };
        Self {
            path: Some(path),
            data,
        }
    }

    /// Creates a store that never touches the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: SaveData::default(),
        }
    }

    /// Records a finished session: statistics always, progression on victory.
    ///
    /// A first-time victory marks the level completed, advances the campaign
    /// cursor (never past the last level), and unlocks the kind the level
    /// gates. Replaying a completed level counts the game and its kills but
    /// not another win.
    pub fn record_session(&mut self, report: &SessionReport) {
        self.data.stats.total_games += 1;
        self.data.stats.total_kills += u64::from(report.attackers_defeated);
        if report.outcome == Outcome::Victory {
            self.record_victory(report.level);
        }
        self.persist();
    }

    /// Discards all saved progress and statistics.
    pub fn reset(&mut self) {
        self.data = SaveData::default();
        self.persist();
    }

    /// Level the campaign cursor currently points at.
    #[must_use]
    pub fn current_level(&self) -> LevelId {
        self.data.progress.current_level
    }

    /// Whether the provided level may be played: the opener always, any
    /// other level once its predecessor is completed.
    #[must_use]
    pub fn is_unlocked(&self, level: LevelId) -> bool {
        match level.get() {
            0 => false,
            1 => true,
            number => self
                .data
                .progress
                .completed_levels
                .contains(&LevelId::new(number - 1)),
        }
    }

    /// Whether the provided level has ever been won.
    #[must_use]
    pub fn is_completed(&self, level: LevelId) -> bool {
        self.data.progress.completed_levels.contains(&level)
    }

    /// Defender kinds the player has unlocked so far, in unlock order.
    #[must_use]
    pub fn unlocked_kinds(&self) -> &[DefenderKind] {
        &self.data.progress.unlocked_kinds
    }

    /// Lifetime statistics across every recorded session.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.data.stats
    }

    /// Writes the current state to the backing file, if one is configured.
    pub fn save(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StorageError::Write)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.data).map_err(StorageError::Encode)?;
        fs::write(path, contents).map_err(StorageError::Write)
    }

    fn record_victory(&mut self, level: LevelId) {
        if self.data.progress.completed_levels.insert(level) {
            self.data.stats.total_wins += 1;
        }
        if level.get() < lane_defence_content::campaign_len() {
            let next = LevelId::new(level.get() + 1);
            self.data.progress.current_level = self.data.progress.current_level.max(next);
        }
        if let Some(kind) = lane_defence_content::unlock_for(level) {
            if !self.data.progress.unlocked_kinds.contains(&kind) {
                self.data.progress.unlocked_kinds.push(kind);
            }
        }
    }

    fn persist(&self) {
        if let Err(error) = self.save() {
            log::warn!("progress not saved, continuing in memory: {error}");
        }
    }
}

/// Lifetime statistics kept across sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Sessions recorded, wins and losses alike.
    pub total_games: u64,
    /// First-time level completions.
    pub total_wins: u64,
    /// Attackers defeated across all recorded sessions.
    pub total_kills: u64,
}

/// Reasons an interaction with the save file failed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The save file exists but could not be read.
    #[error("failed to read save data")]
    Read(#[source] io::Error),
    /// The save file held JSON this build cannot understand.
    #[error("save data is corrupt")]
    Corrupt(#[source] serde_json::Error),
    /// The save file declares a format version this build does not know.
    #[error("save data version {found} is unsupported, expected {}", SAVE_VERSION)]
    UnsupportedVersion {
        /// Version number found in the file.
        found: u32,
    },
    /// The save data could not be serialized.
    #[error("failed to encode save data")]
    Encode(#[source] serde_json::Error),
    /// The save file could not be written.
    #[error("failed to write save data")]
    Write(#[source] io::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SaveData {
    version: u32,
    progress: Progress,
    stats: Stats,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Progress {
    current_level: LevelId,
    completed_levels: BTreeSet<LevelId>,
    unlocked_kinds: Vec<DefenderKind>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            progress: Progress {
                current_level: LevelId::new(1),
                completed_levels: BTreeSet::new(),
                unlocked_kinds: vec![
                    DefenderKind::Sunflower,
                    DefenderKind::Peashooter,
                    DefenderKind::Wallnut,
                ],
            },
            stats: Stats::default(),
        }
    }
}

fn read_save(path: &Path) -> Result<Option<SaveData>, StorageError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(StorageError::Read(error)),
    };
    let data: SaveData = serde_json::from_str(&contents).map_err(StorageError::Corrupt)?;
    if data.version != SAVE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: data.version,
        });
    }
    Ok(Some(data))
}
