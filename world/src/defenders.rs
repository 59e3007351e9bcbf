//! Authoritative defender state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use lane_defence_core::{
    catalog::{self, DefenderBehavior},
    playfield, DefenderId, DefenderKind, GridCoord,
};

/// State of a defender stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct DefenderState {
    /// Identifier allocated by the world for the defender.
    pub(crate) id: DefenderId,
    /// Kind of defender that was constructed.
    pub(crate) kind: DefenderKind,
    /// Cell the defender occupies.
    pub(crate) cell: GridCoord,
    /// Current health.
    pub(crate) health: u32,
    /// Health at construction time.
    pub(crate) max_health: u32,
    /// Simulated time the defender was placed at.
    pub(crate) created_at: Duration,
    /// Time of the defender's most recent action, if it acted at all.
    ///
    /// Producers seed this with their creation time so the first yield waits
    /// a full interval; shooters leave it empty so the first shot is
    /// immediate once an attacker shows up in the lane.
    pub(crate) last_action: Option<Duration>,
}

impl DefenderState {
    /// Time remaining until the defender may act; `None` for walls.
    pub(crate) fn ready_in(&self, now: Duration) -> Option<Duration> {
        let profile = catalog::defender_profile(self.kind);
        match profile.behavior {
            DefenderBehavior::Producer { interval, .. } => {
                let last = self.last_action.unwrap_or(self.created_at);
                Some((last + interval).saturating_sub(now))
            }
            DefenderBehavior::Shooter { .. } => match self.last_action {
                None => Some(Duration::ZERO),
                Some(last) => Some((last + profile.attack_interval).saturating_sub(now)),
            },
            DefenderBehavior::Wall => None,
            DefenderBehavior::Detonator { .. } => {
                Some((self.created_at + profile.attack_interval).saturating_sub(now))
            }
        }
    }
}

/// Outcome of applying melee or blast damage to a defender.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DamageOutcome {
    /// Health remaining after the damage was applied.
    pub(crate) health: u32,
    /// Set when the damage destroyed the defender and freed its slot.
    pub(crate) destroyed: Option<(DefenderKind, GridCoord)>,
}

/// Registry that stores defenders and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct DefenderRegistry {
    entries: BTreeMap<DefenderId, DefenderState>,
    occupancy: OccupancyGrid,
    next_id: DefenderId,
}

impl DefenderRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            occupancy: OccupancyGrid::new(),
            next_id: DefenderId::new(0),
        }
    }

    /// Constructs a defender of the provided kind at an already-validated cell.
    pub(crate) fn place(&mut self, kind: DefenderKind, cell: GridCoord, now: Duration) -> DefenderId {
        let id = self.next_id;
        self.next_id = DefenderId::new(id.get().wrapping_add(1));
        let profile = catalog::defender_profile(kind);
        let last_action = match profile.behavior {
            DefenderBehavior::Producer { .. } => Some(now),
            _ => None,
        };
        let state = DefenderState {
            id,
            kind,
            cell,
            health: profile.health,
            max_health: profile.health,
            created_at: now,
            last_action,
        };
        self.occupancy.occupy(id, cell);
        let _ = self.entries.insert(id, state);
        id
    }

    /// Removes a defender and frees its slot, returning its final state.
    pub(crate) fn remove(&mut self, id: DefenderId) -> Option<DefenderState> {
        let state = self.entries.remove(&id)?;
        self.occupancy.vacate(state.cell);
        Some(state)
    }

    /// Applies damage to a defender, removing it if health reaches zero.
    pub(crate) fn damage(&mut self, id: DefenderId, amount: u32) -> Option<DamageOutcome> {
        let state = self.entries.get_mut(&id)?;
        state.health = state.health.saturating_sub(amount);
        if state.health == 0 {
            let state = self.remove(id)?;
            Some(DamageOutcome {
                health: 0,
                destroyed: Some((state.kind, state.cell)),
            })
        } else {
            Some(DamageOutcome {
                health: state.health,
                destroyed: None,
            })
        }
    }

    /// Returns the defender occupying the provided cell, if any.
    pub(crate) fn occupant(&self, cell: GridCoord) -> Option<DefenderId> {
        self.occupancy.occupant(cell)
    }

    /// Looks up a defender's state by identifier.
    pub(crate) fn state(&self, id: DefenderId) -> Option<&DefenderState> {
        self.entries.get(&id)
    }

    /// Looks up a defender's state mutably by identifier.
    pub(crate) fn state_mut(&mut self, id: DefenderId) -> Option<&mut DefenderState> {
        self.entries.get_mut(&id)
    }

    /// Iterates defenders in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &DefenderState> {
        self.entries.values()
    }
}

/// Dense slot map covering the fixed placement grid.
#[derive(Debug)]
pub(crate) struct OccupancyGrid {
    cells: Vec<Option<DefenderId>>,
}

impl OccupancyGrid {
    pub(crate) fn new() -> Self {
        let size = (playfield::GRID_ROWS * playfield::GRID_COLUMNS) as usize;
        Self {
            cells: vec![None; size],
        }
    }

    /// Reports whether the cell lies inside the placement grid.
    pub(crate) fn in_bounds(cell: GridCoord) -> bool {
        cell.row() < playfield::GRID_ROWS && cell.column() < playfield::GRID_COLUMNS
    }

    /// Returns the defender occupying the provided cell, if any.
    pub(crate) fn occupant(&self, cell: GridCoord) -> Option<DefenderId> {
        Self::index(cell).and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, id: DefenderId, cell: GridCoord) {
        if let Some(index) = Self::index(cell) {
            self.cells[index] = Some(id);
        }
    }

    /// Clears the provided cell; clearing an empty cell is a no-op.
    fn vacate(&mut self, cell: GridCoord) {
        if let Some(index) = Self::index(cell) {
            self.cells[index] = None;
        }
    }

    fn index(cell: GridCoord) -> Option<usize> {
        if !Self::in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(playfield::GRID_COLUMNS).ok()?;
        Some(row * width + column)
    }
}
