//! Unit roster: directory of living units by side and position

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{Side, UnitId};
use crate::grid::coord::GridCoord;
use crate::units::unit::Unit;

/// Lookup contract the decision engine consumes
pub trait UnitDirectory {
    /// Living units of a side (order unspecified)
    fn units_of(&self, side: Side) -> Vec<UnitId>;
    /// Living unit standing at a coordinate, if any
    fn unit_at(&self, coord: GridCoord) -> Option<UnitId>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRoster {
    units: AHashMap<UnitId, Unit>,
    by_position: AHashMap<GridCoord, UnitId>,
}

impl UnitRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit; fails if its position is already held by a living unit
    pub fn insert(&mut self, unit: Unit) -> Result<UnitId> {
        if self.by_position.contains_key(&unit.position) {
            return Err(EngineError::TileOccupied(unit.position));
        }
        let id = unit.id;
        self.by_position.insert(unit.position, id);
        self.units.insert(id, unit);
        Ok(id)
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Relocate a living unit, keeping the position index coherent
    pub fn move_unit(&mut self, id: UnitId, to: GridCoord) -> Result<()> {
        let unit = self.units.get_mut(&id).ok_or(EngineError::UnitNotFound(id))?;
        let from = unit.position;
        if let Some(holder) = self.by_position.get(&to) {
            if *holder != id {
                return Err(EngineError::TileOccupied(to));
            }
        }
        unit.position = to;
        self.by_position.remove(&from);
        self.by_position.insert(to, id);
        Ok(())
    }

    /// Mark a unit dead and drop it from the position index
    pub fn mark_dead(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.alive = false;
            self.by_position.remove(&unit.position);
        }
    }

    /// Clear per-unit acted flags for a side at turn end
    pub fn reset_acted(&mut self, side: Side) {
        for unit in self.units.values_mut() {
            if unit.side == side {
                unit.acted = false;
            }
        }
    }

    pub fn living_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.is_alive())
    }
}

impl UnitDirectory for UnitRoster {
    fn units_of(&self, side: Side) -> Vec<UnitId> {
        self.living_units()
            .filter(|u| u.side == side)
            .map(|u| u.id)
            .collect()
    }

    fn unit_at(&self, coord: GridCoord) -> Option<UnitId> {
        self.by_position.get(&coord).copied()
    }
}
