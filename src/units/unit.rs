//! Unit state: position, side, health
//!
//! A unit dies exactly when health reaches zero; vacating its tile is the
//! battlefield's job so the change is visible to the very next query.

use serde::{Deserialize, Serialize};

use crate::core::types::{MetaType, Side, UnitId, UnitTypeId};
use crate::grid::coord::GridCoord;
use crate::units::balancing::Balancing;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitTypeId,
    /// Copied from balancing at spawn so passability checks are local
    pub meta_type: MetaType,
    pub side: Side,
    pub position: GridCoord,
    pub health: u32,
    pub alive: bool,
    /// Set once this unit's turn has been resolved; cleared at turn end
    pub acted: bool,
}

impl Unit {
    /// Spawn from balancing data; the caller proves balancing exists by
    /// holding a reference to it
    pub fn from_balancing(balancing: &Balancing, side: Side, position: GridCoord) -> Self {
        Self {
            id: UnitId::new(),
            unit_type: balancing.unit_type,
            meta_type: balancing.meta_type,
            side,
            position,
            health: balancing.max_health,
            alive: true,
            acted: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Apply damage; returns true if this killed the unit
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }
}
