//! Per-archetype balancing tables
//!
//! Every unit type referenced in a battle must have balancing registered
//! before the first turn; the store validates this up front rather than
//! letting a missing entry default to zero movement or damage mid-turn.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{MetaType, UnitTypeId};
use crate::grid::tile::TileKind;

/// Movement, attack and damage numbers for one unit archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balancing {
    pub unit_type: UnitTypeId,
    pub meta_type: MetaType,
    pub max_health: u32,
    /// Movement allowance per turn (accumulated tile cost cap)
    pub movement_range: u32,
    /// Cost to enter a tile of each kind; absent kinds are impassable
    pub tile_costs: AHashMap<TileKind, u32>,
    /// Enemy meta-types this unit may pass through (never stop on)
    pub passable_meta_types: AHashSet<MetaType>,
    pub attack_range: u32,
    /// Damage dealt per enemy archetype; absent types take zero damage
    pub damage: AHashMap<UnitTypeId, u32>,
}

impl Balancing {
    pub fn new(unit_type: UnitTypeId, meta_type: MetaType) -> Self {
        Self {
            unit_type,
            meta_type,
            max_health: 1,
            movement_range: 0,
            tile_costs: AHashMap::new(),
            passable_meta_types: AHashSet::new(),
            attack_range: 0,
            damage: AHashMap::new(),
        }
    }

    pub fn with_health(mut self, health: u32) -> Self {
        self.max_health = health;
        self
    }

    pub fn with_movement_range(mut self, range: u32) -> Self {
        self.movement_range = range;
        self
    }

    pub fn with_tile_cost(mut self, kind: TileKind, cost: u32) -> Self {
        self.tile_costs.insert(kind, cost);
        self
    }

    pub fn with_passable_meta_type(mut self, meta: MetaType) -> Self {
        self.passable_meta_types.insert(meta);
        self
    }

    pub fn with_attack_range(mut self, range: u32) -> Self {
        self.attack_range = range;
        self
    }

    pub fn with_damage(mut self, against: UnitTypeId, amount: u32) -> Self {
        self.damage.insert(against, amount);
        self
    }

    /// Cost to enter a tile of the given kind; `None` means impassable
    pub fn cost_for(&self, kind: TileKind) -> Option<u32> {
        self.tile_costs.get(&kind).copied()
    }

    /// Damage dealt against an enemy archetype (zero when not in the table)
    pub fn damage_against(&self, unit_type: UnitTypeId) -> u32 {
        self.damage.get(&unit_type).copied().unwrap_or(0)
    }

    /// Smallest entry in the tile cost table (1 when the table is empty)
    pub fn min_tile_cost(&self) -> u32 {
        self.tile_costs.values().copied().min().unwrap_or(1)
    }
}

/// Registry of balancing data, keyed by unit type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalancingStore {
    entries: AHashMap<UnitTypeId, Balancing>,
}

impl BalancingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, balancing: Balancing) {
        self.entries.insert(balancing.unit_type, balancing);
    }

    pub fn balancing_for(&self, unit_type: UnitTypeId) -> Option<&Balancing> {
        self.entries.get(&unit_type)
    }

    /// Hard failure if any referenced type lacks balancing
    pub fn validate(&self, unit_types: impl IntoIterator<Item = UnitTypeId>) -> Result<()> {
        for unit_type in unit_types {
            if !self.entries.contains_key(&unit_type) {
                return Err(EngineError::MissingBalancing(unit_type));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_for_missing_kind_is_impassable() {
        let b = Balancing::new(UnitTypeId(1), MetaType::Land).with_tile_cost(TileKind::Grass, 1);
        assert_eq!(b.cost_for(TileKind::Grass), Some(1));
        assert_eq!(b.cost_for(TileKind::Water), None);
    }

    #[test]
    fn test_damage_defaults_to_zero() {
        let b = Balancing::new(UnitTypeId(1), MetaType::Land).with_damage(UnitTypeId(2), 3);
        assert_eq!(b.damage_against(UnitTypeId(2)), 3);
        assert_eq!(b.damage_against(UnitTypeId(9)), 0);
    }

    #[test]
    fn test_validate_reports_missing_type() {
        let mut store = BalancingStore::new();
        store.insert(Balancing::new(UnitTypeId(1), MetaType::Land));

        assert!(store.validate([UnitTypeId(1)]).is_ok());
        let err = store.validate([UnitTypeId(1), UnitTypeId(7)]).unwrap_err();
        assert!(matches!(
            err,
            crate::core::error::EngineError::MissingBalancing(UnitTypeId(7))
        ));
    }
}
