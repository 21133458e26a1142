//! Battlefield: tile grid, roster and balancing behind one mutation path
//!
//! Occupancy lives on tiles and positions live on units; routing every
//! mutation through here keeps the two views coherent, so a death is
//! visible to the very next query.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{Side, UnitId, UnitTypeId};
use crate::grid::coord::GridCoord;
use crate::grid::map::{TileGrid, TileProvider};
use crate::units::balancing::{Balancing, BalancingStore};
use crate::units::roster::{UnitDirectory, UnitRoster};
use crate::units::unit::Unit;

/// Result of one resolved attack
#[derive(Debug, Clone, Copy)]
pub struct AttackOutcome {
    pub damage: u32,
    pub killed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battlefield {
    pub grid: TileGrid,
    pub roster: UnitRoster,
    pub balancing: BalancingStore,
}

impl Battlefield {
    pub fn new(grid: TileGrid, balancing: BalancingStore) -> Self {
        Self {
            grid,
            roster: UnitRoster::new(),
            balancing,
        }
    }

    /// Spawn a unit of a registered archetype onto a vacant registered tile
    ///
    /// Missing balancing is caught here, at registration time, never
    /// mid-turn.
    pub fn spawn_unit(
        &mut self,
        unit_type: UnitTypeId,
        side: Side,
        position: GridCoord,
    ) -> Result<UnitId> {
        let balancing = self
            .balancing
            .balancing_for(unit_type)
            .ok_or(EngineError::MissingBalancing(unit_type))?;
        if self.grid.lookup(position).is_none() {
            return Err(EngineError::NoTileAt(position));
        }
        if self.grid.occupant_at(position).is_some() {
            return Err(EngineError::TileOccupied(position));
        }
        let unit = Unit::from_balancing(balancing, side, position);
        let meta_type = unit.meta_type;
        let id = self.roster.insert(unit)?;
        self.grid.set_occupant(position, id, meta_type);
        Ok(id)
    }

    /// Hard failure before battle start if any living unit lacks balancing
    pub fn validate_balancing(&self) -> Result<()> {
        self.balancing
            .validate(self.roster.living_units().map(|u| u.unit_type))
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.roster.get(id).ok_or(EngineError::UnitNotFound(id))
    }

    pub fn balancing_of(&self, id: UnitId) -> Result<&Balancing> {
        let unit = self.unit(id)?;
        self.balancing
            .balancing_for(unit.unit_type)
            .ok_or(EngineError::MissingBalancing(unit.unit_type))
    }

    /// Relocate a unit, keeping tile occupancy and the roster index in step
    pub fn move_unit(&mut self, id: UnitId, to: GridCoord) -> Result<()> {
        let (from, meta_type) = {
            let unit = self.unit(id)?;
            (unit.position, unit.meta_type)
        };
        if from == to {
            return Ok(());
        }
        self.roster.move_unit(id, to)?;
        self.grid.clear_occupant(from);
        self.grid.set_occupant(to, id, meta_type);
        Ok(())
    }

    /// Apply the attacker's balancing-table damage to the target; a kill
    /// vacates the target's tile immediately
    pub fn apply_attack(&mut self, attacker: UnitId, target: UnitId) -> Result<AttackOutcome> {
        let damage = {
            let target_unit = self.unit(target)?;
            self.balancing_of(attacker)?.damage_against(target_unit.unit_type)
        };
        let target_unit = self
            .roster
            .get_mut(target)
            .ok_or(EngineError::UnitNotFound(target))?;
        let position = target_unit.position;
        let killed = target_unit.take_damage(damage);
        if killed {
            self.roster.mark_dead(target);
            self.grid.clear_occupant(position);
        }
        Ok(AttackOutcome { damage, killed })
    }

    /// Is the attacker currently within attack range of the target?
    pub fn in_attack_range(&self, attacker: UnitId, target: UnitId) -> Result<bool> {
        let attacker_unit = self.unit(attacker)?;
        let target_unit = self.unit(target)?;
        let range = self.balancing_of(attacker)?.attack_range;
        Ok(attacker_unit.position.distance(&target_unit.position) <= range)
    }

    pub fn living_units_of(&self, side: Side) -> Vec<UnitId> {
        self.roster.units_of(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MetaType;
    use crate::grid::tile::TileKind;

    fn store() -> BalancingStore {
        let mut store = BalancingStore::new();
        store.insert(
            Balancing::new(UnitTypeId(1), MetaType::Land)
                .with_health(4)
                .with_movement_range(3)
                .with_tile_cost(TileKind::Grass, 1)
                .with_attack_range(1)
                .with_damage(UnitTypeId(1), 4),
        );
        store
    }

    fn field() -> Battlefield {
        Battlefield::new(TileGrid::rectangle(5, 5, TileKind::Grass), store())
    }

    #[test]
    fn test_spawn_requires_balancing() {
        let mut field = field();
        let err = field
            .spawn_unit(UnitTypeId(99), Side::Player, GridCoord::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingBalancing(UnitTypeId(99))));
    }

    #[test]
    fn test_spawn_requires_registered_vacant_tile() {
        let mut field = field();
        assert!(matches!(
            field.spawn_unit(UnitTypeId(1), Side::Player, GridCoord::new(9, 9)),
            Err(EngineError::NoTileAt(_))
        ));
        field
            .spawn_unit(UnitTypeId(1), Side::Player, GridCoord::new(0, 0))
            .unwrap();
        assert!(matches!(
            field.spawn_unit(UnitTypeId(1), Side::Opponent, GridCoord::new(0, 0)),
            Err(EngineError::TileOccupied(_))
        ));
    }

    #[test]
    fn test_move_updates_occupancy() {
        let mut field = field();
        let id = field
            .spawn_unit(UnitTypeId(1), Side::Player, GridCoord::new(0, 0))
            .unwrap();
        field.move_unit(id, GridCoord::new(1, 0)).unwrap();
        assert_eq!(field.grid.occupant_at(GridCoord::new(1, 0)), Some(id));
        assert_eq!(field.grid.occupant_at(GridCoord::new(0, 0)), None);
        assert_eq!(field.unit(id).unwrap().position, GridCoord::new(1, 0));
    }

    #[test]
    fn test_lethal_attack_vacates_tile_immediately() {
        let mut field = field();
        let attacker = field
            .spawn_unit(UnitTypeId(1), Side::Player, GridCoord::new(0, 0))
            .unwrap();
        let target = field
            .spawn_unit(UnitTypeId(1), Side::Opponent, GridCoord::new(1, 0))
            .unwrap();

        let outcome = field.apply_attack(attacker, target).unwrap();
        assert_eq!(outcome.damage, 4);
        assert!(outcome.killed);
        assert_eq!(field.grid.occupant_at(GridCoord::new(1, 0)), None);
        assert!(field.living_units_of(Side::Opponent).is_empty());
    }
}
