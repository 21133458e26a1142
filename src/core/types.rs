//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier for a unit archetype; key into the balancing store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTypeId(pub u32);

/// Controlling side in a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    /// The opposing side
    pub fn enemy(&self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Unit classification governing tile passability, independent of team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaType {
    Land,
    Water,
    Air,
}

/// Turn counter (one full side activation)
pub type Turn = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_enemy() {
        assert_eq!(Side::Player.enemy(), Side::Opponent);
        assert_eq!(Side::Opponent.enemy(), Side::Player);
    }

    #[test]
    fn test_unit_ids_unique() {
        assert_ne!(UnitId::new(), UnitId::new());
    }
}
