//! Tiles: terrain tag, linked-route flag, occupancy
//!
//! At most one living unit occupies a tile at any query time.

use serde::{Deserialize, Serialize};

use crate::core::types::{MetaType, UnitId};

/// Terrain tag; movement cost per kind comes from the mover's balancing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Grass,
    Forest,
    Road,
    Water,
    Mountain,
}

/// The unit currently standing on a tile
///
/// Meta-type is colocated here so passability checks never need a roster
/// lookup mid-search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub unit: UnitId,
    pub meta_type: MetaType,
}

/// A single registered tile on the battle grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Part of a fixed route network (used by route-only movement)
    pub linked_route: bool,
    pub occupant: Option<Occupant>,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            linked_route: false,
            occupant: None,
        }
    }

    pub fn with_linked_route(mut self) -> Self {
        self.linked_route = true;
        self
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}
