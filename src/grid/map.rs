//! Sparse tile storage backing adjacency and occupancy checks
//!
//! Maps may be irregular: only registered coordinates exist. Querying an
//! unregistered coordinate means "not walkable", never an error.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{MetaType, UnitId};
use crate::grid::coord::GridCoord;
use crate::grid::tile::{Occupant, Tile};

/// Read/registration contract for tile storage
///
/// The navigation service is generic over this seam so tests can substitute
/// hand-built grids.
pub trait TileProvider {
    fn lookup(&self, coord: GridCoord) -> Option<&Tile>;
    fn register(&mut self, coord: GridCoord, tile: Tile);
}

/// Sparse hash-backed grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileGrid {
    tiles: AHashMap<GridCoord, Tile>,
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fully populated rectangular grid of one terrain kind
    pub fn rectangle(width: i32, height: i32, kind: crate::grid::tile::TileKind) -> Self {
        let mut grid = Self::new();
        for x in 0..width {
            for y in 0..height {
                grid.register(GridCoord::new(x, y), Tile::new(kind));
            }
        }
        grid
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Place a unit on a tile; overwrites nothing if the coordinate is
    /// unregistered
    pub fn set_occupant(&mut self, coord: GridCoord, unit: UnitId, meta_type: MetaType) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.occupant = Some(Occupant { unit, meta_type });
        }
    }

    /// Vacate a tile
    pub fn clear_occupant(&mut self, coord: GridCoord) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.occupant = None;
        }
    }

    /// Unit standing at a coordinate, if any
    pub fn occupant_at(&self, coord: GridCoord) -> Option<UnitId> {
        self.tiles
            .get(&coord)
            .and_then(|t| t.occupant.as_ref())
            .map(|o| o.unit)
    }
}

impl TileProvider for TileGrid {
    fn lookup(&self, coord: GridCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Register a tile; a duplicate registration keeps the first tile and
    /// logs an integrity warning
    fn register(&mut self, coord: GridCoord, tile: Tile) {
        if self.tiles.contains_key(&coord) {
            tracing::warn!(?coord, "duplicate tile registration ignored");
            return;
        }
        self.tiles.insert(coord, tile);
    }
}
