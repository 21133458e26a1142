//! Integer grid coordinates (Manhattan metric)
//!
//! Legality of a coordinate is delegated to tile lookup; the offset tables
//! here never bounds-check.

use serde::{Deserialize, Serialize};

/// Neighbor offsets in the four cardinal directions
pub const CARDINAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Neighbor offsets in the four diagonal directions
pub const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 2D coordinate on the battle grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance: |dx| + |dy|
    pub fn distance(&self, other: &Self) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Neighboring coordinates from the fixed offset tables (4 or 8)
    pub fn neighbors(&self, include_diagonals: bool) -> Vec<GridCoord> {
        let mut result: Vec<GridCoord> = CARDINAL_OFFSETS
            .iter()
            .map(|(dx, dy)| GridCoord::new(self.x + dx, self.y + dy))
            .collect();
        if include_diagonals {
            result.extend(
                DIAGONAL_OFFSETS
                    .iter()
                    .map(|(dx, dy)| GridCoord::new(self.x + dx, self.y + dy)),
            );
        }
        result
    }

    /// Unit-step direction vector toward an adjacent coordinate
    pub fn direction_to(&self, other: &Self) -> (i32, i32) {
        ((other.x - self.x).signum(), (other.y - self.y).signum())
    }
}
