//! Grid primitives: coordinates, tiles, sparse tile storage

pub mod coord;
pub mod map;
pub mod tile;

pub use coord::{GridCoord, CARDINAL_OFFSETS, DIAGONAL_OFFSETS};
pub use map::{TileGrid, TileProvider};
pub use tile::{Occupant, Tile, TileKind};
