use thiserror::Error;

use crate::core::types::{UnitId, UnitTypeId};
use crate::grid::coord::GridCoord;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no balancing data registered for unit type {0:?}")]
    MissingBalancing(UnitTypeId),

    #[error("unit not found: {0:?}")]
    UnitNotFound(UnitId),

    #[error("no registered tile at {0:?}")]
    NoTileAt(GridCoord),

    #[error("tile at {0:?} is already occupied")]
    TileOccupied(GridCoord),

    #[error("a turn is already in progress")]
    TurnInProgress,

    #[error("no turn is in progress")]
    NoTurnInProgress,

    #[error("engine is not awaiting a movement completion")]
    NotAwaitingMovement,

    #[error("battle has already ended")]
    BattleEnded,
}

pub type Result<T> = std::result::Result<T, EngineError>;
