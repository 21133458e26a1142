//! Turn event log
//!
//! Every externally visible decision the engine makes is appended here, in
//! resolution order. Descriptions carry positions and amounts only; unit
//! identities live in the typed kind.

use serde::{Deserialize, Serialize};

use crate::core::types::{Side, Turn, UnitId};
use crate::grid::coord::GridCoord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEventKind {
    TurnStarted {
        side: Side,
    },
    TargetSelected {
        unit: UnitId,
        target: UnitId,
    },
    /// Full route committed toward an attack position
    MovementCommitted {
        unit: UnitId,
        destination: GridCoord,
        steps: usize,
    },
    /// Lookahead-truncated advance toward an unreachable attack position
    PartialAdvance {
        unit: UnitId,
        destination: GridCoord,
    },
    /// No viable attack position this turn; close distance instead
    IdleMove {
        unit: UnitId,
        destination: GridCoord,
    },
    AttackResolved {
        attacker: UnitId,
        target: UnitId,
        damage: u32,
    },
    UnitDestroyed {
        unit: UnitId,
    },
    TurnEnded {
        side: Side,
    },
    BattleEnded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub turn: Turn,
    pub kind: TurnEventKind,
    pub description: String,
}

/// Append-only record of a battle's decisions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnEventLog {
    pub events: Vec<TurnEvent>,
}

impl TurnEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn, kind: TurnEventKind, description: impl Into<String>) {
        self.events.push(TurnEvent {
            turn,
            kind,
            description: description.into(),
        });
    }

    pub fn events_for_turn(&self, turn: Turn) -> impl Iterator<Item = &TurnEvent> {
        self.events.iter().filter(move |e| e.turn == turn)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
