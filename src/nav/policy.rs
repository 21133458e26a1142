//! Movement policies: cost, range, and passability rules
//!
//! The lookahead variant is an independent implementation of the same trait
//! rather than a subclass-style override of the real policy; its relaxed
//! rules are explicit in its fields.

use ahash::AHashSet;

use crate::core::types::{MetaType, UnitId};
use crate::grid::coord::GridCoord;
use crate::grid::tile::{Tile, TileKind};
use crate::units::balancing::Balancing;

/// Cost and passability rules governing one unit's movement search
pub trait MovementPolicy {
    /// Cost to enter a tile of this kind; `None` means impassable terrain
    fn cost(&self, kind: TileKind) -> Option<u32>;

    /// May the search keep going once this much cost is accumulated?
    fn has_range_left(&self, accumulated: u32) -> bool;

    /// Smallest cost this policy can charge for one step
    ///
    /// Scales the router's distance heuristic; a policy with a zero-cost
    /// tile kind must return 0 or the heuristic overestimates.
    fn min_step_cost(&self) -> u32 {
        1
    }

    /// May the mover be on this tile? `pass_through_only` distinguishes
    /// crossing a tile from ending a turn on it.
    fn can_occupy(
        &self,
        coord: GridCoord,
        tile: &Tile,
        cost_to_reach: u32,
        pass_through_only: bool,
    ) -> bool;
}

/// Occupancy rule shared by the real and lookahead policies: a living unit
/// blocks the tile unless it is the mover itself, or the mover may pass
/// through its meta-type (crossing only, never stopping).
fn occupancy_allows(
    mover: UnitId,
    passable: &AHashSet<MetaType>,
    tile: &Tile,
    pass_through_only: bool,
) -> bool {
    match &tile.occupant {
        None => true,
        Some(occupant) if occupant.unit == mover => true,
        Some(occupant) => pass_through_only && passable.contains(&occupant.meta_type),
    }
}

/// Real per-turn movement: range cap enforced, occupancy respected
pub struct RealMovementPolicy<'a> {
    mover: UnitId,
    balancing: &'a Balancing,
}

impl<'a> RealMovementPolicy<'a> {
    pub fn new(mover: UnitId, balancing: &'a Balancing) -> Self {
        Self { mover, balancing }
    }
}

impl MovementPolicy for RealMovementPolicy<'_> {
    fn cost(&self, kind: TileKind) -> Option<u32> {
        self.balancing.cost_for(kind)
    }

    fn has_range_left(&self, accumulated: u32) -> bool {
        accumulated <= self.balancing.movement_range
    }

    fn min_step_cost(&self) -> u32 {
        self.balancing.min_tile_cost()
    }

    fn can_occupy(
        &self,
        _coord: GridCoord,
        tile: &Tile,
        _cost_to_reach: u32,
        pass_through_only: bool,
    ) -> bool {
        occupancy_allows(
            self.mover,
            &self.balancing.passable_meta_types,
            tile,
            pass_through_only,
        )
    }
}

/// Multi-turn planning: no range cap, and occupants within this turn's
/// would-be reach are treated as transient (they will have moved by the time
/// the mover arrives). The declared target tile is always occupiable.
pub struct LookaheadPolicy<'a> {
    mover: UnitId,
    balancing: &'a Balancing,
    target: GridCoord,
}

impl<'a> LookaheadPolicy<'a> {
    pub fn new(mover: UnitId, balancing: &'a Balancing, target: GridCoord) -> Self {
        Self {
            mover,
            balancing,
            target,
        }
    }
}

impl MovementPolicy for LookaheadPolicy<'_> {
    fn cost(&self, kind: TileKind) -> Option<u32> {
        self.balancing.cost_for(kind)
    }

    fn has_range_left(&self, _accumulated: u32) -> bool {
        true
    }

    fn min_step_cost(&self) -> u32 {
        self.balancing.min_tile_cost()
    }

    fn can_occupy(
        &self,
        coord: GridCoord,
        tile: &Tile,
        cost_to_reach: u32,
        pass_through_only: bool,
    ) -> bool {
        if coord == self.target {
            return true;
        }
        if cost_to_reach <= self.balancing.movement_range {
            return true;
        }
        occupancy_allows(
            self.mover,
            &self.balancing.passable_meta_types,
            tile,
            pass_through_only,
        )
    }
}

/// Legality is purely membership in the fixed route network; cost is ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteOnlyPolicy;

impl MovementPolicy for RouteOnlyPolicy {
    fn cost(&self, _kind: TileKind) -> Option<u32> {
        Some(1)
    }

    fn has_range_left(&self, _accumulated: u32) -> bool {
        true
    }

    fn can_occupy(
        &self,
        _coord: GridCoord,
        tile: &Tile,
        _cost_to_reach: u32,
        _pass_through_only: bool,
    ) -> bool {
        tile.linked_route
    }
}
