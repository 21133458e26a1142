//! Grid navigation: range queries, reachability, A* routing, truncation
//!
//! All searches are total over sparse maps: an unregistered coordinate is
//! simply not walkable, never an error.

use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

use crate::grid::coord::GridCoord;
use crate::grid::map::TileProvider;
use crate::nav::bucket_queue::PriorityBucketQueue;
use crate::nav::policy::MovementPolicy;

/// Ordered coordinates from a start to a destination; element 0 is always
/// the query start, consecutive elements are grid-adjacent. An empty route
/// means "already at destination"; `None` from [`NavigationService::route`]
/// means no legal route exists.
pub type Route = Vec<GridCoord>;

/// Diagnostic hook invoked once per node expansion during A*
///
/// Always compiled in; the default observer does nothing.
pub trait SearchObserver {
    fn expanded(&self, coord: GridCoord, accumulated_cost: u32, priority: u32);
}

/// Default no-op observer
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn expanded(&self, _coord: GridCoord, _accumulated_cost: u32, _priority: u32) {}
}

/// Observer that traces every expansion at debug level
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn expanded(&self, coord: GridCoord, accumulated_cost: u32, priority: u32) {
        tracing::debug!(?coord, accumulated_cost, priority, "node expanded");
    }
}

static NOOP_OBSERVER: NoopObserver = NoopObserver;

/// Pathfinding and range-query service over a tile provider
pub struct NavigationService<'a, T: TileProvider> {
    tiles: &'a T,
    observer: &'a dyn SearchObserver,
}

impl<'a, T: TileProvider> NavigationService<'a, T> {
    pub fn new(tiles: &'a T) -> Self {
        Self {
            tiles,
            observer: &NOOP_OBSERVER,
        }
    }

    pub fn with_observer(tiles: &'a T, observer: &'a dyn SearchObserver) -> Self {
        Self { tiles, observer }
    }

    /// Neighbor coordinates from the fixed offset tables (4 or 8); no bounds
    /// check, legality is delegated to tile lookup
    pub fn adjacent(&self, coord: GridCoord, include_diagonals: bool) -> Vec<GridCoord> {
        coord.neighbors(include_diagonals)
    }

    /// Registered tiles reachable from `source` through registered neighbors
    /// within Manhattan distance `radius`
    pub fn tiles_in_range(
        &self,
        source: GridCoord,
        radius: u32,
        include_source: bool,
    ) -> AHashSet<GridCoord> {
        let mut seen = AHashSet::new();
        let mut result = AHashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(source);
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            for neighbor in current.neighbors(false) {
                if seen.contains(&neighbor) {
                    continue;
                }
                if source.distance(&neighbor) > radius {
                    continue;
                }
                if self.tiles.lookup(neighbor).is_none() {
                    continue;
                }
                seen.insert(neighbor);
                result.insert(neighbor);
                queue.push_back(neighbor);
            }
        }

        if include_source && self.tiles.lookup(source).is_some() {
            result.insert(source);
        }
        result
    }

    /// Minimal cost to every tile the policy lets the mover stop on
    ///
    /// Relaxation search: a plain FIFO frontier with cost-compare overwrite
    /// rather than a sorted queue. Tiles that may only be crossed are used
    /// for expansion but excluded from the result.
    pub fn reachable_costs(
        &self,
        start: GridCoord,
        policy: &dyn MovementPolicy,
    ) -> AHashMap<GridCoord, u32> {
        let mut best: AHashMap<GridCoord, u32> = AHashMap::new();
        best.insert(start, 0);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let current_cost = best.get(&current).copied().unwrap_or(0);
            for neighbor in current.neighbors(false) {
                if neighbor == start {
                    continue;
                }
                let Some(tile) = self.tiles.lookup(neighbor) else {
                    continue;
                };
                let Some(step) = policy.cost(tile.kind) else {
                    continue;
                };
                let tentative = current_cost + step;
                if !policy.has_range_left(tentative) {
                    continue;
                }
                if !policy.can_occupy(neighbor, tile, tentative, true) {
                    continue;
                }
                if best.get(&neighbor).is_some_and(|&known| known <= tentative) {
                    continue;
                }
                best.insert(neighbor, tentative);
                queue.push_back(neighbor);
            }
        }

        best.into_iter()
            .filter(|(coord, cost)| {
                self.tiles
                    .lookup(*coord)
                    .is_some_and(|tile| policy.can_occupy(*coord, tile, *cost, false))
            })
            .collect()
    }

    /// Tiles the policy lets the mover stop on, reachable from `start`
    pub fn reachable_tiles(
        &self,
        start: GridCoord,
        policy: &dyn MovementPolicy,
    ) -> AHashSet<GridCoord> {
        self.reachable_costs(start, policy).into_keys().collect()
    }

    /// A* route from `start` to `goal` under a policy
    ///
    /// Priority is accumulated cost plus the Manhattan heuristic scaled by
    /// the policy's cheapest step, so a zero-cost tile kind degrades the
    /// heuristic to zero instead of overestimating. Equal priorities dequeue
    /// FIFO. Returns an empty route when start equals goal, `None` when the
    /// frontier exhausts without dequeuing the goal.
    pub fn route(
        &self,
        start: GridCoord,
        goal: GridCoord,
        policy: &dyn MovementPolicy,
    ) -> Option<Route> {
        if start == goal {
            return Some(Vec::new());
        }

        let mut frontier: PriorityBucketQueue<(GridCoord, u32)> = PriorityBucketQueue::new();
        let mut best_g: AHashMap<GridCoord, u32> = AHashMap::new();
        let mut came_from: AHashMap<GridCoord, GridCoord> = AHashMap::new();

        let step_floor = policy.min_step_cost();
        best_g.insert(start, 0);
        frontier.push(start.distance(&goal) * step_floor, (start, 0));

        while let Some((priority, (current, g))) = frontier.pop() {
            // Stale frontier entry: a cheaper way here was already found
            if best_g.get(&current).is_some_and(|&known| g > known) {
                continue;
            }
            self.observer.expanded(current, g, priority);

            if current == goal {
                return Some(reconstruct_route(&came_from, start, goal));
            }

            for neighbor in current.neighbors(false) {
                // The start never re-enters the search as a neighbor
                if neighbor == start {
                    continue;
                }
                let Some(tile) = self.tiles.lookup(neighbor) else {
                    continue;
                };
                let Some(step) = policy.cost(tile.kind) else {
                    continue;
                };
                let tentative = g + step;
                if !policy.has_range_left(tentative) {
                    continue;
                }
                // Intermediate tiles need only be crossable; the goal must
                // be legal to stop on
                let pass_through_only = neighbor != goal;
                if !policy.can_occupy(neighbor, tile, tentative, pass_through_only) {
                    continue;
                }
                if best_g.get(&neighbor).is_some_and(|&known| known <= tentative) {
                    continue;
                }
                best_g.insert(neighbor, tentative);
                came_from.insert(neighbor, current);
                frontier.push(
                    tentative + neighbor.distance(&goal) * step_floor,
                    (neighbor, tentative),
                );
            }
        }

        None
    }

    /// Affordable prefix of a route computed without a range cap
    ///
    /// Accumulates cost per node until the policy's allowance would be
    /// exceeded, then trims backward past any trailing node the policy
    /// forbids stopping on. The final element (if any) is always legal to
    /// end a turn on; the result may be empty.
    pub fn affordable_subroute(&self, full_route: &Route, policy: &dyn MovementPolicy) -> Route {
        if full_route.len() < 2 {
            return Vec::new();
        }

        let mut kept: Route = vec![full_route[0]];
        let mut costs: Vec<u32> = vec![0];
        let mut accumulated = 0u32;

        for coord in &full_route[1..] {
            let Some(tile) = self.tiles.lookup(*coord) else {
                break;
            };
            let Some(step) = policy.cost(tile.kind) else {
                break;
            };
            let next = accumulated + step;
            if !policy.has_range_left(next) {
                break;
            }
            accumulated = next;
            kept.push(*coord);
            costs.push(next);
        }

        while kept.len() > 1 {
            let last = kept[kept.len() - 1];
            let cost = costs[kept.len() - 1];
            let stoppable = self
                .tiles
                .lookup(last)
                .is_some_and(|tile| policy.can_occupy(last, tile, cost, false));
            if stoppable {
                break;
            }
            kept.pop();
            costs.pop();
        }

        if kept.len() < 2 {
            return Vec::new();
        }
        kept
    }
}

/// Back-pointer walk from goal to start
fn reconstruct_route(
    came_from: &AHashMap<GridCoord, GridCoord>,
    start: GridCoord,
    goal: GridCoord,
) -> Route {
    let mut route = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                route.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    route.reverse();
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MetaType, UnitId, UnitTypeId};
    use crate::grid::map::TileGrid;
    use crate::grid::tile::{Tile, TileKind};
    use crate::nav::policy::{RealMovementPolicy, RouteOnlyPolicy};
    use crate::units::balancing::Balancing;

    fn walker(range: u32) -> Balancing {
        Balancing::new(UnitTypeId(1), MetaType::Land)
            .with_movement_range(range)
            .with_tile_cost(TileKind::Grass, 1)
            .with_tile_cost(TileKind::Forest, 2)
    }

    #[test]
    fn test_adjacent_counts() {
        let grid = TileGrid::rectangle(3, 3, TileKind::Grass);
        let nav = NavigationService::new(&grid);
        assert_eq!(nav.adjacent(GridCoord::new(1, 1), false).len(), 4);
        assert_eq!(nav.adjacent(GridCoord::new(1, 1), true).len(), 8);
    }

    #[test]
    fn test_tiles_in_range_radius_zero() {
        let grid = TileGrid::rectangle(3, 3, TileKind::Grass);
        let nav = NavigationService::new(&grid);
        let source = GridCoord::new(1, 1);
        assert!(nav.tiles_in_range(source, 0, false).is_empty());
        let with_source = nav.tiles_in_range(source, 0, true);
        assert_eq!(with_source.len(), 1);
        assert!(with_source.contains(&source));
    }

    #[test]
    fn test_tiles_in_range_sparse_map() {
        // Two registered tiles separated by a gap: the far one is within
        // Manhattan distance but not reachable through registered neighbors
        let mut grid = TileGrid::new();
        grid.register(GridCoord::new(0, 0), Tile::new(TileKind::Grass));
        grid.register(GridCoord::new(0, 1), Tile::new(TileKind::Grass));
        grid.register(GridCoord::new(0, 3), Tile::new(TileKind::Grass));
        let nav = NavigationService::new(&grid);

        let result = nav.tiles_in_range(GridCoord::new(0, 0), 3, false);
        assert!(result.contains(&GridCoord::new(0, 1)));
        assert!(!result.contains(&GridCoord::new(0, 3)));
    }

    #[test]
    fn test_route_start_equals_goal_is_empty() {
        let grid = TileGrid::rectangle(3, 3, TileKind::Grass);
        let nav = NavigationService::new(&grid);
        let balancing = walker(5);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);
        let route = nav.route(GridCoord::new(1, 1), GridCoord::new(1, 1), &policy);
        assert_eq!(route, Some(Vec::new()));
    }

    #[test]
    fn test_route_straight_line() {
        let grid = TileGrid::rectangle(5, 5, TileKind::Grass);
        let nav = NavigationService::new(&grid);
        let balancing = walker(10);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);

        let route = nav
            .route(GridCoord::new(0, 0), GridCoord::new(3, 0), &policy)
            .unwrap();
        assert_eq!(route.first(), Some(&GridCoord::new(0, 0)));
        assert_eq!(route.last(), Some(&GridCoord::new(3, 0)));
        assert_eq!(route.len(), 4);
        for pair in route.windows(2) {
            assert_eq!(pair[0].distance(&pair[1]), 1);
        }
    }

    #[test]
    fn test_route_prefers_cheap_terrain() {
        // Forest at cost 3 on the direct line; the grass detour is cheaper
        let mut grid = TileGrid::new();
        for x in 0..4 {
            for y in 0..2 {
                let kind = if y == 0 && (x == 1 || x == 2) {
                    TileKind::Forest
                } else {
                    TileKind::Grass
                };
                grid.register(GridCoord::new(x, y), Tile::new(kind));
            }
        }

        let nav = NavigationService::new(&grid);
        let balancing = Balancing::new(UnitTypeId(1), MetaType::Land)
            .with_movement_range(20)
            .with_tile_cost(TileKind::Grass, 1)
            .with_tile_cost(TileKind::Forest, 3);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);
        let route = nav
            .route(GridCoord::new(0, 0), GridCoord::new(3, 0), &policy)
            .unwrap();

        let cost: u32 = route[1..]
            .iter()
            .map(|c| policy.cost(grid.lookup(*c).unwrap().kind).unwrap())
            .sum();
        // Detour: (0,1)(1,1)(2,1)(3,1)(3,0) = 5 vs direct 3+3+1 = 7
        assert_eq!(cost, 5);
        assert!(!route.contains(&GridCoord::new(1, 0)));
        assert!(!route.contains(&GridCoord::new(2, 0)));
    }

    #[test]
    fn test_route_takes_free_road_detour() {
        // Roads cost nothing, so the longer route along y=1 beats the
        // two-step grass line; an unscaled heuristic would pick the line
        let mut grid = TileGrid::new();
        for x in 0..3 {
            grid.register(GridCoord::new(x, 0), Tile::new(TileKind::Grass));
            grid.register(GridCoord::new(x, 1), Tile::new(TileKind::Road));
        }

        let nav = NavigationService::new(&grid);
        let balancing = Balancing::new(UnitTypeId(1), MetaType::Land)
            .with_movement_range(20)
            .with_tile_cost(TileKind::Grass, 1)
            .with_tile_cost(TileKind::Road, 0);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);
        assert_eq!(policy.min_step_cost(), 0);

        let route = nav
            .route(GridCoord::new(0, 0), GridCoord::new(2, 0), &policy)
            .unwrap();
        let cost: u32 = route[1..]
            .iter()
            .map(|c| policy.cost(grid.lookup(*c).unwrap().kind).unwrap())
            .sum();
        // (0,1)(1,1)(2,1) are free, only the final step onto (2,0) costs
        assert_eq!(cost, 1);
        assert!(route.contains(&GridCoord::new(1, 1)));
    }

    #[test]
    fn test_route_none_when_walled() {
        // Goal surrounded by water (impassable for the walker)
        let mut grid = TileGrid::new();
        for x in 0..5 {
            for y in 0..5 {
                let coord = GridCoord::new(x, y);
                let kind = if coord.distance(&GridCoord::new(4, 4)) == 1 {
                    TileKind::Water
                } else {
                    TileKind::Grass
                };
                grid.register(coord, Tile::new(kind));
            }
        }
        let nav = NavigationService::new(&grid);
        let balancing = walker(100);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);
        assert!(nav
            .route(GridCoord::new(0, 0), GridCoord::new(4, 4), &policy)
            .is_none());
    }

    #[test]
    fn test_route_respects_range_cap() {
        let grid = TileGrid::rectangle(10, 1, TileKind::Grass);
        let nav = NavigationService::new(&grid);
        let balancing = walker(3);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);
        assert!(nav
            .route(GridCoord::new(0, 0), GridCoord::new(9, 0), &policy)
            .is_none());
        assert!(nav
            .route(GridCoord::new(0, 0), GridCoord::new(3, 0), &policy)
            .is_some());
    }

    #[test]
    fn test_reachable_costs_idempotent() {
        let grid = TileGrid::rectangle(4, 4, TileKind::Grass);
        let nav = NavigationService::new(&grid);
        let balancing = walker(3);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);
        let first = nav.reachable_tiles(GridCoord::new(0, 0), &policy);
        let second = nav.reachable_tiles(GridCoord::new(0, 0), &policy);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reachable_excludes_pass_through_only_tiles() {
        // An occupied tile with a passable meta-type can be crossed but not
        // stopped on; tiles beyond it stay reachable
        let mut grid = TileGrid::rectangle(3, 1, TileKind::Grass);
        let blocker = UnitId::new();
        grid.set_occupant(GridCoord::new(1, 0), blocker, MetaType::Air);

        let balancing = Balancing::new(UnitTypeId(1), MetaType::Land)
            .with_movement_range(4)
            .with_tile_cost(TileKind::Grass, 1)
            .with_passable_meta_type(MetaType::Air);
        let nav = NavigationService::new(&grid);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);

        let reachable = nav.reachable_tiles(GridCoord::new(0, 0), &policy);
        assert!(!reachable.contains(&GridCoord::new(1, 0)));
        assert!(reachable.contains(&GridCoord::new(2, 0)));
    }

    #[test]
    fn test_affordable_subroute_truncates_at_allowance() {
        let grid = TileGrid::rectangle(8, 1, TileKind::Grass);
        let nav = NavigationService::new(&grid);
        let balancing = walker(3);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);

        let full: Route = (0..8).map(|x| GridCoord::new(x, 0)).collect();
        let truncated = nav.affordable_subroute(&full, &policy);
        assert_eq!(truncated.last(), Some(&GridCoord::new(3, 0)));
        assert_eq!(truncated.len(), 4);
    }

    #[test]
    fn test_affordable_subroute_trims_occupied_tail() {
        let mut grid = TileGrid::rectangle(8, 1, TileKind::Grass);
        grid.set_occupant(GridCoord::new(3, 0), UnitId::new(), MetaType::Air);
        let nav = NavigationService::new(&grid);

        let balancing = Balancing::new(UnitTypeId(1), MetaType::Land)
            .with_movement_range(3)
            .with_tile_cost(TileKind::Grass, 1)
            .with_passable_meta_type(MetaType::Air);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);

        let full: Route = (0..8).map(|x| GridCoord::new(x, 0)).collect();
        let truncated = nav.affordable_subroute(&full, &policy);
        // (3,0) is crossable but still occupied, so the stop falls back
        assert_eq!(truncated.last(), Some(&GridCoord::new(2, 0)));
    }

    #[test]
    fn test_affordable_subroute_may_be_empty() {
        let mut grid = TileGrid::rectangle(3, 1, TileKind::Grass);
        grid.set_occupant(GridCoord::new(1, 0), UnitId::new(), MetaType::Air);
        let nav = NavigationService::new(&grid);

        let balancing = Balancing::new(UnitTypeId(1), MetaType::Land)
            .with_movement_range(1)
            .with_tile_cost(TileKind::Grass, 1)
            .with_passable_meta_type(MetaType::Air);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);

        let full: Route = vec![GridCoord::new(0, 0), GridCoord::new(1, 0), GridCoord::new(2, 0)];
        assert!(nav.affordable_subroute(&full, &policy).is_empty());
    }

    #[test]
    fn test_route_only_policy_follows_network() {
        let mut grid = TileGrid::new();
        // An L-shaped linked route with open terrain around it
        for x in 0..4 {
            for y in 0..4 {
                let coord = GridCoord::new(x, y);
                let on_network = (y == 0) || (x == 3);
                let tile = if on_network {
                    Tile::new(TileKind::Road).with_linked_route()
                } else {
                    Tile::new(TileKind::Grass)
                };
                grid.register(coord, tile);
            }
        }
        let nav = NavigationService::new(&grid);
        let route = nav
            .route(GridCoord::new(0, 0), GridCoord::new(3, 3), &RouteOnlyPolicy)
            .unwrap();
        // Every step stays on the network
        for coord in &route {
            assert!(grid.lookup(*coord).unwrap().linked_route);
        }
    }

    #[test]
    fn test_observer_sees_expansions() {
        use std::cell::RefCell;

        struct Recorder(RefCell<Vec<GridCoord>>);
        impl SearchObserver for Recorder {
            fn expanded(&self, coord: GridCoord, _cost: u32, _priority: u32) {
                self.0.borrow_mut().push(coord);
            }
        }

        let grid = TileGrid::rectangle(3, 1, TileKind::Grass);
        let recorder = Recorder(RefCell::new(Vec::new()));
        let nav = NavigationService::with_observer(&grid, &recorder);
        let balancing = walker(5);
        let policy = RealMovementPolicy::new(UnitId::new(), &balancing);
        nav.route(GridCoord::new(0, 0), GridCoord::new(2, 0), &policy);

        let seen = recorder.0.borrow();
        assert_eq!(seen.first(), Some(&GridCoord::new(0, 0)));
        assert!(seen.contains(&GridCoord::new(2, 0)));
    }
}
