//! Route-shape classification for presentation
//!
//! A route tile's marker is derived from the direction vectors toward its
//! adjacent route tiles. Headless builds keep the classification (it is
//! covered by correctness tests) but carry no rotation output.

use serde::{Deserialize, Serialize};

use crate::grid::coord::GridCoord;
use crate::nav::service::Route;

/// Marker shape for one tile of a route network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteMarker {
    /// Exactly one adjacent route tile: a route endpoint
    Destination,
    /// Two opposite directions
    Straight,
    /// Two perpendicular directions
    Turn,
    /// Three directions
    TriCorner,
    /// Four directions
    Crossroads,
}

/// Classify a tile from the direction vectors toward its adjacent route
/// tiles; `None` for zero or more than four directions
pub fn classify(directions: &[(i32, i32)]) -> Option<RouteMarker> {
    match directions.len() {
        1 => Some(RouteMarker::Destination),
        2 => {
            if opposite(directions[0], directions[1]) {
                Some(RouteMarker::Straight)
            } else {
                Some(RouteMarker::Turn)
            }
        }
        3 => Some(RouteMarker::TriCorner),
        4 => Some(RouteMarker::Crossroads),
        _ => None,
    }
}

fn opposite(a: (i32, i32), b: (i32, i32)) -> bool {
    a.0 == -b.0 && a.1 == -b.1
}

/// Markers for every tile of a simple route, in route order
///
/// Each tile sees at most two directions (toward its predecessor and
/// successor); routes shorter than two tiles yield no markers.
pub fn route_markers(route: &Route) -> Vec<(GridCoord, RouteMarker)> {
    if route.len() < 2 {
        return Vec::new();
    }
    let mut markers = Vec::with_capacity(route.len());
    for (i, coord) in route.iter().enumerate() {
        let mut directions = Vec::with_capacity(2);
        if i > 0 {
            directions.push(coord.direction_to(&route[i - 1]));
        }
        if i + 1 < route.len() {
            directions.push(coord.direction_to(&route[i + 1]));
        }
        if let Some(marker) = classify(&directions) {
            markers.push((*coord, marker));
        }
    }
    markers
}
