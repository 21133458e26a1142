//! Skirmish - Grid Tactics Pathfinding and Turn Engine

pub mod core;
pub mod engine;
pub mod grid;
pub mod nav;
pub mod units;
