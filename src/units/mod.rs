//! Units, balancing data, and the roster directory

pub mod balancing;
pub mod roster;
pub mod unit;

pub use balancing::{Balancing, BalancingStore};
pub use roster::{UnitDirectory, UnitRoster};
pub use unit::Unit;
