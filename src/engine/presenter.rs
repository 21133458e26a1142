//! Movement presentation seam
//!
//! A committed route may take wall-clock time to show (walk animation,
//! camera pan). The presenter reports whether the traversal finished
//! synchronously or the engine must park the unit until
//! `movement_finished` is called.

use crate::core::types::UnitId;
use crate::nav::service::Route;

/// Did the presenter finish the traversal before returning?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationOutcome {
    Completed,
    Deferred,
}

pub trait MovementPresenter {
    fn present(&mut self, unit: UnitId, route: &Route) -> PresentationOutcome;
}

/// Instant traversal, for simulations and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPresenter;

impl MovementPresenter for HeadlessPresenter {
    fn present(&mut self, _unit: UnitId, _route: &Route) -> PresentationOutcome {
        PresentationOutcome::Completed
    }
}

/// Always defers; the caller drains `take_pending` and signals completion
#[derive(Debug, Clone, Default)]
pub struct DeferredPresenter {
    pending: Option<(UnitId, Route)>,
}

impl DeferredPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_pending(&mut self) -> Option<(UnitId, Route)> {
        self.pending.take()
    }
}

impl MovementPresenter for DeferredPresenter {
    fn present(&mut self, unit: UnitId, route: &Route) -> PresentationOutcome {
        self.pending = Some((unit, route.clone()));
        PresentationOutcome::Deferred
    }
}
