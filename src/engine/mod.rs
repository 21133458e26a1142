//! Battle engine: battlefield state, turn decisions, events, presentation

pub mod battlefield;
pub mod events;
pub mod presenter;
pub mod turn;

pub use battlefield::{AttackOutcome, Battlefield};
pub use events::{TurnEvent, TurnEventKind, TurnEventLog};
pub use presenter::{
    DeferredPresenter, HeadlessPresenter, MovementPresenter, PresentationOutcome,
};
pub use turn::{EngineStatus, TurnDecisionEngine};
