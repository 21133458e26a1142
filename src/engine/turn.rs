//! Opponent turn decisions: target selection, movement planning, attacks
//!
//! One call to `start_turn` drives every unit of the acting side through
//! select-target, plan-movement and attack, synchronously, unless a
//! presenter defers a traversal or the caller pauses. Ordering guarantees:
//! units resolve strictly one after another, and a unit's movement always
//! completes before its attack resolves.
//!
//! All tie-breaks draw from a seeded RNG; two engines built with the same
//! seed over the same battlefield produce identical decision sequences.

use std::cmp::Reverse;
use std::collections::VecDeque;

use ahash::AHashSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::core::error::{EngineError, Result};
use crate::core::types::{Side, Turn, UnitId};
use crate::engine::battlefield::Battlefield;
use crate::engine::events::{TurnEventKind, TurnEventLog};
use crate::engine::presenter::{MovementPresenter, PresentationOutcome};
use crate::grid::coord::GridCoord;
use crate::grid::map::TileProvider;
use crate::nav::policy::{LookaheadPolicy, MovementPolicy, RealMovementPolicy};
use crate::nav::service::{NavigationService, NoopObserver, Route, SearchObserver};

const DEFAULT_SEED: u64 = 42;

/// Engine state as observable between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// No turn in progress
    Idle,
    /// A traversal was deferred; waiting for `movement_finished`
    AwaitingMovement,
    /// Mid-turn with processing suspended by `pause`
    Paused,
}

/// What a unit does after any committed movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    /// Attack the planned target
    Engage,
    /// Partial advance toward an unreachable attack position, no attack
    Advance,
    /// Idle movement; attack whatever ranks best in range afterward
    Idle,
}

/// A unit's fully planned action, held across a presenter deferral
#[derive(Debug, Clone)]
struct PendingAction {
    unit: UnitId,
    route: Route,
    kind: ActionKind,
    target: Option<UnitId>,
}

struct TurnState {
    side: Side,
    queue: VecDeque<UnitId>,
    /// Living enemies at turn start, pruned as kills land within the turn
    enemies: Vec<UnitId>,
    pending: Option<PendingAction>,
}

/// Turn-driving decision engine over a battlefield
pub struct TurnDecisionEngine<P: MovementPresenter> {
    field: Battlefield,
    presenter: P,
    observer: Box<dyn SearchObserver>,
    rng: StdRng,
    turn: Turn,
    paused: bool,
    battle_ended: bool,
    log: TurnEventLog,
    state: Option<TurnState>,
}

impl<P: MovementPresenter> TurnDecisionEngine<P> {
    pub fn new(field: Battlefield, presenter: P) -> Self {
        Self::with_seed(field, presenter, DEFAULT_SEED)
    }

    pub fn with_seed(field: Battlefield, presenter: P, seed: u64) -> Self {
        Self {
            field,
            presenter,
            observer: Box::new(NoopObserver),
            rng: StdRng::seed_from_u64(seed),
            turn: 0,
            paused: false,
            battle_ended: false,
            log: TurnEventLog::new(),
            state: None,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn SearchObserver>) {
        self.observer = observer;
    }

    pub fn field(&self) -> &Battlefield {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Battlefield {
        &mut self.field
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn log(&self) -> &TurnEventLog {
        &self.log
    }

    pub fn current_turn(&self) -> Turn {
        self.turn
    }

    pub fn status(&self) -> EngineStatus {
        match &self.state {
            Some(state) if state.pending.is_some() => EngineStatus::AwaitingMovement,
            Some(_) => EngineStatus::Paused,
            None => EngineStatus::Idle,
        }
    }

    /// Route between two coordinates under an arbitrary policy
    pub fn route(
        &self,
        start: GridCoord,
        goal: GridCoord,
        policy: &dyn MovementPolicy,
    ) -> Option<Route> {
        NavigationService::with_observer(&self.field.grid, self.observer.as_ref())
            .route(start, goal, policy)
    }

    /// Registered tiles within Manhattan `radius` of `source`
    pub fn tiles_in_range(
        &self,
        source: GridCoord,
        radius: u32,
        include_source: bool,
    ) -> AHashSet<GridCoord> {
        NavigationService::with_observer(&self.field.grid, self.observer.as_ref())
            .tiles_in_range(source, radius, include_source)
    }

    /// Tiles a unit can end this turn on under the given policy
    pub fn reachable_tiles(
        &self,
        unit: UnitId,
        policy: &dyn MovementPolicy,
    ) -> Result<AHashSet<GridCoord>> {
        let position = self.field.unit(unit)?.position;
        Ok(
            NavigationService::with_observer(&self.field.grid, self.observer.as_ref())
                .reachable_tiles(position, policy),
        )
    }

    /// Begin a full turn for `side` and drive it as far as possible
    ///
    /// Units act in ascending order of distance to the nearest enemy, ties
    /// broken by the seeded RNG. Returns once the turn completes, a
    /// presenter defers, or processing is paused.
    pub fn start_turn(&mut self, side: Side) -> Result<()> {
        if self.battle_ended {
            return Err(EngineError::BattleEnded);
        }
        if self.state.is_some() {
            return Err(EngineError::TurnInProgress);
        }
        self.field.validate_balancing()?;
        self.turn += 1;

        let mut friendly = self.field.living_units_of(side);
        let mut enemies = self.field.living_units_of(side.enemy());
        // Position is unique per living unit, so sorting by it pins down a
        // deterministic base order before RNG keys are assigned
        friendly.sort_by_key(|&id| self.position_key(id));
        enemies.sort_by_key(|&id| self.position_key(id));

        let mut keyed: Vec<(u32, u32, UnitId)> = Vec::with_capacity(friendly.len());
        for id in friendly {
            let position = self.field.unit(id)?.position;
            let closest = enemies
                .iter()
                .filter_map(|&e| self.field.roster.get(e))
                .map(|e| position.distance(&e.position))
                .min()
                .unwrap_or(u32::MAX);
            keyed.push((closest, self.rng.gen(), id));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        info!(turn = self.turn, ?side, units = keyed.len(), "turn started");
        self.log.push(
            self.turn,
            TurnEventKind::TurnStarted { side },
            format!("turn {} begins", self.turn),
        );
        self.state = Some(TurnState {
            side,
            queue: keyed.into_iter().map(|(_, _, id)| id).collect(),
            enemies,
            pending: None,
        });
        self.run();
        Ok(())
    }

    /// Close the current turn, resetting acted flags for the side
    pub fn end_turn(&mut self) -> Result<()> {
        if self.state.is_none() {
            return Err(EngineError::NoTurnInProgress);
        }
        self.finish_turn();
        Ok(())
    }

    /// A deferred traversal has finished; apply the move, resolve the
    /// unit's attack, and continue the turn
    pub fn movement_finished(&mut self) -> Result<()> {
        let action = self
            .state
            .as_mut()
            .and_then(|state| state.pending.take())
            .ok_or(EngineError::NotAwaitingMovement)?;
        self.apply_route(action.unit, &action.route)?;
        self.resolve_action(&action)?;
        self.mark_acted(action.unit);
        self.run();
        Ok(())
    }

    /// Suspend turn progression after the unit currently resolving
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.run();
        }
    }

    /// The battle is over; abort all remaining per-unit processing
    pub fn signal_battle_ended(&mut self) {
        if self.battle_ended {
            return;
        }
        self.battle_ended = true;
        if self.state.take().is_some() {
            info!(turn = self.turn, "battle ended mid-turn, remaining units skipped");
        }
        self.log
            .push(self.turn, TurnEventKind::BattleEnded, "battle ended");
    }

    fn position_key(&self, id: UnitId) -> (i32, i32) {
        self.field
            .unit(id)
            .map_or((i32::MAX, i32::MAX), |u| (u.position.x, u.position.y))
    }

    /// Drive the queue until it empties, a presenter defers, or paused
    fn run(&mut self) {
        loop {
            if self.paused || self.battle_ended {
                return;
            }
            let next = {
                let Some(state) = self.state.as_mut() else {
                    return;
                };
                if state.pending.is_some() {
                    return;
                }
                loop {
                    match state.queue.pop_front() {
                        None => break None,
                        Some(id) => {
                            if self.field.roster.get(id).is_some_and(|u| u.is_alive()) {
                                break Some(id);
                            }
                        }
                    }
                }
            };
            let Some(unit_id) = next else {
                self.finish_turn();
                return;
            };
            match self.process_unit(unit_id) {
                Ok(true) => return,
                Ok(false) => {}
                Err(err) => {
                    warn!(%err, "unit processing failed, skipping unit");
                }
            }
        }
    }

    /// Plan and execute one unit's action; `Ok(true)` means the presenter
    /// deferred and the engine is now awaiting movement completion
    fn process_unit(&mut self, unit_id: UnitId) -> Result<bool> {
        let action = self.plan_unit(unit_id)?;

        if let Some(target) = action.target {
            debug!(?unit_id, ?target, "target selected");
            self.log.push(
                self.turn,
                TurnEventKind::TargetSelected {
                    unit: unit_id,
                    target,
                },
                "target selected",
            );
        }

        if action.route.len() >= 2 {
            let destination = action.route[action.route.len() - 1];
            let kind = match action.kind {
                ActionKind::Engage => TurnEventKind::MovementCommitted {
                    unit: unit_id,
                    destination,
                    steps: action.route.len() - 1,
                },
                ActionKind::Advance => TurnEventKind::PartialAdvance {
                    unit: unit_id,
                    destination,
                },
                ActionKind::Idle => TurnEventKind::IdleMove {
                    unit: unit_id,
                    destination,
                },
            };
            self.log.push(
                self.turn,
                kind,
                format!("move to ({}, {})", destination.x, destination.y),
            );
            if self.presenter.present(unit_id, &action.route) == PresentationOutcome::Deferred {
                debug!(?unit_id, "traversal deferred, awaiting completion");
                if let Some(state) = self.state.as_mut() {
                    state.pending = Some(action);
                }
                return Ok(true);
            }
            self.apply_route(unit_id, &action.route)?;
        }

        self.resolve_action(&action)?;
        self.mark_acted(unit_id);
        Ok(false)
    }

    /// Full planning for one unit: target selection, then movement
    fn plan_unit(&mut self, unit_id: UnitId) -> Result<PendingAction> {
        let enemies = self
            .state
            .as_ref()
            .map(|state| state.enemies.clone())
            .unwrap_or_default();
        let Some(target_id) = self.select_target(unit_id, &enemies, false)? else {
            return self.plan_idle(unit_id, None);
        };

        let target_pos = self.field.unit(target_id)?.position;
        let mover_pos = self.field.unit(unit_id)?.position;
        let balancing = self.field.balancing_of(unit_id)?;
        let real = RealMovementPolicy::new(unit_id, balancing);
        let nav = NavigationService::with_observer(&self.field.grid, self.observer.as_ref());

        // Attack positions: tiles within attack range of the target that
        // the mover could legally end a turn on, plus its own tile
        let mut candidates: Vec<GridCoord> = nav
            .tiles_in_range(target_pos, balancing.attack_range, false)
            .into_iter()
            .filter(|&coord| {
                coord == mover_pos
                    || self.field.grid.lookup(coord).is_some_and(|tile| {
                        real.cost(tile.kind).is_some() && real.can_occupy(coord, tile, 0, false)
                    })
            })
            .collect();
        // Farthest from the target first (keep distance), then closest to
        // the mover (cheapest approach); coordinate order pins full ties
        candidates.sort_by_key(|&c| (Reverse(target_pos.distance(&c)), mover_pos.distance(&c), c));

        if candidates.is_empty() {
            return self.plan_idle(unit_id, Some(target_id));
        }

        if candidates[0] == mover_pos {
            return Ok(PendingAction {
                unit: unit_id,
                route: Vec::new(),
                kind: ActionKind::Engage,
                target: Some(target_id),
            });
        }

        for &candidate in &candidates {
            if let Some(route) = nav.route(mover_pos, candidate, &real) {
                return Ok(PendingAction {
                    unit: unit_id,
                    route,
                    kind: ActionKind::Engage,
                    target: Some(target_id),
                });
            }
        }

        // No attack position is reachable this turn; plan the multi-turn
        // route to the best one and walk the affordable prefix
        let lookahead = LookaheadPolicy::new(unit_id, balancing, candidates[0]);
        if let Some(full) = nav.route(mover_pos, candidates[0], &lookahead) {
            let partial = nav.affordable_subroute(&full, &real);
            if partial.len() >= 2 {
                return Ok(PendingAction {
                    unit: unit_id,
                    route: partial,
                    kind: ActionKind::Advance,
                    target: Some(target_id),
                });
            }
        }

        // Boxed in entirely: hold position
        Ok(PendingAction {
            unit: unit_id,
            route: Vec::new(),
            kind: ActionKind::Engage,
            target: Some(target_id),
        })
    }

    /// No viable attack plan: move to the reachable tile with the highest
    /// route cost from here, ties broken by the seeded RNG
    fn plan_idle(&mut self, unit_id: UnitId, target: Option<UnitId>) -> Result<PendingAction> {
        let mover_pos = self.field.unit(unit_id)?.position;
        let balancing = self.field.balancing_of(unit_id)?;
        let real = RealMovementPolicy::new(unit_id, balancing);
        let nav = NavigationService::with_observer(&self.field.grid, self.observer.as_ref());

        let mut costs: Vec<(GridCoord, u32)> = nav
            .reachable_costs(mover_pos, &real)
            .into_iter()
            .filter(|&(coord, _)| coord != mover_pos)
            .collect();
        costs.sort_by_key(|&(coord, _)| coord);

        let route = match costs.iter().map(|&(_, cost)| cost).max() {
            None => Vec::new(),
            Some(max_cost) => {
                let ties: Vec<GridCoord> = costs
                    .iter()
                    .filter(|&&(_, cost)| cost == max_cost)
                    .map(|&(coord, _)| coord)
                    .collect();
                let pick = ties[self.rng.gen_range(0..ties.len())];
                nav.route(mover_pos, pick, &real).unwrap_or_default()
            }
        };
        Ok(PendingAction {
            unit: unit_id,
            route,
            kind: ActionKind::Idle,
            target,
        })
    }

    /// Rank enemies for `unit_id`: zero-damage matchups are never targets,
    /// anything in range ranks at distance zero, closer beats farther, and
    /// among equals higher damage wins
    fn select_target(
        &self,
        unit_id: UnitId,
        enemies: &[UnitId],
        only_in_range: bool,
    ) -> Result<Option<UnitId>> {
        let unit = self.field.unit(unit_id)?;
        let balancing = self.field.balancing_of(unit_id)?;

        let mut best: Option<(u32, u32, UnitId)> = None;
        for &enemy_id in enemies {
            let Some(enemy) = self.field.roster.get(enemy_id) else {
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            let damage = balancing.damage_against(enemy.unit_type);
            if damage == 0 {
                continue;
            }
            let distance = unit.position.distance(&enemy.position);
            let in_range = distance <= balancing.attack_range;
            if only_in_range && !in_range {
                continue;
            }
            let effective = if in_range { 0 } else { distance };
            let replace = match best {
                None => true,
                Some((best_dist, best_damage, _)) => {
                    effective < best_dist || (effective == best_dist && damage > best_damage)
                }
            };
            if replace {
                best = Some((effective, damage, enemy_id));
            }
        }
        Ok(best.map(|(_, _, id)| id))
    }

    /// Resolve the attack half of an action after movement has applied
    fn resolve_action(&mut self, action: &PendingAction) -> Result<()> {
        let chosen = match action.kind {
            ActionKind::Advance => None,
            ActionKind::Engage => match action.target {
                // The target must still be alive and in range when the
                // attack actually resolves
                Some(target_id)
                    if self
                        .field
                        .roster
                        .get(target_id)
                        .is_some_and(|t| t.is_alive())
                        && self.field.in_attack_range(action.unit, target_id)? =>
                {
                    Some(target_id)
                }
                _ => None,
            },
            ActionKind::Idle => {
                let enemies = self
                    .state
                    .as_ref()
                    .map(|state| state.enemies.clone())
                    .unwrap_or_default();
                self.select_target(action.unit, &enemies, true)?
            }
        };

        let Some(target_id) = chosen else {
            return Ok(());
        };
        let outcome = self.field.apply_attack(action.unit, target_id)?;
        debug!(
            attacker = ?action.unit,
            target = ?target_id,
            damage = outcome.damage,
            killed = outcome.killed,
            "attack resolved"
        );
        self.log.push(
            self.turn,
            TurnEventKind::AttackResolved {
                attacker: action.unit,
                target: target_id,
                damage: outcome.damage,
            },
            format!("hit for {}", outcome.damage),
        );
        if outcome.killed {
            self.log.push(
                self.turn,
                TurnEventKind::UnitDestroyed { unit: target_id },
                "unit destroyed",
            );
            // Same-tick removal: later units this turn must not target it
            if let Some(state) = self.state.as_mut() {
                state.enemies.retain(|&e| e != target_id);
            }
        }
        Ok(())
    }

    fn apply_route(&mut self, unit: UnitId, route: &Route) -> Result<()> {
        if let Some(&destination) = route.last() {
            self.field.move_unit(unit, destination)?;
        }
        Ok(())
    }

    fn mark_acted(&mut self, unit: UnitId) {
        if let Some(unit) = self.field.roster.get_mut(unit) {
            unit.acted = true;
        }
    }

    fn finish_turn(&mut self) {
        if let Some(state) = self.state.take() {
            self.field.roster.reset_acted(state.side);
            debug!(turn = self.turn, side = ?state.side, "turn complete");
            self.log.push(
                self.turn,
                TurnEventKind::TurnEnded { side: state.side },
                format!("turn {} over", self.turn),
            );
        }
    }
}
