//! The combat state: roster, turn queue, team scales, collaborators.
//!
//! `CombatState` is the only owner of combatants once they are placed.
//! Everything that changes a combatant goes through here: turn
//! bookkeeping in this file, plan resolution in `resolve.rs`.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::providers::{PositionProvider, SpawnProvider};
use super::roster::Roster;
use super::scale::ScalePoints;
use super::turn::TurnQueue;
use crate::abilities::{Ability, AbilityCategory, AbilityContext, AbilityId, AbilityRegistry};
use crate::combatant::{AgingPhase, Buff, CombatantModel, ElementInteractionRule, ElementWheel, ResourceKind};
use crate::core::{CombatConfig, CombatError, CombatantId, ConfigRef, RandomService, Result, TeamId};
use crate::effects::{EffectPlan, ResourceStrategy, StrategyRegistry, TargetFilter};
use crate::events::{CombatEvent, CombatListener, EventBus, ListenerId};

/// A fight in progress.
pub struct CombatState {
    pub(super) config: CombatConfig,
    pub(super) roster: Roster,
    pub(super) turns: TurnQueue,
    pub(super) current: Option<CombatantId>,
    pub(super) scales: FxHashMap<TeamId, ScalePoints>,
    pub(super) abilities: AbilityRegistry,
    pub(super) strategies: StrategyRegistry,
    pub(super) elements: Box<dyn ElementInteractionRule>,
    pub(super) rng: Box<dyn RandomService>,
    pub(super) positions: Box<dyn PositionProvider>,
    pub(super) spawner: Box<dyn SpawnProvider>,
    pub(super) events: EventBus,
    next_id: u32,
}

impl CombatState {
    /// Create an empty fight with the built-in abilities, the element
    /// wheel and the default resource strategies.
    pub fn new(
        config: CombatConfig,
        rng: impl RandomService + 'static,
        positions: impl PositionProvider + 'static,
        spawner: impl SpawnProvider + 'static,
    ) -> Self {
        Self {
            config,
            roster: Roster::new(),
            turns: TurnQueue::new(),
            current: None,
            scales: FxHashMap::default(),
            abilities: AbilityRegistry::with_builtins(),
            strategies: StrategyRegistry::default(),
            elements: Box::new(ElementWheel),
            rng: Box::new(rng),
            positions: Box::new(positions),
            spawner: Box::new(spawner),
            events: EventBus::new(),
            next_id: 1,
        }
    }

    /// Register an extra ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: impl Ability + 'static) -> Self {
        self.abilities.register(ability);
        self
    }

    /// Replace the element interaction rule (builder pattern).
    #[must_use]
    pub fn with_element_rule(mut self, rule: impl ElementInteractionRule + 'static) -> Self {
        self.elements = Box::new(rule);
        self
    }

    /// Install a strategy for one resource kind (builder pattern).
    #[must_use]
    pub fn with_strategy(mut self, kind: ResourceKind, strategy: impl ResourceStrategy + 'static) -> Self {
        self.strategies.register(kind, Box::new(strategy));
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantModel> {
        self.roster.get(id)
    }

    pub fn abilities_mut(&mut self) -> &mut AbilityRegistry {
        &mut self.abilities
    }

    #[must_use]
    pub fn abilities(&self) -> &AbilityRegistry {
        &self.abilities
    }

    #[must_use]
    pub fn scale_points(&self, team: TeamId) -> ScalePoints {
        self.scales.get(&team).copied().unwrap_or_default()
    }

    pub fn subscribe(&mut self, listener: impl CombatListener + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // === Roster ===

    /// Place a combatant. A combatant without a position is given the
    /// next free one for its team (or none if the side is full).
    pub fn add_combatant(&mut self, mut model: CombatantModel) -> Result<CombatantId> {
        if self.roster.contains(model.id()) {
            return Err(CombatError::DuplicateCombatant(model.id()));
        }
        match model.position() {
            Some(position) => {
                if !self.positions.claim_position(position) {
                    tracing::debug!(combatant = %model.id(), ?position, "position already claimed");
                }
            }
            None => model.set_position(self.positions.next_free_position(model.team())),
        }
        self.next_id = self.next_id.max(model.id().raw() + 1);
        self.roster.insert(model)
    }

    /// Spawn a combatant from a configuration onto `team`'s side and queue
    /// it for turns.
    ///
    /// Returns `Ok(None)` when the side has no free position.
    pub fn spawn(&mut self, config_ref: &ConfigRef, team: TeamId) -> Result<Option<CombatantId>> {
        let Some(position) = self.positions.next_free_position(team) else {
            tracing::debug!(%config_ref, %team, "no free position, spawn dropped");
            return Ok(None);
        };
        let id = CombatantId(self.next_id);
        let model = match self.spawner.instantiate_from_config(config_ref, id, team) {
            Ok(model) => model.at(position),
            Err(err) => {
                self.positions.release_position(position);
                return Err(err);
            }
        };
        self.next_id += 1;
        self.roster.insert(model)?;
        if self.turns.push_back(id) {
            self.notify_turn_order();
        }
        tracing::debug!(combatant = %id, %config_ref, %team, "summoned");
        self.emit(CombatEvent::CharacterSummoned {
            combatant: id,
            team,
            position,
        });
        Ok(Some(id))
    }

    #[must_use]
    pub fn alive_combatants(&self, team: TeamId) -> Vec<CombatantId> {
        self.roster.alive_in(team).map(CombatantModel::id).collect()
    }

    #[must_use]
    pub fn defeated_combatants(&self, team: TeamId) -> Vec<CombatantId> {
        self.roster.defeated_in(team).map(CombatantModel::id).collect()
    }

    /// Nobody on `team` is alive.
    #[must_use]
    pub fn is_team_defeated(&self, team: TeamId) -> bool {
        self.roster.alive_in(team).next().is_none()
    }

    // === Turn order ===

    /// Queue a combatant at the back unless it is already queued.
    pub fn add_to_turn_order(&mut self, id: CombatantId) -> Result<bool> {
        self.roster.require(id)?;
        let added = self.turns.push_back(id);
        if added {
            self.notify_turn_order();
        }
        Ok(added)
    }

    /// Make a combatant act next.
    pub fn insert_next(&mut self, id: CombatantId) -> Result<()> {
        self.roster.require(id)?;
        self.turns.push_front(id);
        self.notify_turn_order();
        Ok(())
    }

    #[must_use]
    pub fn turn_order(&self) -> Vec<CombatantId> {
        self.turns.to_vec()
    }

    #[must_use]
    pub fn current_combatant(&self) -> Option<CombatantId> {
        self.current
    }

    /// Move to the next combatant.
    ///
    /// Purges dead entries, ends the current combatant's turn (aging its
    /// turn-end buffs), dequeues the next one and re-queues it at the back,
    /// starts its turn (aging turn-start buffs) and resolves its pre-turn
    /// buff effects. A combatant killed by its own pre-turn effects loses
    /// the turn and the queue moves on, so the returned combatant is
    /// always alive. Returns `None` once nobody is left to act.
    pub fn advance_turn(&mut self) -> Result<Option<CombatantId>> {
        loop {
            let Some(next) = self.start_next_turn()? else {
                return Ok(None);
            };
            if self.roster.require(next)?.is_alive() {
                return Ok(Some(next));
            }
            tracing::debug!(combatant = %next, "died before acting, turn skipped");
        }
    }

    fn start_next_turn(&mut self) -> Result<Option<CombatantId>> {
        let roster = &self.roster;
        let purged = self
            .turns
            .retain(|id| roster.get(id).is_some_and(CombatantModel::is_alive));
        if purged > 0 {
            tracing::debug!(purged, "dead combatants left the turn order");
        }

        if let Some(previous) = self.current.take() {
            if let Some(model) = self.roster.get_mut(previous) {
                model.set_current(false);
                let expired = model.age_buffs_for_phase(AgingPhase::TurnEnd);
                self.notify_expired(previous, &expired);
            }
        }

        let Some(next) = self.turns.pop_front() else {
            self.notify_turn_order();
            return Ok(None);
        };
        self.turns.push_back(next);
        self.current = Some(next);

        let model = self.roster.require_mut(next)?;
        model.set_current(true);
        let expired = model.age_buffs_for_phase(AgingPhase::TurnStart);
        self.notify_expired(next, &expired);
        self.notify_turn_order();
        tracing::debug!(combatant = %next, "turn started");

        self.resolve_pre_turn(next)?;
        Ok(Some(next))
    }

    /// Close a wave: age wave-end buffs and clear per-wave counters.
    pub fn end_wave(&mut self) {
        let mut expired = Vec::new();
        for model in self.roster.iter_mut() {
            let aged = model.age_buffs_for_phase(AgingPhase::WaveEnd);
            expired.push((model.id(), aged));
            model.reset_wave_counters();
        }
        for (id, buffs) in expired {
            self.notify_expired(id, &buffs);
        }
        tracing::debug!("wave ended");
    }

    fn resolve_pre_turn(&mut self, id: CombatantId) -> Result<()> {
        let model = self.roster.require(id)?;
        if model.is_dead() || !model.buffs().iter().any(|b| b.pre_turn_delta().is_some()) {
            return Ok(());
        }
        let plan = self.build_plan(AbilityId::PRE_TURN, id, id, None)?;
        self.resolve_plan(plan)?;
        Ok(())
    }

    // === Abilities ===

    /// Build the plan for a registered ability and resolve it.
    pub fn execute_selected_ability(
        &mut self,
        ability: AbilityId,
        caster: CombatantId,
        target: CombatantId,
    ) -> Result<EffectPlan> {
        tracing::debug!(%ability, %caster, victim = %target, "executing ability");
        let plan = self.build_plan(ability, caster, target, None)?;
        self.resolve_plan(plan)
    }

    /// Build the plan for an unregistered ability and resolve it.
    pub fn execute_ability(
        &mut self,
        ability: &dyn Ability,
        caster: CombatantId,
        target: CombatantId,
    ) -> Result<EffectPlan> {
        tracing::debug!(ability = %ability.id(), %caster, victim = %target, "executing ability");
        let plan = self.produce_plan(Some(ability), ability.id(), caster, target, None)?;
        self.resolve_plan(plan)
    }

    /// Ability categories the current combatant may use now.
    #[must_use]
    pub fn available_ability_categories_for_current(&self) -> SmallVec<[AbilityCategory; 3]> {
        let Some(model) = self.current.and_then(|id| self.roster.get(id)) else {
            return SmallVec::new();
        };
        let scale = self.scale_points(model.team());
        model.available_ability_categories(scale.light, scale.shadow, self.config.ultimate_scale_requirement)
    }

    /// Combatants `caster` may target with `ability`.
    pub fn eligible_targets(&self, ability: AbilityId, caster: CombatantId) -> Result<Vec<CombatantId>> {
        let scope = self
            .abilities
            .get(ability)
            .ok_or(CombatError::UnknownAbility(ability))?
            .target_scope();
        let reference = self.roster.require(caster)?;
        Ok(TargetFilter::filter_by_scope(self.roster.as_slice(), reference, scope))
    }

    /// Targets for `ability` used by the current combatant (empty when no
    /// turn is running).
    pub fn eligible_targets_for_selected_ability(&self, ability: AbilityId) -> Result<Vec<CombatantId>> {
        match self.current {
            Some(caster) => self.eligible_targets(ability, caster),
            None => Ok(Vec::new()),
        }
    }

    pub(super) fn build_plan(
        &mut self,
        ability: AbilityId,
        caster: CombatantId,
        target: CombatantId,
        trigger: Option<&Buff>,
    ) -> Result<EffectPlan> {
        self.produce_plan(None, ability, caster, target, trigger)
    }

    /// Run an ability against the current roster. `ability` overrides the
    /// registry lookup of `id`.
    fn produce_plan(
        &mut self,
        ability: Option<&dyn Ability>,
        id: AbilityId,
        caster: CombatantId,
        target: CombatantId,
        trigger: Option<&Buff>,
    ) -> Result<EffectPlan> {
        let Self {
            abilities,
            roster,
            rng,
            positions,
            config,
            ..
        } = self;
        let ability = match ability {
            Some(ability) => ability,
            None => abilities.get(id).ok_or(CombatError::UnknownAbility(id))?,
        };
        let caster = roster.require(caster)?;
        let target = roster.require(target)?;
        let mut ctx = AbilityContext::new(caster, target, roster.as_slice(), &mut **rng, &**positions, config)
            .with_trigger(trigger);
        Ok(ability.produce_effect_plan(&mut ctx))
    }

    // === Notifications ===

    pub(super) fn emit(&mut self, event: CombatEvent) {
        self.events.emit(&event);
    }

    pub(super) fn notify_turn_order(&mut self) {
        let event = CombatEvent::TurnOrderChanged {
            current: self.current,
            order: self.turns.to_vec(),
        };
        self.emit(event);
    }

    fn notify_expired(&mut self, target: CombatantId, expired: &[Buff]) {
        for buff in expired {
            tracing::debug!(combatant = %target, kind = ?buff.kind, "buff expired");
            self.emit(CombatEvent::BuffExpired {
                target,
                kind: buff.kind,
            });
        }
    }
}

impl std::fmt::Debug for CombatState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatState")
            .field("roster", &self.roster.len())
            .field("turn_order", &self.turns.to_vec())
            .field("current", &self.current)
            .field("scales", &self.scales)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
