//! Abilities: pure producers of effect plans.
//!
//! An [`Ability`] reads an [`AbilityContext`] (caster, target, roster,
//! random source) and returns an [`EffectPlan`]. It never mutates the
//! combat state; the plan is handed to the resolver.
//!
//! Reactions (retaliation, death triggers, passives, pre-turn ticks) are
//! abilities too. They are registered under reserved ids and flagged as
//! not player-selectable.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_combat::abilities::{AbilityContext, AbilityId, AbilityRegistry};
//! use rust_combat::combat::SlotGrid;
//! use rust_combat::combatant::{CombatantConfig, CombatantModel, Element};
//! use rust_combat::core::{CombatConfig, CombatantId, FixedRandom, TeamId};
//!
//! let registry = AbilityRegistry::with_builtins();
//! let hero = CombatantModel::new(
//!     CombatantId(1),
//!     TeamId::PLAYER,
//!     Arc::new(CombatantConfig::new("hero", 30).with_attack(6, Element::Fire)),
//! );
//! let slime = CombatantModel::new(CombatantId(2), TeamId::ENEMY, Arc::new(CombatantConfig::new("slime", 10)));
//! let roster = vec![hero.clone(), slime.clone()];
//! let mut rng = FixedRandom::always();
//! let grid = SlotGrid::new(4);
//! let config = CombatConfig::default();
//!
//! let mut ctx = AbilityContext::new(&hero, &slime, &roster, &mut rng, &grid, &config);
//! let plan = registry.get(AbilityId::BASIC_ATTACK).unwrap().produce_effect_plan(&mut ctx);
//! assert_eq!(plan.damage_orders()[0].amount, 6);
//! ```

mod builtin;
mod reactions;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::PositionProvider;
use crate::combatant::{Buff, CombatantModel};
use crate::core::{CombatConfig, RandomService};
use crate::effects::{EffectPlan, EffectRef, TargetScope};

pub use builtin::{AreaAttack, ApplyBuff, BasicAttack, Cleanse, Dispel, Heal, ReviveAlly, ScaleShift, Summon};
pub use reactions::{DeathExplosion, DeathRevive, PassiveRevive, PreTurnTick, Retaliation, TeamRetaliation};

/// Ability identifier.
///
/// Ids below [`AbilityId::FIRST_CUSTOM`] are reserved for built-ins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    // === Selectable built-ins ===
    pub const BASIC_ATTACK: AbilityId = AbilityId(1);

    // === Reactions ===
    pub const RETALIATION: AbilityId = AbilityId(100);
    pub const TEAM_RETALIATION: AbilityId = AbilityId(101);
    pub const DEATH_EXPLOSION: AbilityId = AbilityId(102);
    pub const DEATH_REVIVE: AbilityId = AbilityId(103);
    pub const PASSIVE_REVIVE: AbilityId = AbilityId(104);
    pub const PRE_TURN: AbilityId = AbilityId(105);

    /// First id free for game-defined abilities.
    pub const FIRST_CUSTOM: AbilityId = AbilityId(1000);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}

/// Ability tier. Availability depends on incapacitation, unlocks and the
/// team's scale counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityCategory {
    Basic,
    Special,
    Ultimate,
}

/// Everything an ability may read while building its plan.
pub struct AbilityContext<'a> {
    pub caster: &'a CombatantModel,
    pub target: &'a CombatantModel,
    pub roster: &'a [CombatantModel],
    pub rng: &'a mut dyn RandomService,
    pub positions: &'a dyn PositionProvider,
    pub config: &'a CombatConfig,
    /// Buff that triggered a reaction (already removed from its bearer).
    pub trigger: Option<&'a Buff>,
}

impl<'a> AbilityContext<'a> {
    pub fn new(
        caster: &'a CombatantModel,
        target: &'a CombatantModel,
        roster: &'a [CombatantModel],
        rng: &'a mut dyn RandomService,
        positions: &'a dyn PositionProvider,
        config: &'a CombatConfig,
    ) -> Self {
        Self {
            caster,
            target,
            roster,
            rng,
            positions,
            config,
            trigger: None,
        }
    }

    /// Attach the triggering buff (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, trigger: Option<&'a Buff>) -> Self {
        self.trigger = trigger;
        self
    }

    /// Empty plan from caster to target, tagged with `ability`.
    #[must_use]
    pub fn plan_for(&self, ability: &dyn Ability) -> EffectPlan {
        let effect = if ability.is_player_selectable() {
            EffectRef::selected(ability.id())
        } else {
            EffectRef::reaction(ability.id())
        };
        EffectPlan::new(self.caster.id(), self.target.id(), effect)
    }

    /// Roll the caster's attack: `None` on a miss, otherwise the damage
    /// after a possible crit.
    ///
    /// Chance rolls are skipped at 100% accuracy and 0% crit chance so
    /// they don't consume randomness.
    pub fn roll_attack(&mut self) -> Option<i64> {
        let attack = self.caster.config().attack;
        if attack.accuracy < 100 && !self.rng.percent_chance(attack.accuracy) {
            return None;
        }
        let base = self.rng.int_range(attack.min_damage, attack.max_damage);
        if attack.crit_chance > 0 && self.rng.percent_chance(attack.crit_chance) {
            return Some(base * i64::from(attack.crit_multiplier_percent) / 100);
        }
        Some(base)
    }
}

/// A selectable or reactive ability.
pub trait Ability {
    fn id(&self) -> AbilityId;

    fn name(&self) -> &str;

    fn category(&self) -> AbilityCategory {
        AbilityCategory::Basic
    }

    fn target_scope(&self) -> TargetScope;

    fn is_player_selectable(&self) -> bool {
        true
    }

    /// Build the plan. Must not fail: a miss or an invalid situation
    /// yields a plan with no orders.
    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan;
}

/// Abilities by id.
#[derive(Default)]
pub struct AbilityRegistry {
    abilities: FxHashMap<AbilityId, Box<dyn Ability>>,
}

impl AbilityRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Basic attack plus every reaction the resolver schedules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(BasicAttack);
        registry.register(Retaliation);
        registry.register(TeamRetaliation);
        registry.register(DeathExplosion);
        registry.register(DeathRevive);
        registry.register(PassiveRevive);
        registry.register(PreTurnTick);
        registry
    }

    /// Register an ability, replacing any previous one with the same id.
    pub fn register(&mut self, ability: impl Ability + 'static) {
        self.abilities.insert(ability.id(), Box::new(ability));
    }

    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&dyn Ability> {
        self.abilities.get(&id).map(|a| a.as_ref())
    }

    #[must_use]
    pub fn contains(&self, id: AbilityId) -> bool {
        self.abilities.contains_key(&id)
    }

    /// Selectable abilities of `category`, sorted by id.
    #[must_use]
    pub fn selectable_in(&self, category: AbilityCategory) -> Vec<AbilityId> {
        let mut ids: Vec<_> = self
            .abilities
            .values()
            .filter(|a| a.is_player_selectable() && a.category() == category)
            .map(|a| a.id())
            .collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.abilities.keys().collect();
        ids.sort();
        f.debug_struct("AbilityRegistry").field("abilities", &ids).finish()
    }
}
