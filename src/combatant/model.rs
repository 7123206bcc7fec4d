//! Runtime combatant model.
//!
//! A `CombatantModel` is created from a shared `CombatantConfig` and then
//! owned by the roster. External code reads it freely but mutates it only
//! through the resolver and `CombatState`; the `pub(crate)` mutators below
//! are the complete list of ways its resources and buffs change.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::buff::{AgingPhase, Buff, BuffKind, Incapacitation};
use super::element::Element;
use super::resource::{PoolConfig, ResourceKind, ResourcePool};
use crate::abilities::AbilityCategory;
use crate::core::{ClassTag, CombatantId, ConfigRef, PositionToken, TeamId};

/// Attack numbers read by abilities when rolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackStats {
    pub min_damage: i64,
    pub max_damage: i64,
    /// Hit chance in percent.
    pub accuracy: u32,
    /// Crit chance in percent.
    pub crit_chance: u32,
    /// Crit damage in percent of a normal hit.
    pub crit_multiplier_percent: u32,
    pub element: Element,
}

impl Default for AttackStats {
    fn default() -> Self {
        Self {
            min_damage: 1,
            max_damage: 1,
            accuracy: 100,
            crit_chance: 0,
            crit_multiplier_percent: 150,
            element: Element::Neutral,
        }
    }
}

/// Once-per-wave team abilities a combatant may have unlocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Passive {
    /// Revive one fallen ally per wave at `health_percent`.
    ReviveAlly { health_percent: u32 },
}

/// Archetype data shared by every combatant spawned from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantConfig {
    pub config_ref: ConfigRef,
    pub name: String,
    #[serde(default)]
    pub class_tag: ClassTag,
    #[serde(default)]
    pub element: Element,
    /// Base mitigation in percent.
    #[serde(default)]
    pub mitigation_percent: u32,
    pub max_health: i64,
    /// Secondary pool capacity. Zero disables the stagger mechanic.
    #[serde(default)]
    pub max_stagger: i64,
    #[serde(default)]
    pub extra_pools: Vec<PoolConfig>,
    #[serde(default)]
    pub attack: AttackStats,
    #[serde(default)]
    pub unlocks_special: bool,
    #[serde(default)]
    pub unlocks_ultimate: bool,
    #[serde(default)]
    pub passives: Vec<Passive>,
}

impl CombatantConfig {
    /// Create a config with the given health and neutral defaults.
    pub fn new(config_ref: impl Into<String>, max_health: i64) -> Self {
        let config_ref = ConfigRef::new(config_ref);
        Self {
            name: config_ref.as_str().to_string(),
            config_ref,
            class_tag: ClassTag::default(),
            element: Element::Neutral,
            mitigation_percent: 0,
            max_health,
            max_stagger: 0,
            extra_pools: Vec::new(),
            attack: AttackStats::default(),
            unlocks_special: false,
            unlocks_ultimate: false,
            passives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_class(mut self, class_tag: ClassTag) -> Self {
        self.class_tag = class_tag;
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub fn with_mitigation(mut self, percent: u32) -> Self {
        self.mitigation_percent = percent;
        self
    }

    #[must_use]
    pub fn with_stagger(mut self, max: i64) -> Self {
        self.max_stagger = max;
        self
    }

    #[must_use]
    pub fn with_pool(mut self, kind: ResourceKind, max: i64) -> Self {
        self.extra_pools.push(PoolConfig { kind, max, start: None });
        self
    }

    /// Fixed damage attack (min = max) with the given element.
    #[must_use]
    pub fn with_attack(mut self, damage: i64, element: Element) -> Self {
        self.attack.min_damage = damage;
        self.attack.max_damage = damage;
        self.attack.element = element;
        self
    }

    #[must_use]
    pub fn with_attack_stats(mut self, attack: AttackStats) -> Self {
        self.attack = attack;
        self
    }

    #[must_use]
    pub fn with_special(mut self) -> Self {
        self.unlocks_special = true;
        self
    }

    #[must_use]
    pub fn with_ultimate(mut self) -> Self {
        self.unlocks_ultimate = true;
        self
    }

    #[must_use]
    pub fn with_passive(mut self, passive: Passive) -> Self {
        self.passives.push(passive);
        self
    }
}

/// Identifier of a per-wave mechanic counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MechanicKey(pub &'static str);

impl MechanicKey {
    /// Times the `ReviveAlly` passive fired this wave.
    pub const PASSIVE_REVIVE: MechanicKey = MechanicKey("passive_revive");
}

/// Outcome of `take_damage`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage soaked by shield charges.
    pub absorbed: i64,
    /// Change applied to the health pool (negative = lost).
    pub applied: i64,
    /// The shield ran out of charges and was removed.
    pub shield_broken: bool,
    /// Health went from above zero to zero on this call.
    pub died: bool,
}

/// A combatant at runtime.
#[derive(Clone, Debug)]
pub struct CombatantModel {
    id: CombatantId,
    team: TeamId,
    config: Arc<CombatantConfig>,
    resources: FxHashMap<ResourceKind, ResourcePool>,
    buffs: SmallVec<[Buff; 4]>,
    dead: bool,
    current: bool,
    wave_counters: FxHashMap<MechanicKey, i64>,
    position: Option<PositionToken>,
}

impl CombatantModel {
    /// Build a fresh combatant with full pools.
    pub fn new(id: CombatantId, team: TeamId, config: Arc<CombatantConfig>) -> Self {
        let mut resources = FxHashMap::default();
        resources.insert(ResourceKind::Health, ResourcePool::full(config.max_health));
        resources.insert(ResourceKind::Stagger, ResourcePool::full(config.max_stagger));
        for pool in &config.extra_pools {
            let start = pool.start.unwrap_or(pool.max);
            resources.insert(pool.kind, ResourcePool::with_bounds(0, pool.max, start));
        }

        Self {
            id,
            team,
            config,
            resources,
            buffs: SmallVec::new(),
            dead: false,
            current: false,
            wave_counters: FxHashMap::default(),
            position: None,
        }
    }

    /// Set the starting position (builder pattern).
    #[must_use]
    pub fn at(mut self, position: PositionToken) -> Self {
        self.position = Some(position);
        self
    }

    // === Identity ===

    #[must_use]
    pub fn id(&self) -> CombatantId {
        self.id
    }

    #[must_use]
    pub fn team(&self) -> TeamId {
        self.team
    }

    #[must_use]
    pub fn config(&self) -> &CombatantConfig {
        &self.config
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn class_tag(&self) -> ClassTag {
        self.config.class_tag
    }

    #[must_use]
    pub fn element(&self) -> Element {
        self.config.element
    }

    #[must_use]
    pub fn mitigation_percent(&self) -> u32 {
        self.config.mitigation_percent
    }

    #[must_use]
    pub fn position(&self) -> Option<PositionToken> {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Option<PositionToken>) {
        self.position = position;
    }

    // === Life cycle ===

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current
    }

    pub(crate) fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    /// Mark the combatant dead. Returns `true` on the alive -> dead
    /// transition, `false` if it was already dead. Buffs are kept so
    /// death reactions can inspect them.
    pub(crate) fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.current = false;
        true
    }

    /// Bring a dead combatant back at `health_percent` of max health (at
    /// least 1), with a fresh stagger pool and no buffs.
    ///
    /// Returns the buffs that were cleared. No-op on a living combatant.
    pub(crate) fn revive(&mut self, health_percent: u32, position: PositionToken) -> Vec<Buff> {
        if !self.dead {
            return Vec::new();
        }
        self.position = Some(position);
        let max = self.max_health();
        let restored = (max.saturating_mul(i64::from(health_percent)) / 100).max(1);
        if let Some(health) = self.resources.get_mut(&ResourceKind::Health) {
            health.set_current(restored);
        }
        let cleared = self.buffs.drain(..).collect();
        self.restore_secondary_pool();
        self.dead = false;
        cleared
    }

    // === Resources ===

    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> Option<&ResourcePool> {
        self.resources.get(&kind)
    }

    pub(crate) fn resource_mut(&mut self, kind: ResourceKind) -> Option<&mut ResourcePool> {
        self.resources.get_mut(&kind)
    }

    #[must_use]
    pub fn health(&self) -> i64 {
        self.resource(ResourceKind::Health).map_or(0, ResourcePool::current)
    }

    #[must_use]
    pub fn max_health(&self) -> i64 {
        self.resource(ResourceKind::Health).map_or(0, ResourcePool::max)
    }

    #[must_use]
    pub fn stagger(&self) -> i64 {
        self.resource(ResourceKind::Stagger).map_or(0, ResourcePool::current)
    }

    #[must_use]
    pub fn max_stagger(&self) -> i64 {
        self.resource(ResourceKind::Stagger).map_or(0, ResourcePool::max)
    }

    /// The secondary pool mechanic is active (non-zero capacity).
    #[must_use]
    pub fn has_stagger_pool(&self) -> bool {
        self.max_stagger() > 0
    }

    /// Secondary pool active and at or below zero.
    #[must_use]
    pub fn is_cracked(&self) -> bool {
        self.has_stagger_pool() && self.stagger() <= 0
    }

    /// Apply damage to the primary pool. Positive amounts hurt, negative
    /// amounts heal.
    ///
    /// An active shield soaks positive damage first, one charge per point.
    /// If its charges exceed the damage they are reduced and nothing
    /// reaches health; otherwise the shield breaks and the excess goes
    /// through. Health is clamped into `[0, max]`; the first time it lands
    /// on zero the combatant dies.
    pub(crate) fn take_damage(&mut self, amount: i64) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        let mut remaining = amount;

        if remaining > 0 {
            if let Some(index) = self.buff_index(BuffKind::Shield) {
                let charges = i64::from(self.buffs[index].charges.unwrap_or(0));
                if charges > remaining {
                    self.buffs[index].charges = Some((charges - remaining) as u32);
                    outcome.absorbed = remaining;
                    remaining = 0;
                } else {
                    self.buffs.remove(index);
                    outcome.absorbed = charges;
                    outcome.shield_broken = true;
                    remaining -= charges;
                }
            }
        }

        let Some(health) = self.resources.get_mut(&ResourceKind::Health) else {
            return outcome;
        };
        let before = health.current();
        outcome.applied = health.apply_delta(-remaining);
        if before > 0 && health.current() == 0 {
            outcome.died = self.die();
        }
        outcome
    }

    /// Reduce the secondary pool by `amount`, floored at zero. Returns the
    /// change applied.
    pub(crate) fn take_stagger_damage(&mut self, amount: i64) -> i64 {
        self.resources
            .get_mut(&ResourceKind::Stagger)
            .map_or(0, |pool| pool.apply_delta(-amount))
    }

    /// Refill the secondary pool.
    pub(crate) fn restore_secondary_pool(&mut self) {
        if let Some(pool) = self.resources.get_mut(&ResourceKind::Stagger) {
            pool.fill();
        }
    }

    // === Buffs ===

    #[must_use]
    pub fn buffs(&self) -> &[Buff] {
        &self.buffs
    }

    #[must_use]
    pub fn buff(&self, kind: BuffKind) -> Option<&Buff> {
        self.buffs.iter().find(|b| b.kind == kind)
    }

    pub(crate) fn buff_mut(&mut self, kind: BuffKind) -> Option<&mut Buff> {
        self.buffs.iter_mut().find(|b| b.kind == kind)
    }

    #[must_use]
    pub fn has_buff(&self, kind: BuffKind) -> bool {
        self.buff_index(kind).is_some()
    }

    fn buff_index(&self, kind: BuffKind) -> Option<usize> {
        self.buffs.iter().position(|b| b.kind == kind)
    }

    /// Attach a buff, replacing any existing buff of the same kind.
    /// Returns the replaced buff.
    pub(crate) fn add_buff(&mut self, buff: Buff) -> Option<Buff> {
        let replaced = self.remove_buff(buff.kind);
        self.buffs.push(buff);
        replaced
    }

    /// Remove the buff of the given kind, if present.
    pub(crate) fn remove_buff(&mut self, kind: BuffKind) -> Option<Buff> {
        self.buff_index(kind).map(|index| self.buffs.remove(index))
    }

    /// Remove every buff matching `predicate`, in list order.
    pub(crate) fn remove_buffs_where(&mut self, predicate: impl Fn(&Buff) -> bool) -> Vec<Buff> {
        let mut removed = Vec::new();
        let mut index = 0;
        while index < self.buffs.len() {
            if predicate(&self.buffs[index]) {
                removed.push(self.buffs.remove(index));
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Tick every buff tagged with `phase`, then remove and return every
    /// tagged buff whose remaining turns fell below one.
    pub(crate) fn age_buffs_for_phase(&mut self, phase: AgingPhase) -> Vec<Buff> {
        for buff in self.buffs.iter_mut().filter(|b| b.aging_phase == phase) {
            buff.tick();
        }
        self.remove_buffs_where(|b| b.aging_phase == phase && b.is_expired())
    }

    /// Charm flips the effective team for targeting.
    #[must_use]
    pub fn is_charmed(&self) -> bool {
        self.has_buff(BuffKind::Charm)
    }

    // === Per-wave counters ===

    #[must_use]
    pub fn wave_counter(&self, key: MechanicKey) -> i64 {
        self.wave_counters.get(&key).copied().unwrap_or(0)
    }

    pub(crate) fn increment_wave_counter(&mut self, key: MechanicKey) -> i64 {
        let counter = self.wave_counters.entry(key).or_insert(0);
        *counter += 1;
        *counter
    }

    pub(crate) fn reset_wave_counters(&mut self) {
        self.wave_counters.clear();
    }

    // === Abilities ===

    /// Ability categories this combatant may use right now.
    ///
    /// A full-incapacitation buff yields nothing; a partial one yields only
    /// `Basic`. Otherwise `Basic` is always there, `Special` when unlocked,
    /// and `Ultimate` when unlocked and both scale counters have reached
    /// `requirement`.
    #[must_use]
    pub fn available_ability_categories(
        &self,
        scale_a: u8,
        scale_b: u8,
        requirement: u8,
    ) -> SmallVec<[AbilityCategory; 3]> {
        let mut categories = SmallVec::new();
        if self.dead {
            return categories;
        }

        let worst = self
            .buffs
            .iter()
            .map(|b| b.kind.incapacitation())
            .fold(Incapacitation::None, |worst, next| match (worst, next) {
                (Incapacitation::Full, _) | (_, Incapacitation::Full) => Incapacitation::Full,
                (Incapacitation::Partial, _) | (_, Incapacitation::Partial) => Incapacitation::Partial,
                _ => Incapacitation::None,
            });

        match worst {
            Incapacitation::Full => {}
            Incapacitation::Partial => categories.push(AbilityCategory::Basic),
            Incapacitation::None => {
                categories.push(AbilityCategory::Basic);
                if self.config.unlocks_special {
                    categories.push(AbilityCategory::Special);
                }
                if self.config.unlocks_ultimate && scale_a >= requirement && scale_b >= requirement {
                    categories.push(AbilityCategory::Ultimate);
                }
            }
        }
        categories
    }
}
