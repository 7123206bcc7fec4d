//! Resource change resolution.
//!
//! [`ResourceChangeResolver`] turns one order into one result and applies
//! it to the target combatant. It never touches the roster or the event
//! bus; the combat state feeds it the combatants involved and takes care
//! of notifications and reactions.
//!
//! ## Damage formula
//!
//! ```text
//! raw         = attacker outgoing hooks(amount)
//! mitigation  = min(100, victim mitigation + resistance bonus if resisted)   (0 for heals)
//! unmitigated = raw * (100 - mitigation) / 100
//!             + vulnerability bonus           (damage only, not resisted)
//! stagger     = raw                           (damage only, not resisted)
//! final       = unmitigated / 2   while the secondary pool stays uncracked
//!             = unmitigated       otherwise, or for heals, or with no pool
//! ```
//!
//! All divisions floor.

use rustc_hash::FxHashMap;

use super::order::{CalculatedDamage, DamageOrder, ResourceChangeOrder, ResourceChangeResult};
use crate::combatant::{
    chain_incoming, chain_outgoing, Buff, BuffKind, CombatantModel, ElementInteractionRule, HookContext,
    ResourceKind, ResourcePool,
};
use crate::core::CombatConfig;

/// What a strategy did to a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrategyOutcome {
    /// Change the pool actually took.
    pub applied: i64,
    /// The pool crossed into its depleted state on this change.
    pub depleted: bool,
}

/// How a delta lands on a pool of one resource kind.
pub trait ResourceStrategy {
    fn apply(&self, pool: &mut ResourcePool, delta: i64) -> StrategyOutcome;
}

/// Clamp the pool into `[min, max]`. Never signals depletion.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClampAdd;

impl ResourceStrategy for ClampAdd {
    fn apply(&self, pool: &mut ResourcePool, delta: i64) -> StrategyOutcome {
        StrategyOutcome {
            applied: pool.apply_delta(delta),
            depleted: false,
        }
    }
}

/// Clamp, and signal death when health reaches zero from above.
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthStrategy;

impl ResourceStrategy for HealthStrategy {
    fn apply(&self, pool: &mut ResourcePool, delta: i64) -> StrategyOutcome {
        let before = pool.current();
        let applied = pool.apply_delta(delta);
        StrategyOutcome {
            applied,
            depleted: before > 0 && pool.is_depleted(),
        }
    }
}

/// Resource kind -> strategy, falling back to [`ClampAdd`].
pub struct StrategyRegistry {
    strategies: FxHashMap<ResourceKind, Box<dyn ResourceStrategy>>,
    fallback: ClampAdd,
}

impl StrategyRegistry {
    /// Registry with nothing but the fallback.
    pub fn empty() -> Self {
        Self {
            strategies: FxHashMap::default(),
            fallback: ClampAdd,
        }
    }

    /// Install (or replace) the strategy for a resource kind.
    pub fn register(&mut self, kind: ResourceKind, strategy: Box<dyn ResourceStrategy>) {
        self.strategies.insert(kind, strategy);
    }

    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> &dyn ResourceStrategy {
        self.strategies
            .get(&kind)
            .map_or(&self.fallback as &dyn ResourceStrategy, |s| s.as_ref())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ResourceKind::Health, Box::new(HealthStrategy));
        registry
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("kinds", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Computes and applies damage and resource orders.
pub struct ResourceChangeResolver<'a> {
    config: &'a CombatConfig,
    elements: &'a dyn ElementInteractionRule,
    strategies: &'a StrategyRegistry,
}

impl<'a> ResourceChangeResolver<'a> {
    pub fn new(
        config: &'a CombatConfig,
        elements: &'a dyn ElementInteractionRule,
        strategies: &'a StrategyRegistry,
    ) -> Self {
        Self {
            config,
            elements,
            strategies,
        }
    }

    /// Run the damage formula without touching the victim.
    ///
    /// The returned result has `absorbed`, `health_change`, `shield_broken`
    /// and `killed` left at their defaults.
    #[must_use]
    pub fn calculate_damage(
        &self,
        order: &DamageOrder,
        attacker_buffs: &[Buff],
        victim: &CombatantModel,
    ) -> CalculatedDamage {
        let raw = chain_outgoing(attacker_buffs, &HookContext::damage(), order.amount);
        let heal = raw < 0;
        let resisted = self.elements.is_resistant(order.element, victim.element());

        let mitigation = if heal {
            0
        } else {
            let bonus = if resisted {
                self.config.resistance_mitigation_bonus
            } else {
                0
            };
            victim.mitigation_percent().saturating_add(bonus).min(100)
        };
        let mut unmitigated = raw.saturating_mul(i64::from(100 - mitigation)) / 100;
        if !heal && !resisted && victim.has_buff(BuffKind::Vulnerability) {
            unmitigated = unmitigated
                .saturating_mul(i64::from(self.config.vulnerability_bonus_percent).saturating_add(100))
                / 100;
        }

        let (stagger_amount, cracked, final_amount) = if victim.has_stagger_pool() {
            let stagger_amount = if heal || resisted { 0 } else { raw };
            let before = victim.stagger();
            let after = before.saturating_sub(stagger_amount);
            let cracked = stagger_amount > 0 && before > 0 && after <= 0;
            let final_amount = if heal || after <= 0 {
                unmitigated
            } else {
                unmitigated.div_euclid(2)
            };
            (stagger_amount, cracked, final_amount)
        } else {
            (0, false, unmitigated)
        };

        CalculatedDamage {
            source: order.source,
            target: order.target,
            effect: order.effect,
            element: order.element,
            original_amount: order.amount,
            raw_amount: raw,
            unmitigated_amount: unmitigated,
            final_amount,
            stagger_amount,
            absorbed: 0,
            health_change: 0,
            resisted,
            cracked,
            shield_broken: false,
            killed: false,
        }
    }

    /// Calculate and apply a damage order. Orders against a dead victim
    /// resolve to zero and change nothing.
    pub fn resolve_damage(
        &self,
        order: &DamageOrder,
        attacker_buffs: &[Buff],
        victim: &mut CombatantModel,
    ) -> CalculatedDamage {
        let mut result = self.calculate_damage(order, attacker_buffs, victim);
        if victim.is_dead() {
            result.final_amount = 0;
            result.stagger_amount = 0;
            result.cracked = false;
            return result;
        }

        victim.take_stagger_damage(result.stagger_amount);
        let outcome = victim.take_damage(result.final_amount);
        result.absorbed = outcome.absorbed;
        result.health_change = outcome.applied;
        result.shield_broken = outcome.shield_broken;
        result.killed = outcome.died;
        result
    }

    /// Run a generic resource order through the source's outgoing hooks,
    /// the target's incoming hooks and the pool's strategy.
    ///
    /// A target without the pool, or a dead target, is left unchanged.
    pub fn resolve_resource_change(
        &self,
        order: &ResourceChangeOrder,
        source_buffs: &[Buff],
        target: &mut CombatantModel,
    ) -> ResourceChangeResult {
        let ctx = HookContext::resource(order.resource);
        let outgoing = chain_outgoing(source_buffs, &ctx, order.amount);
        let final_amount = chain_incoming(target.buffs(), &ctx, outgoing);

        let mut result = ResourceChangeResult {
            source: order.source,
            target: order.target,
            effect: order.effect,
            resource: order.resource,
            original_amount: order.amount,
            final_amount,
            applied: 0,
            killed: false,
        };
        if target.is_dead() {
            return result;
        }

        let strategy = self.strategies.get(order.resource);
        let Some(pool) = target.resource_mut(order.resource) else {
            return result;
        };
        let outcome = strategy.apply(pool, final_amount);
        result.applied = outcome.applied;
        if outcome.depleted && order.resource == ResourceKind::Health {
            result.killed = target.die();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abilities::AbilityId;
    use crate::combatant::{CombatantConfig, Element, ElementWheel, NoResistance};
    use crate::core::{CombatantId, TeamId};
    use crate::effects::order::EffectRef;

    fn victim(config: CombatantConfig) -> CombatantModel {
        CombatantModel::new(CombatantId(2), TeamId::ENEMY, Arc::new(config))
    }

    fn hit(amount: i64, element: Element) -> DamageOrder {
        DamageOrder {
            source: CombatantId(1),
            target: CombatantId(2),
            amount,
            element,
            effect: EffectRef::selected(AbilityId::BASIC_ATTACK),
        }
    }

    #[test]
    fn test_plain_damage_no_secondary_pool() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("dummy", 100));

        let result = resolver.resolve_damage(&hit(30, Element::Neutral), &[], &mut v);
        assert_eq!(result.final_amount, 30);
        assert_eq!(result.health_change, -30);
        assert_eq!(v.health(), 70);
    }

    #[test]
    fn test_mitigation_floors() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let v = victim(CombatantConfig::new("armored", 100).with_mitigation(30));

        let result = resolver.calculate_damage(&hit(15, Element::Neutral), &[], &v);
        // 15 * 70 / 100 = 10.5
        assert_eq!(result.unmitigated_amount, 10);
    }

    #[test]
    fn test_extreme_mitigation_and_rolls_saturate() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &ElementWheel, &strategies);

        let fortress = victim(
            CombatantConfig::new("fortress", 100)
                .with_element(Element::Fire)
                .with_mitigation(u32::MAX - 10),
        );
        let result = resolver.calculate_damage(&hit(40, Element::Fire), &[], &fortress);
        assert!(result.resisted);
        assert_eq!(result.unmitigated_amount, 0);

        let mut dummy = victim(CombatantConfig::new("dummy", 100).with_stagger(10));
        let result = resolver.resolve_damage(&hit(i64::MAX, Element::Neutral), &[], &mut dummy);
        assert_eq!(result.unmitigated_amount, i64::MAX / 100);
        assert!(result.cracked);
        assert!(dummy.is_dead());
    }

    #[test]
    fn test_halving_while_uncracked() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("brute", 100).with_stagger(50));

        let result = resolver.resolve_damage(&hit(21, Element::Neutral), &[], &mut v);
        assert_eq!(result.stagger_amount, 21);
        assert_eq!(result.final_amount, 10);
        assert!(!result.cracked);
        assert_eq!(v.stagger(), 29);
        assert_eq!(v.health(), 90);
    }

    #[test]
    fn test_crack_hit_deals_full_damage() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("brute", 100).with_stagger(10));

        let result = resolver.resolve_damage(&hit(12, Element::Neutral), &[], &mut v);
        assert!(result.cracked);
        assert_eq!(result.final_amount, 12);
        assert!(v.is_cracked());

        // Already cracked: no second crack, still full damage
        let again = resolver.resolve_damage(&hit(5, Element::Neutral), &[], &mut v);
        assert!(!again.cracked);
        assert_eq!(again.final_amount, 5);
    }

    #[test]
    fn test_resisted_hit_skips_secondary_pool() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &ElementWheel, &strategies);
        let mut v = victim(
            CombatantConfig::new("salamander", 100)
                .with_element(Element::Fire)
                .with_stagger(40),
        );

        let result = resolver.resolve_damage(&hit(20, Element::Fire), &[], &mut v);
        assert!(result.resisted);
        assert_eq!(result.stagger_amount, 0);
        // 20 * 75 / 100 = 15, halved = 7
        assert_eq!(result.unmitigated_amount, 15);
        assert_eq!(result.final_amount, 7);
        assert_eq!(v.stagger(), 40);
    }

    #[test]
    fn test_vulnerability_only_when_not_resisted() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("target", 100));
        v.add_buff(Buff::new(BuffKind::Vulnerability, CombatantId(2)).as_debuff(true));

        let result = resolver.calculate_damage(&hit(20, Element::Neutral), &[], &v);
        assert_eq!(result.unmitigated_amount, 25);
    }

    #[test]
    fn test_heal_through_damage_order() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("ally", 100).with_mitigation(50).with_stagger(10));
        v.take_damage(40);

        let result = resolver.resolve_damage(&hit(-15, Element::Neutral), &[], &mut v);
        assert_eq!(result.final_amount, -15);
        assert_eq!(result.stagger_amount, 0);
        assert_eq!(v.health(), 75);
    }

    #[test]
    fn test_attacker_weakness_halves_raw() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let v = victim(CombatantConfig::new("dummy", 100));
        let weakness = [Buff::new(BuffKind::Weakness, CombatantId(1)).as_debuff(true)];

        let result = resolver.calculate_damage(&hit(30, Element::Neutral), &weakness, &v);
        assert_eq!(result.raw_amount, 15);
    }

    #[test]
    fn test_dead_victim_unchanged() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("dummy", 10));
        let first = resolver.resolve_damage(&hit(10, Element::Neutral), &[], &mut v);
        assert!(first.killed);

        let second = resolver.resolve_damage(&hit(-10, Element::Neutral), &[], &mut v);
        assert_eq!(second.health_change, 0);
        assert_eq!(v.health(), 0);
        assert!(v.is_dead());
    }

    #[test]
    fn test_resource_change_health_kills() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("dummy", 5));
        let order = ResourceChangeOrder {
            source: None,
            target: CombatantId(2),
            resource: ResourceKind::Health,
            amount: -8,
            effect: EffectRef::reaction(AbilityId::PRE_TURN),
        };

        let result = resolver.resolve_resource_change(&order, &[], &mut v);
        assert_eq!(result.applied, -5);
        assert!(result.killed);
        assert!(v.is_dead());
    }

    #[test]
    fn test_resource_change_wither_halves_healing() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("dummy", 100));
        v.take_damage(50);
        v.add_buff(Buff::new(BuffKind::Wither, CombatantId(2)).as_debuff(true));
        let order = ResourceChangeOrder {
            source: Some(CombatantId(1)),
            target: CombatantId(2),
            resource: ResourceKind::Health,
            amount: 20,
            effect: EffectRef::selected(AbilityId::new(3)),
        };

        let result = resolver.resolve_resource_change(&order, &[], &mut v);
        assert_eq!(result.final_amount, 10);
        assert_eq!(v.health(), 60);
    }

    #[test]
    fn test_missing_pool_is_noop() {
        let config = CombatConfig::default();
        let strategies = StrategyRegistry::default();
        let resolver = ResourceChangeResolver::new(&config, &NoResistance, &strategies);
        let mut v = victim(CombatantConfig::new("dummy", 100));
        let order = ResourceChangeOrder {
            source: None,
            target: CombatantId(2),
            resource: ResourceKind::Mana,
            amount: 10,
            effect: EffectRef::selected(AbilityId::new(9)),
        };

        let result = resolver.resolve_resource_change(&order, &[], &mut v);
        assert_eq!(result.applied, 0);
    }

    #[test]
    fn test_strategy_fallback() {
        let registry = StrategyRegistry::default();
        let mut pool = ResourcePool::with_bounds(0, 10, 3);
        let outcome = registry.get(ResourceKind::Mana).apply(&mut pool, -5);
        assert_eq!(outcome.applied, -3);
        assert!(!outcome.depleted);

        let mut health = ResourcePool::full(4);
        let outcome = registry.get(ResourceKind::Health).apply(&mut health, -4);
        assert!(outcome.depleted);
    }
}
