//! Selectable abilities.
//!
//! Only [`BasicAttack`] has a fixed id. The others are parameterized and
//! registered by the game under its own ids.

use super::{Ability, AbilityCategory, AbilityContext, AbilityId};
use crate::combatant::{Buff, BuffKind, ResourceKind};
use crate::core::ConfigRef;
use crate::effects::{
    BuffOrder, BuffRemovalOrder, DamageOrder, EffectPlan, Order, RemovalFilter, ResourceChangeOrder, ReviveOrder,
    ScalePointOrder, ScaleSide, SummonOrder, TargetFilter, TargetScope,
};

/// Single-target attack using the caster's attack stats.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicAttack;

impl Ability for BasicAttack {
    fn id(&self) -> AbilityId {
        AbilityId::BASIC_ATTACK
    }

    fn name(&self) -> &str {
        "Basic Attack"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Enemy
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let mut plan = ctx.plan_for(self);
        let effect = plan.effect();
        if let Some(amount) = ctx.roll_attack() {
            plan.push(Order::Damage(DamageOrder {
                source: ctx.caster.id(),
                target: ctx.target.id(),
                amount,
                element: ctx.caster.config().attack.element,
                effect,
            }));
        } else {
            tracing::debug!(caster = %ctx.caster.id(), combatant = %ctx.target.id(), "attack missed");
        }
        plan
    }
}

/// One attack roll applied to the target and, reduced, to enemies
/// around it.
#[derive(Clone, Debug)]
pub struct AreaAttack {
    id: AbilityId,
    category: AbilityCategory,
    radius: u32,
    splash_percent: u32,
}

impl AreaAttack {
    /// Radius 1, splash at 50%.
    pub fn new(id: AbilityId) -> Self {
        Self {
            id,
            category: AbilityCategory::Special,
            radius: 1,
            splash_percent: 50,
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_splash(mut self, percent: u32) -> Self {
        self.splash_percent = percent;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: AbilityCategory) -> Self {
        self.category = category;
        self
    }
}

impl Ability for AreaAttack {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        "Area Attack"
    }

    fn category(&self) -> AbilityCategory {
        self.category
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Enemy
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let mut plan = ctx.plan_for(self);
        let Some(amount) = ctx.roll_attack() else {
            return plan;
        };
        let element = ctx.caster.config().attack.element;
        let effect = plan.effect();
        let caster = ctx.caster.id();
        let mut hit = |target, amount| {
            plan.push(Order::Damage(DamageOrder {
                source: caster,
                target,
                amount,
                element,
                effect,
            }));
        };
        hit(ctx.target.id(), amount);

        let Some(center) = ctx.target.position() else {
            return plan;
        };
        let splash = amount * i64::from(self.splash_percent) / 100;
        let positions = ctx.positions;
        let around = TargetFilter::within_distance(
            ctx.roster,
            ctx.caster,
            TargetScope::Enemy,
            center,
            self.radius,
            |a, b| positions.distance(a, b),
        );
        for id in around.into_iter().filter(|id| *id != ctx.target.id()) {
            hit(id, splash);
        }
        plan
    }
}

/// Restore health to a living ally or self.
#[derive(Clone, Debug)]
pub struct Heal {
    id: AbilityId,
    amount: i64,
    category: AbilityCategory,
}

impl Heal {
    pub fn new(id: AbilityId, amount: i64) -> Self {
        Self {
            id,
            amount,
            category: AbilityCategory::Special,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: AbilityCategory) -> Self {
        self.category = category;
        self
    }
}

impl Ability for Heal {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        "Heal"
    }

    fn category(&self) -> AbilityCategory {
        self.category
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::FriendlyOrSelf
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        plan.with_order(Order::ResourceChange(ResourceChangeOrder {
            source: Some(ctx.caster.id()),
            target: ctx.target.id(),
            resource: ResourceKind::Health,
            amount: self.amount,
            effect,
        }))
    }
}

/// Attach a copy of a buff template to the target.
#[derive(Clone, Debug)]
pub struct ApplyBuff {
    id: AbilityId,
    name: String,
    template: Buff,
    scope: TargetScope,
    category: AbilityCategory,
}

impl ApplyBuff {
    /// The template's `target` and `source` are overwritten when cast.
    /// Scope defaults to enemies for debuffs and friends otherwise.
    pub fn new(id: AbilityId, name: impl Into<String>, template: Buff) -> Self {
        let scope = if template.is_debuff {
            TargetScope::Enemy
        } else {
            TargetScope::FriendlyOrSelf
        };
        Self {
            id,
            name: name.into(),
            template,
            scope,
            category: AbilityCategory::Special,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: TargetScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: AbilityCategory) -> Self {
        self.category = category;
        self
    }
}

impl Ability for ApplyBuff {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> AbilityCategory {
        self.category
    }

    fn target_scope(&self) -> TargetScope {
        self.scope
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        let buff = self
            .template
            .for_target(ctx.target.id())
            .with_source(ctx.caster.id());
        plan.with_order(Order::AddBuff(BuffOrder { buff, effect }))
    }
}

/// Strip every debuff from a living ally or self.
#[derive(Clone, Copy, Debug)]
pub struct Cleanse {
    id: AbilityId,
}

impl Cleanse {
    pub fn new(id: AbilityId) -> Self {
        Self { id }
    }
}

impl Ability for Cleanse {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        "Cleanse"
    }

    fn category(&self) -> AbilityCategory {
        AbilityCategory::Special
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::FriendlyOrSelf
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        plan.with_order(Order::RemoveBuffs(BuffRemovalOrder {
            target: ctx.target.id(),
            filter: RemovalFilter::Debuffs,
            effect,
        }))
    }
}

/// Strip one buff kind from an enemy.
#[derive(Clone, Copy, Debug)]
pub struct Dispel {
    id: AbilityId,
    kind: BuffKind,
}

impl Dispel {
    pub fn new(id: AbilityId, kind: BuffKind) -> Self {
        Self { id, kind }
    }
}

impl Ability for Dispel {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        "Dispel"
    }

    fn category(&self) -> AbilityCategory {
        AbilityCategory::Special
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Enemy
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        plan.with_order(Order::RemoveBuffs(BuffRemovalOrder {
            target: ctx.target.id(),
            filter: RemovalFilter::Kind(self.kind),
            effect,
        }))
    }
}

/// Revive a fallen ally.
#[derive(Clone, Copy, Debug)]
pub struct ReviveAlly {
    id: AbilityId,
    health_percent: Option<u32>,
}

impl ReviveAlly {
    /// Revive at the configured default health.
    pub fn new(id: AbilityId) -> Self {
        Self {
            id,
            health_percent: None,
        }
    }

    #[must_use]
    pub fn at_health(mut self, percent: u32) -> Self {
        self.health_percent = Some(percent);
        self
    }
}

impl Ability for ReviveAlly {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        "Revive"
    }

    fn category(&self) -> AbilityCategory {
        AbilityCategory::Ultimate
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::DeadFriendly
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        plan.with_order(Order::Revive(ReviveOrder {
            source: ctx.caster.id(),
            target: ctx.target.id(),
            health_percent: self
                .health_percent
                .unwrap_or(ctx.config.default_revive_health_percent),
            effect,
        }))
    }
}

/// Bring a new combatant onto the caster's side.
#[derive(Clone, Debug)]
pub struct Summon {
    id: AbilityId,
    config_ref: ConfigRef,
}

impl Summon {
    pub fn new(id: AbilityId, config_ref: ConfigRef) -> Self {
        Self { id, config_ref }
    }
}

impl Ability for Summon {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        "Summon"
    }

    fn category(&self) -> AbilityCategory {
        AbilityCategory::Special
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::FriendlyOrSelf
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        plan.with_order(Order::Summon(SummonOrder {
            source: ctx.caster.id(),
            team: ctx.caster.team(),
            config_ref: self.config_ref.clone(),
            effect,
        }))
    }
}

/// Shift one of the caster team's scale counters, optionally with an
/// attack on the target.
#[derive(Clone, Copy, Debug)]
pub struct ScaleShift {
    id: AbilityId,
    side: ScaleSide,
    delta: i8,
    attacks: bool,
}

impl ScaleShift {
    pub fn new(id: AbilityId, side: ScaleSide, delta: i8) -> Self {
        Self {
            id,
            side,
            delta,
            attacks: false,
        }
    }

    /// Also roll an attack on the (enemy) target.
    #[must_use]
    pub fn with_attack(mut self) -> Self {
        self.attacks = true;
        self
    }
}

impl Ability for ScaleShift {
    fn id(&self) -> AbilityId {
        self.id
    }

    fn name(&self) -> &str {
        "Scale Shift"
    }

    fn target_scope(&self) -> TargetScope {
        if self.attacks {
            TargetScope::Enemy
        } else {
            TargetScope::FriendlyOrSelf
        }
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let mut plan = ctx.plan_for(self);
        let effect = plan.effect();
        if self.attacks {
            if let Some(amount) = ctx.roll_attack() {
                plan.push(Order::Damage(DamageOrder {
                    source: ctx.caster.id(),
                    target: ctx.target.id(),
                    amount,
                    element: ctx.caster.config().attack.element,
                    effect,
                }));
            }
        }
        plan.push(Order::ScalePointChange(ScalePointOrder {
            team: ctx.caster.team(),
            side: self.side,
            delta: self.delta,
            effect,
        }));
        plan
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::combat::SlotGrid;
    use crate::combatant::{AttackStats, CombatantConfig, CombatantModel, Element};
    use crate::core::{CombatConfig, CombatantId, FixedRandom, PositionToken, TeamId};

    fn model(id: u32, team: TeamId, config: CombatantConfig) -> CombatantModel {
        CombatantModel::new(CombatantId(id), team, Arc::new(config))
    }

    #[test]
    fn test_basic_attack_miss_yields_empty_plan() {
        let stats = AttackStats {
            accuracy: 60,
            ..AttackStats::default()
        };
        let caster = model(1, TeamId::PLAYER, CombatantConfig::new("archer", 10).with_attack_stats(stats));
        let target = model(2, TeamId::ENEMY, CombatantConfig::new("rat", 10));
        let roster = vec![caster.clone(), target.clone()];
        let mut rng = FixedRandom::never();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();

        let mut ctx = AbilityContext::new(&caster, &target, &roster, &mut rng, &grid, &config);
        let plan = BasicAttack.produce_effect_plan(&mut ctx);
        assert!(plan.is_empty());
        assert!(plan.effect().selectable);
    }

    #[test]
    fn test_basic_attack_crit() {
        let stats = AttackStats {
            min_damage: 10,
            max_damage: 10,
            crit_chance: 20,
            crit_multiplier_percent: 200,
            ..AttackStats::default()
        };
        let caster = model(1, TeamId::PLAYER, CombatantConfig::new("rogue", 10).with_attack_stats(stats));
        let target = model(2, TeamId::ENEMY, CombatantConfig::new("rat", 10));
        let roster = vec![caster.clone(), target.clone()];
        let mut rng = FixedRandom::always();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();

        let mut ctx = AbilityContext::new(&caster, &target, &roster, &mut rng, &grid, &config);
        let plan = BasicAttack.produce_effect_plan(&mut ctx);
        assert_eq!(plan.damage_orders()[0].amount, 20);
    }

    #[test]
    fn test_area_attack_splashes_neighbours() {
        let caster = model(1, TeamId::PLAYER, CombatantConfig::new("mage", 10).with_attack(10, Element::Fire));
        let enemies: Vec<_> = (0..4u8)
            .map(|slot| {
                model(10 + u32::from(slot), TeamId::ENEMY, CombatantConfig::new("imp", 10))
                    .at(PositionToken::new(TeamId::ENEMY, slot))
            })
            .collect();
        let mut roster = vec![caster.clone()];
        roster.extend(enemies.iter().cloned());
        let mut rng = FixedRandom::always();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();

        let mut ctx = AbilityContext::new(&caster, &enemies[1], &roster, &mut rng, &grid, &config);
        let plan = AreaAttack::new(AbilityId::new(1000)).produce_effect_plan(&mut ctx);
        let hits: Vec<_> = plan.damage_orders().iter().map(|o| (o.target.raw(), o.amount)).collect();
        assert_eq!(hits, vec![(11, 10), (10, 5), (12, 5)]);
    }

    #[test]
    fn test_apply_buff_stamps_source_and_target() {
        let caster = model(1, TeamId::PLAYER, CombatantConfig::new("hexer", 10));
        let target = model(2, TeamId::ENEMY, CombatantConfig::new("rat", 10));
        let roster = vec![caster.clone(), target.clone()];
        let mut rng = FixedRandom::always();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();

        let template = Buff::new(BuffKind::Weakness, CombatantId(0))
            .with_duration(2)
            .as_debuff(true);
        let ability = ApplyBuff::new(AbilityId::new(1001), "Hex", template);
        assert_eq!(ability.target_scope(), TargetScope::Enemy);

        let mut ctx = AbilityContext::new(&caster, &target, &roster, &mut rng, &grid, &config);
        let plan = ability.produce_effect_plan(&mut ctx);
        let buff = &plan.buff_orders()[0].buff;
        assert_eq!(buff.target, CombatantId(2));
        assert_eq!(buff.source, Some(CombatantId(1)));
        assert_eq!(buff.remaining_turns, 2);
    }

    #[test]
    fn test_revive_uses_default_percent() {
        let caster = model(1, TeamId::PLAYER, CombatantConfig::new("priest", 10));
        let mut fallen = model(2, TeamId::PLAYER, CombatantConfig::new("knight", 10));
        fallen.die();
        let roster = vec![caster.clone(), fallen.clone()];
        let mut rng = FixedRandom::always();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();

        let mut ctx = AbilityContext::new(&caster, &fallen, &roster, &mut rng, &grid, &config);
        let plan = ReviveAlly::new(AbilityId::new(1002)).produce_effect_plan(&mut ctx);
        assert_eq!(plan.revive_orders()[0].health_percent, 50);
    }
}
