//! Reaction abilities scheduled by the resolver.
//!
//! None of these are player-selectable. When a buff triggers the
//! reaction it is passed in as `ctx.trigger`.

use super::{Ability, AbilityContext, AbilityId};
use crate::combatant::Passive;
use crate::effects::{
    DamageOrder, EffectPlan, Order, ResourceChangeOrder, ReviveOrder, TargetFilter, TargetScope,
};

/// Damage from the trigger's magnitude when set, otherwise an attack roll.
fn reaction_damage(ctx: &mut AbilityContext<'_>) -> Option<i64> {
    match ctx.trigger {
        Some(buff) if buff.magnitude > 0 => Some(buff.magnitude),
        _ => ctx.roll_attack(),
    }
}

fn strike_back(ability: &dyn Ability, ctx: &mut AbilityContext<'_>) -> EffectPlan {
    let mut plan = ctx.plan_for(ability);
    let effect = plan.effect();
    if let Some(amount) = reaction_damage(ctx) {
        plan.push(Order::Damage(DamageOrder {
            source: ctx.caster.id(),
            target: ctx.target.id(),
            amount,
            element: ctx.caster.config().attack.element,
            effect,
        }));
    }
    plan
}

/// Hit back at whoever damaged the bearer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Retaliation;

impl Ability for Retaliation {
    fn id(&self) -> AbilityId {
        AbilityId::RETALIATION
    }

    fn name(&self) -> &str {
        "Retaliation"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Enemy
    }

    fn is_player_selectable(&self) -> bool {
        false
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        strike_back(self, ctx)
    }
}

/// Hit back at whoever damaged one of the bearer's teammates.
#[derive(Clone, Copy, Debug, Default)]
pub struct TeamRetaliation;

impl Ability for TeamRetaliation {
    fn id(&self) -> AbilityId {
        AbilityId::TEAM_RETALIATION
    }

    fn name(&self) -> &str {
        "Team Retaliation"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Enemy
    }

    fn is_player_selectable(&self) -> bool {
        false
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        strike_back(self, ctx)
    }
}

/// A dying bearer damages every living enemy.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeathExplosion;

impl Ability for DeathExplosion {
    fn id(&self) -> AbilityId {
        AbilityId::DEATH_EXPLOSION
    }

    fn name(&self) -> &str {
        "Death Explosion"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Enemy
    }

    fn is_player_selectable(&self) -> bool {
        false
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let mut plan = ctx.plan_for(self);
        let effect = plan.effect();
        let attack = ctx.caster.config().attack;
        let amount = match ctx.trigger {
            Some(buff) if buff.magnitude > 0 => buff.magnitude,
            _ => attack.max_damage,
        };
        for target in TargetFilter::filter_by_scope(ctx.roster, ctx.caster, TargetScope::Enemy) {
            plan.push(Order::Damage(DamageOrder {
                source: ctx.caster.id(),
                target,
                amount,
                element: attack.element,
                effect,
            }));
        }
        plan
    }
}

/// A dying bearer comes back.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeathRevive;

impl Ability for DeathRevive {
    fn id(&self) -> AbilityId {
        AbilityId::DEATH_REVIVE
    }

    fn name(&self) -> &str {
        "Death Revive"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::AnyDead
    }

    fn is_player_selectable(&self) -> bool {
        false
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        let health_percent = match ctx.trigger {
            Some(buff) if buff.magnitude > 0 => buff.magnitude as u32,
            _ => ctx.config.default_revive_health_percent,
        };
        plan.with_order(Order::Revive(ReviveOrder {
            source: ctx.caster.id(),
            target: ctx.caster.id(),
            health_percent,
            effect,
        }))
    }
}

/// Once-per-wave revive of a fallen teammate by a passive holder.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassiveRevive;

impl Ability for PassiveRevive {
    fn id(&self) -> AbilityId {
        AbilityId::PASSIVE_REVIVE
    }

    fn name(&self) -> &str {
        "Passive Revive"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::DeadFriendly
    }

    fn is_player_selectable(&self) -> bool {
        false
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let plan = ctx.plan_for(self);
        let effect = plan.effect();
        let health_percent = ctx
            .caster
            .config()
            .passives
            .iter()
            .map(|passive| match passive {
                Passive::ReviveAlly { health_percent } => *health_percent,
            })
            .next()
            .unwrap_or(ctx.config.default_revive_health_percent);
        plan.with_order(Order::Revive(ReviveOrder {
            source: ctx.caster.id(),
            target: ctx.target.id(),
            health_percent,
            effect,
        }))
    }
}

/// Over-time buffs (regeneration, poison) acting on their bearer before
/// its turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreTurnTick;

impl Ability for PreTurnTick {
    fn id(&self) -> AbilityId {
        AbilityId::PRE_TURN
    }

    fn name(&self) -> &str {
        "Pre-turn"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::FriendlyOrSelf
    }

    fn is_player_selectable(&self) -> bool {
        false
    }

    fn produce_effect_plan(&self, ctx: &mut AbilityContext<'_>) -> EffectPlan {
        let mut plan = ctx.plan_for(self);
        let effect = plan.effect();
        for buff in ctx.caster.buffs() {
            if let Some((resource, amount)) = buff.pre_turn_delta() {
                plan.push(Order::ResourceChange(ResourceChangeOrder {
                    source: buff.source,
                    target: ctx.caster.id(),
                    resource,
                    amount,
                    effect,
                }));
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::combat::SlotGrid;
    use crate::combatant::{Buff, BuffKind, CombatantConfig, CombatantModel, Element};
    use crate::core::{CombatConfig, CombatantId, FixedRandom, TeamId};

    fn model(id: u32, team: TeamId, config: CombatantConfig) -> CombatantModel {
        CombatantModel::new(CombatantId(id), team, Arc::new(config))
    }

    #[test]
    fn test_retaliation_uses_magnitude() {
        let bearer = model(1, TeamId::PLAYER, CombatantConfig::new("thorn", 10).with_attack(3, Element::Earth));
        let attacker = model(2, TeamId::ENEMY, CombatantConfig::new("wolf", 10));
        let roster = vec![bearer.clone(), attacker.clone()];
        let mut rng = FixedRandom::always();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();
        let trigger = Buff::new(BuffKind::Retaliation, CombatantId(1)).with_magnitude(7);

        let mut ctx = AbilityContext::new(&bearer, &attacker, &roster, &mut rng, &grid, &config)
            .with_trigger(Some(&trigger));
        let plan = Retaliation.produce_effect_plan(&mut ctx);
        assert!(!plan.effect().selectable);
        assert_eq!(plan.damage_orders()[0].amount, 7);
        assert_eq!(plan.damage_orders()[0].target, CombatantId(2));

        let mut ctx = AbilityContext::new(&bearer, &attacker, &roster, &mut rng, &grid, &config);
        let plan = Retaliation.produce_effect_plan(&mut ctx);
        assert_eq!(plan.damage_orders()[0].amount, 3);
    }

    #[test]
    fn test_death_explosion_hits_living_enemies() {
        let mut bomber = model(1, TeamId::ENEMY, CombatantConfig::new("bomb", 10));
        bomber.die();
        let a = model(2, TeamId::PLAYER, CombatantConfig::new("a", 10));
        let mut b = model(3, TeamId::PLAYER, CombatantConfig::new("b", 10));
        b.die();
        let c = model(4, TeamId::PLAYER, CombatantConfig::new("c", 10));
        let roster = vec![bomber.clone(), a, b, c];
        let mut rng = FixedRandom::always();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();
        let trigger = Buff::new(BuffKind::ExplodeOnDeath, CombatantId(1)).with_magnitude(4);

        let mut ctx =
            AbilityContext::new(&bomber, &bomber, &roster, &mut rng, &grid, &config).with_trigger(Some(&trigger));
        let plan = DeathExplosion.produce_effect_plan(&mut ctx);
        let targets: Vec<_> = plan.damage_orders().iter().map(|o| o.target.raw()).collect();
        assert_eq!(targets, vec![2, 4]);
    }

    #[test]
    fn test_pre_turn_collects_over_time_buffs() {
        let mut bearer = model(1, TeamId::PLAYER, CombatantConfig::new("druid", 20));
        bearer.add_buff(Buff::new(BuffKind::Regeneration, CombatantId(1)).with_magnitude(3));
        bearer.add_buff(
            Buff::new(BuffKind::Poison, CombatantId(1))
                .with_source(CombatantId(9))
                .with_magnitude(2)
                .as_debuff(true),
        );
        bearer.add_buff(Buff::new(BuffKind::Strengthen, CombatantId(1)));
        let roster = vec![bearer.clone()];
        let mut rng = FixedRandom::always();
        let grid = SlotGrid::new(4);
        let config = CombatConfig::default();

        let mut ctx = AbilityContext::new(&bearer, &bearer, &roster, &mut rng, &grid, &config);
        let plan = PreTurnTick.produce_effect_plan(&mut ctx);
        let amounts: Vec<_> = plan.resource_orders().iter().map(|o| (o.amount, o.source)).collect();
        assert_eq!(amounts, vec![(3, None), (-2, Some(CombatantId(9)))]);
    }
}
