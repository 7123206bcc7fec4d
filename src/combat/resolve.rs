//! The recursive resolution pass.
//!
//! One plan runs through twelve fixed stages:
//!
//! 1. finalize (scale damage bonus)
//! 2. notify start
//! 3. scale point orders
//! 4. damage and resource orders
//! 5. damage reactions (retaliation)
//! 6. buff removals, then buff additions
//! 7. revives
//! 8. summons
//! 9. death reactions (explode, then revive)
//! 10. team reactions (passive revive, team retaliation)
//! 11. notify complete
//! 12. children, depth-first, in append order
//!
//! Stages 5, 9 and 10 append children to the same plan, so later stages
//! see what earlier ones queued. Once every child has resolved the plan
//! reports `CascadeResolved`.

use smallvec::SmallVec;

use super::state::CombatState;
use crate::abilities::AbilityId;
use crate::combatant::{Buff, BuffKind, MechanicKey, Passive};
use crate::core::{CombatantId, Result, TeamId};
use crate::effects::{
    CalculatedDamage, DamageOrder, EffectPlan, RemovalFilter, ResourceChangeOrder, ResourceChangeResolver,
    ResourceChangeResult,
};
use crate::events::CombatEvent;

type Buffs = SmallVec<[Buff; 4]>;

impl CombatState {
    /// Resolve a plan and its whole cascade. Returns the plan with its
    /// results and resolved children filled in.
    ///
    /// Fails only on fatal preconditions (an order naming a combatant that
    /// isn't in the roster, a reaction whose ability isn't registered).
    pub fn resolve_plan(&mut self, plan: EffectPlan) -> Result<EffectPlan> {
        self.resolve_at_depth(plan, 0)
    }

    fn resolve_at_depth(&mut self, mut plan: EffectPlan, depth: usize) -> Result<EffectPlan> {
        let span = tracing::debug_span!(
            "resolve_plan",
            plan_depth = depth,
            ability = %plan.effect().ability,
            caster = %plan.caster(),
        );
        let _enter = span.enter();

        self.finalize(&mut plan)?;
        self.emit(CombatEvent::PlanExecutionStart {
            caster: plan.caster(),
            target: plan.target(),
            ability: plan.effect().ability,
            depth,
        });
        self.resolve_scale_orders(&plan);
        self.resolve_resource_orders(&mut plan)?;
        self.queue_damage_reactions(&mut plan)?;
        self.resolve_buff_orders(&plan)?;
        self.resolve_revive_orders(&plan)?;
        self.resolve_summon_orders(&plan)?;
        self.queue_death_reactions(&mut plan)?;
        self.queue_team_reactions(&mut plan)?;
        self.emit(CombatEvent::PlanExecutionComplete {
            caster: plan.caster(),
            target: plan.target(),
            ability: plan.effect().ability,
            depth,
        });

        let children = std::mem::take(&mut plan.children);
        if !children.is_empty() {
            if depth >= self.config.max_cascade_depth {
                tracing::warn!(
                    plan_depth = depth,
                    dropped = children.len(),
                    "cascade depth ceiling reached, child plans dropped"
                );
            } else {
                for child in children {
                    let resolved = self.resolve_at_depth(child, depth + 1)?;
                    plan.children.push(resolved);
                }
            }
        }

        self.emit(CombatEvent::CascadeResolved {
            caster: plan.caster(),
            ability: plan.effect().ability,
            depth,
            plans: plan.cascade_size(),
        });
        Ok(plan)
    }

    // === Stage 1 ===

    fn finalize(&mut self, plan: &mut EffectPlan) -> Result<()> {
        let bonus = self.config.scale_damage_bonus_percent;
        if bonus == 0 || plan.damage_orders.is_empty() {
            return Ok(());
        }
        let team = self.roster.require(plan.caster())?.team();
        let points = self.scale_points(team).total();
        if points == 0 {
            return Ok(());
        }

        let percent = 100 + i64::from(bonus) * i64::from(points);
        let finalized: Vec<DamageOrder> = plan
            .damage_orders
            .iter()
            .map(|order| {
                if order.amount > 0 {
                    order.with_amount(order.amount * percent / 100)
                } else {
                    order.clone()
                }
            })
            .collect();
        tracing::trace!(percent, orders = finalized.len(), "scale bonus applied");
        plan.damage_orders = finalized;
        Ok(())
    }

    // === Stage 3 ===

    fn resolve_scale_orders(&mut self, plan: &EffectPlan) {
        let cap = self.config.scale_cap;
        for order in &plan.scale_orders {
            let scale = self.scales.entry(order.team).or_default();
            if !scale.apply(order.side, order.delta, cap) {
                continue;
            }
            let snapshot = *scale;
            tracing::debug!(team = %order.team, light = snapshot.light, shadow = snapshot.shadow, "scale changed");
            self.emit(CombatEvent::ScaleChanged {
                team: order.team,
                light: snapshot.light,
                shadow: snapshot.shadow,
            });
        }
    }

    // === Stage 4 ===

    fn resolve_resource_orders(&mut self, plan: &mut EffectPlan) -> Result<()> {
        let mut damage_results = Vec::with_capacity(plan.damage_orders.len());
        for order in &plan.damage_orders {
            damage_results.push(self.apply_damage(order)?);
        }
        plan.damage_results.extend(damage_results);

        let mut resource_results = Vec::with_capacity(plan.resource_orders.len());
        for order in &plan.resource_orders {
            resource_results.push(self.apply_resource_change(order)?);
        }
        plan.resource_results.extend(resource_results);
        Ok(())
    }

    fn apply_damage(&mut self, order: &DamageOrder) -> Result<CalculatedDamage> {
        let attacker_buffs: Buffs = self.roster.require(order.source)?.buffs().iter().cloned().collect();
        let resolver = ResourceChangeResolver::new(&self.config, &*self.elements, &self.strategies);
        let victim = self.roster.require_mut(order.target)?;
        let result = resolver.resolve_damage(order, &attacker_buffs, victim);

        tracing::trace!(
            combatant = %order.target,
            amount = order.amount,
            raw = result.raw_amount,
            unmitigated = result.unmitigated_amount,
            applied = result.final_amount,
            "damage resolved"
        );
        if result.cracked {
            tracing::debug!(combatant = %order.target, "secondary pool cracked");
        }

        self.emit(CombatEvent::DamageResolved(result.clone()));
        if result.shield_broken {
            self.emit(CombatEvent::BuffRemoved {
                target: order.target,
                kind: BuffKind::Shield,
            });
        }
        if result.killed {
            self.on_death(order.target)?;
        }
        Ok(result)
    }

    fn apply_resource_change(&mut self, order: &ResourceChangeOrder) -> Result<ResourceChangeResult> {
        let source_buffs: Buffs = match order.source {
            Some(source) => self.roster.require(source)?.buffs().iter().cloned().collect(),
            None => SmallVec::new(),
        };
        let resolver = ResourceChangeResolver::new(&self.config, &*self.elements, &self.strategies);
        let target = self.roster.require_mut(order.target)?;
        let result = resolver.resolve_resource_change(order, &source_buffs, target);

        tracing::trace!(
            combatant = %order.target,
            resource = ?order.resource,
            amount = order.amount,
            applied = result.applied,
            "resource changed"
        );
        self.emit(CombatEvent::ResourceChanged(result.clone()));
        if result.killed {
            self.on_death(order.target)?;
        }
        Ok(result)
    }

    fn on_death(&mut self, id: CombatantId) -> Result<()> {
        let model = self.roster.require_mut(id)?;
        let released = model.position();
        model.set_position(None);
        if let Some(position) = released {
            self.positions.release_position(position);
        }
        tracing::debug!(combatant = %id, "died");
        self.emit(CombatEvent::CharacterDied { combatant: id });
        Ok(())
    }

    // === Stage 5 ===

    fn queue_damage_reactions(&mut self, plan: &mut EffectPlan) -> Result<()> {
        if plan.effect().is(AbilityId::RETALIATION) {
            return Ok(());
        }
        let hits: SmallVec<[(CombatantId, CombatantId); 4]> = plan
            .damage_results
            .iter()
            .filter(|r| r.dealt_damage() && r.source != r.target)
            .map(|r| (r.target, r.source))
            .collect();

        for (victim_id, attacker_id) in hits {
            if self.roster.require(attacker_id)?.is_dead() {
                continue;
            }
            if self.roster.require(victim_id)?.is_dead() {
                continue;
            }
            let Some(trigger) = self.spend_charge(victim_id, BuffKind::Retaliation)? else {
                continue;
            };
            let child = self.build_plan(AbilityId::RETALIATION, victim_id, attacker_id, Some(&trigger))?;
            plan.push_child(child);
        }
        Ok(())
    }

    /// Spend one charge of a reactive buff and return a copy of it as it
    /// was before spending. The buff is removed when its charges run out.
    fn spend_charge(&mut self, bearer: CombatantId, kind: BuffKind) -> Result<Option<Buff>> {
        let model = self.roster.require_mut(bearer)?;
        let Some(buff) = model.buff_mut(kind) else {
            return Ok(None);
        };
        let trigger = buff.clone();
        if buff.consume_charge() {
            model.remove_buff(kind);
            self.emit(CombatEvent::BuffRemoved { target: bearer, kind });
        }
        Ok(Some(trigger))
    }

    // === Stage 6 ===

    fn resolve_buff_orders(&mut self, plan: &EffectPlan) -> Result<()> {
        for removal in &plan.buff_removals {
            let target = self.roster.require_mut(removal.target)?;
            let removed: Vec<Buff> = match removal.filter {
                RemovalFilter::Kind(kind) => target.remove_buff(kind).into_iter().collect(),
                RemovalFilter::Debuffs => target.remove_buffs_where(|b| b.is_debuff),
            };
            for buff in removed {
                self.emit(CombatEvent::BuffRemoved {
                    target: removal.target,
                    kind: buff.kind,
                });
            }
        }

        for order in &plan.buff_orders {
            let id = order.buff.target;
            let target = self.roster.require_mut(id)?;
            if target.is_dead() {
                tracing::debug!(combatant = %id, kind = ?order.buff.kind, "buff on dead target dropped");
                continue;
            }
            let replaced = target.add_buff(order.buff.clone()).is_some();
            self.emit(CombatEvent::BuffAdded {
                target: id,
                kind: order.buff.kind,
                replaced,
            });
        }
        Ok(())
    }

    // === Stage 7 ===

    fn resolve_revive_orders(&mut self, plan: &EffectPlan) -> Result<()> {
        for order in &plan.revive_orders {
            self.revive(order.target, order.health_percent)?;
        }
        Ok(())
    }

    /// Dead -> alive. No-op on the living or when the side is full.
    fn revive(&mut self, id: CombatantId, health_percent: u32) -> Result<bool> {
        let model = self.roster.require(id)?;
        if model.is_alive() {
            return Ok(false);
        }
        let Some(position) = self.positions.next_free_position(model.team()) else {
            tracing::debug!(combatant = %id, "no free position, revive dropped");
            return Ok(false);
        };

        let model = self.roster.require_mut(id)?;
        model.revive(health_percent, position);
        let health = model.health();
        if self.turns.push_back(id) {
            self.notify_turn_order();
        }
        tracing::debug!(combatant = %id, health, "revived");
        self.emit(CombatEvent::CharacterRevived { combatant: id, health });
        Ok(true)
    }

    // === Stage 8 ===

    fn resolve_summon_orders(&mut self, plan: &EffectPlan) -> Result<()> {
        for order in &plan.summon_orders {
            self.spawn(&order.config_ref, order.team)?;
        }
        Ok(())
    }

    // === Stage 9 ===

    fn queue_death_reactions(&mut self, plan: &mut EffectPlan) -> Result<()> {
        let mut seen: SmallVec<[CombatantId; 8]> = SmallVec::new();
        let targets: SmallVec<[CombatantId; 8]> = plan
            .damage_results
            .iter()
            .map(|r| r.target)
            .chain(plan.resource_results.iter().map(|r| r.target))
            .collect();

        for id in targets {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);

            let model = self.roster.require_mut(id)?;
            if model.is_alive() {
                continue;
            }
            let explode = model.remove_buff(BuffKind::ExplodeOnDeath);
            let revive = model.remove_buff(BuffKind::ReviveOnDeath);

            for (buff, ability) in [
                (explode, AbilityId::DEATH_EXPLOSION),
                (revive, AbilityId::DEATH_REVIVE),
            ] {
                let Some(buff) = buff else { continue };
                self.emit(CombatEvent::BuffRemoved {
                    target: id,
                    kind: buff.kind,
                });
                let child = self.build_plan(ability, id, id, Some(&buff))?;
                plan.push_child(child);
            }
        }
        Ok(())
    }

    // === Stage 10 ===

    fn queue_team_reactions(&mut self, plan: &mut EffectPlan) -> Result<()> {
        self.queue_passive_revives(plan)?;
        self.queue_team_retaliation(plan)
    }

    /// Every living combatant holding an unused revive passive brings back
    /// one dead teammate. Combatants killed by this plan go first, then the
    /// rest of the fallen in roster order. Anyone with a death revive
    /// already queued is skipped.
    fn queue_passive_revives(&mut self, plan: &mut EffectPlan) -> Result<()> {
        let holders: SmallVec<[(CombatantId, TeamId); 4]> = self
            .roster
            .iter()
            .filter(|m| {
                m.is_alive()
                    && m.wave_counter(MechanicKey::PASSIVE_REVIVE) == 0
                    && m
                        .config()
                        .passives
                        .iter()
                        .any(|p| matches!(p, Passive::ReviveAlly { .. }))
            })
            .map(|m| (m.id(), m.team()))
            .collect();
        if holders.is_empty() {
            return Ok(());
        }

        let killed_here: SmallVec<[CombatantId; 4]> = plan
            .damage_results
            .iter()
            .filter(|r| r.killed)
            .map(|r| r.target)
            .chain(plan.resource_results.iter().filter(|r| r.killed).map(|r| r.target))
            .collect();
        let mut claimed: SmallVec<[CombatantId; 4]> = plan
            .children
            .iter()
            .filter(|c| c.effect().is(AbilityId::DEATH_REVIVE))
            .map(EffectPlan::target)
            .collect();

        for (holder, team) in holders {
            let fallen: SmallVec<[CombatantId; 8]> = self.roster.defeated_in(team).map(|m| m.id()).collect();
            let pick = killed_here
                .iter()
                .copied()
                .filter(|id| fallen.contains(id))
                .chain(fallen.iter().copied())
                .find(|id| !claimed.contains(id));
            let Some(dead_id) = pick else { continue };

            claimed.push(dead_id);
            self.roster
                .require_mut(holder)?
                .increment_wave_counter(MechanicKey::PASSIVE_REVIVE);
            tracing::debug!(%holder, combatant = %dead_id, "passive revive queued");
            let child = self.build_plan(AbilityId::PASSIVE_REVIVE, holder, dead_id, None)?;
            plan.push_child(child);
        }
        Ok(())
    }

    /// Teammates of a hit combatant carrying team retaliation strike the
    /// attacker, once per bearer and attacker within one plan.
    fn queue_team_retaliation(&mut self, plan: &mut EffectPlan) -> Result<()> {
        let effect = plan.effect();
        if effect.is(AbilityId::TEAM_RETALIATION)
            || (self.config.team_retaliation_ignores_basic_attacks && effect.is(AbilityId::BASIC_ATTACK))
        {
            return Ok(());
        }

        let hits: SmallVec<[(CombatantId, CombatantId); 4]> = plan
            .damage_results
            .iter()
            .filter(|r| r.dealt_damage() && r.source != r.target)
            .map(|r| (r.target, r.source))
            .collect();
        let mut scheduled: SmallVec<[(CombatantId, CombatantId); 4]> = SmallVec::new();

        for (victim_id, attacker_id) in hits {
            let victim_team = self.roster.require(victim_id)?.team();
            let attacker = self.roster.require(attacker_id)?;
            if attacker.is_dead() {
                continue;
            }
            let attacker_team = attacker.team();
            let bearers: SmallVec<[CombatantId; 4]> = self
                .roster
                .alive_in(victim_team)
                .filter(|m| m.id() != victim_id && m.team() != attacker_team && m.has_buff(BuffKind::TeamRetaliation))
                .map(|m| m.id())
                .collect();

            for bearer in bearers {
                if scheduled.contains(&(bearer, attacker_id)) {
                    continue;
                }
                scheduled.push((bearer, attacker_id));
                let Some(trigger) = self.spend_charge(bearer, BuffKind::TeamRetaliation)? else {
                    continue;
                };
                let child = self.build_plan(AbilityId::TEAM_RETALIATION, bearer, attacker_id, Some(&trigger))?;
                plan.push_child(child);
            }
        }
        Ok(())
    }
}
