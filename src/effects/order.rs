//! Orders (intent) and results (outcome).
//!
//! An order is built once by an ability and never changed afterwards;
//! stages that need a different amount build a new order. Each resolved
//! damage or resource order produces exactly one result.

use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;
use crate::combatant::{Buff, BuffKind, Element, ResourceKind};
use crate::core::{CombatantId, ConfigRef, TeamId};

/// The ability an order or plan came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectRef {
    pub ability: AbilityId,
    /// `true` for abilities a combatant picks, `false` for internally
    /// generated reactions.
    pub selectable: bool,
}

impl EffectRef {
    #[must_use]
    pub const fn selected(ability: AbilityId) -> Self {
        Self { ability, selectable: true }
    }

    #[must_use]
    pub const fn reaction(ability: AbilityId) -> Self {
        Self { ability, selectable: false }
    }

    #[must_use]
    pub fn is(&self, ability: AbilityId) -> bool {
        self.ability == ability
    }
}

/// One side of a team's paired scale counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleSide {
    Light,
    Shadow,
}

/// Deal `amount` (negative heals) to `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOrder {
    pub source: CombatantId,
    pub target: CombatantId,
    pub amount: i64,
    pub element: Element,
    pub effect: EffectRef,
}

impl DamageOrder {
    /// Copy of this order with a different amount.
    #[must_use]
    pub fn with_amount(&self, amount: i64) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

/// Add `amount` to one of `target`'s pools.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChangeOrder {
    pub source: Option<CombatantId>,
    pub target: CombatantId,
    pub resource: ResourceKind,
    pub amount: i64,
    pub effect: EffectRef,
}

/// Attach a buff; the target is `buff.target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffOrder {
    pub buff: Buff,
    pub effect: EffectRef,
}

/// Which buffs a removal order strips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalFilter {
    /// A single kind (dispel).
    Kind(BuffKind),
    /// Every debuff (cleanse).
    Debuffs,
}

/// Strip buffs from `target` early.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffRemovalOrder {
    pub target: CombatantId,
    pub filter: RemovalFilter,
    pub effect: EffectRef,
}

/// Bring `target` back from the dead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviveOrder {
    pub source: CombatantId,
    pub target: CombatantId,
    pub health_percent: u32,
    pub effect: EffectRef,
}

/// Spawn a new combatant for `team` from a configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonOrder {
    pub source: CombatantId,
    pub team: TeamId,
    pub config_ref: ConfigRef,
    pub effect: EffectRef,
}

/// Shift one of a team's scale counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalePointOrder {
    pub team: TeamId,
    pub side: ScaleSide,
    pub delta: i8,
    pub effect: EffectRef,
}

/// Any pending order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Damage(DamageOrder),
    ResourceChange(ResourceChangeOrder),
    AddBuff(BuffOrder),
    RemoveBuffs(BuffRemovalOrder),
    Revive(ReviveOrder),
    Summon(SummonOrder),
    ScalePointChange(ScalePointOrder),
}

impl Order {
    /// The combatant this order acts on, if it acts on one.
    #[must_use]
    pub fn target(&self) -> Option<CombatantId> {
        match self {
            Order::Damage(o) => Some(o.target),
            Order::ResourceChange(o) => Some(o.target),
            Order::AddBuff(o) => Some(o.buff.target),
            Order::RemoveBuffs(o) => Some(o.target),
            Order::Revive(o) => Some(o.target),
            Order::Summon(_) | Order::ScalePointChange(_) => None,
        }
    }
}

/// Outcome of a damage order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedDamage {
    pub source: CombatantId,
    pub target: CombatantId,
    pub effect: EffectRef,
    pub element: Element,
    /// Amount on the order.
    pub original_amount: i64,
    /// After the attacker's outgoing hooks.
    pub raw_amount: i64,
    /// After mitigation and vulnerability.
    pub unmitigated_amount: i64,
    /// Amount sent to the primary pool (after stagger halving).
    pub final_amount: i64,
    /// Amount taken off the secondary pool.
    pub stagger_amount: i64,
    /// Portion of `final_amount` soaked by a shield.
    pub absorbed: i64,
    /// Change applied to health (negative = lost).
    pub health_change: i64,
    pub resisted: bool,
    /// The secondary pool went from above zero to zero or below.
    pub cracked: bool,
    pub shield_broken: bool,
    pub killed: bool,
}

impl CalculatedDamage {
    /// The target took nonzero damage. A hit soaked entirely by a shield
    /// deals none.
    #[must_use]
    pub fn dealt_damage(&self) -> bool {
        self.final_amount > self.absorbed
    }
}

/// Outcome of a generic resource order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChangeResult {
    pub source: Option<CombatantId>,
    pub target: CombatantId,
    pub effect: EffectRef,
    pub resource: ResourceKind,
    pub original_amount: i64,
    /// After outgoing and incoming hooks.
    pub final_amount: i64,
    /// Change the pool actually took.
    pub applied: i64,
    pub killed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn damage(amount: i64) -> DamageOrder {
        DamageOrder {
            source: CombatantId(1),
            target: CombatantId(2),
            amount,
            element: Element::Fire,
            effect: EffectRef::selected(AbilityId::BASIC_ATTACK),
        }
    }

    #[test]
    fn test_with_amount_keeps_everything_else() {
        let order = damage(10);
        let scaled = order.with_amount(12);
        assert_eq!(scaled.amount, 12);
        assert_eq!(scaled.target, order.target);
        assert_eq!(scaled.effect, order.effect);
        assert_eq!(order.amount, 10);
    }

    #[test]
    fn test_order_target() {
        assert_eq!(Order::Damage(damage(1)).target(), Some(CombatantId(2)));
        let summon = Order::Summon(SummonOrder {
            source: CombatantId(1),
            team: TeamId::PLAYER,
            config_ref: ConfigRef::new("imp"),
            effect: EffectRef::selected(AbilityId::new(50)),
        });
        assert_eq!(summon.target(), None);
    }

    #[test]
    fn test_effect_ref() {
        let r = EffectRef::reaction(AbilityId::RETALIATION);
        assert!(!r.selectable);
        assert!(r.is(AbilityId::RETALIATION));
        assert!(!r.is(AbilityId::BASIC_ATTACK));
    }

    #[test]
    fn test_shield_soaked_hit_deals_nothing() {
        let mut result = CalculatedDamage {
            source: CombatantId(1),
            target: CombatantId(2),
            effect: EffectRef::selected(AbilityId::BASIC_ATTACK),
            element: Element::Fire,
            original_amount: 4,
            raw_amount: 4,
            unmitigated_amount: 4,
            final_amount: 4,
            stagger_amount: 0,
            absorbed: 4,
            health_change: 0,
            resisted: false,
            cracked: false,
            shield_broken: false,
            killed: false,
        };
        assert!(!result.dealt_damage());

        result.absorbed = 1;
        result.health_change = -3;
        assert!(result.dealt_damage());
    }

    #[test]
    fn test_order_serialization() {
        let order = Order::Damage(damage(7));
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
