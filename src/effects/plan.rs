//! Effect plans: the unit of resolution.
//!
//! An ability builds a plan holding pending orders, split per kind so the
//! resolver can run each kind in its own stage. During resolution the
//! plan collects results and child plans (triggered reactions). After the
//! pass it is a complete record of the cascade and can be logged or
//! serialized.

use serde::{Deserialize, Serialize};

use super::order::{
    BuffOrder, BuffRemovalOrder, CalculatedDamage, DamageOrder, EffectRef, Order, ResourceChangeOrder,
    ResourceChangeResult, ReviveOrder, ScalePointOrder, SummonOrder,
};
use crate::core::CombatantId;

/// Ordered container of pending orders, results and child plans.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectPlan {
    caster: CombatantId,
    target: CombatantId,
    effect: EffectRef,

    pub(crate) damage_orders: Vec<DamageOrder>,
    pub(crate) resource_orders: Vec<ResourceChangeOrder>,
    pub(crate) buff_orders: Vec<BuffOrder>,
    pub(crate) buff_removals: Vec<BuffRemovalOrder>,
    pub(crate) revive_orders: Vec<ReviveOrder>,
    pub(crate) summon_orders: Vec<SummonOrder>,
    pub(crate) scale_orders: Vec<ScalePointOrder>,

    pub(crate) damage_results: Vec<CalculatedDamage>,
    pub(crate) resource_results: Vec<ResourceChangeResult>,

    pub(crate) children: Vec<EffectPlan>,
}

impl EffectPlan {
    /// Create an empty plan.
    pub fn new(caster: CombatantId, target: CombatantId, effect: EffectRef) -> Self {
        Self {
            caster,
            target,
            effect,
            damage_orders: Vec::new(),
            resource_orders: Vec::new(),
            buff_orders: Vec::new(),
            buff_removals: Vec::new(),
            revive_orders: Vec::new(),
            summon_orders: Vec::new(),
            scale_orders: Vec::new(),
            damage_results: Vec::new(),
            resource_results: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Queue an order in the list for its kind.
    pub fn push(&mut self, order: Order) {
        match order {
            Order::Damage(o) => self.damage_orders.push(o),
            Order::ResourceChange(o) => self.resource_orders.push(o),
            Order::AddBuff(o) => self.buff_orders.push(o),
            Order::RemoveBuffs(o) => self.buff_removals.push(o),
            Order::Revive(o) => self.revive_orders.push(o),
            Order::Summon(o) => self.summon_orders.push(o),
            Order::ScalePointChange(o) => self.scale_orders.push(o),
        }
    }

    /// Queue an order (builder pattern).
    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.push(order);
        self
    }

    /// Append a child plan. Children resolve in append order after this
    /// plan's own stages.
    pub fn push_child(&mut self, child: EffectPlan) {
        self.children.push(child);
    }

    #[must_use]
    pub fn caster(&self) -> CombatantId {
        self.caster
    }

    #[must_use]
    pub fn target(&self) -> CombatantId {
        self.target
    }

    #[must_use]
    pub fn effect(&self) -> EffectRef {
        self.effect
    }

    #[must_use]
    pub fn damage_orders(&self) -> &[DamageOrder] {
        &self.damage_orders
    }

    #[must_use]
    pub fn resource_orders(&self) -> &[ResourceChangeOrder] {
        &self.resource_orders
    }

    #[must_use]
    pub fn buff_orders(&self) -> &[BuffOrder] {
        &self.buff_orders
    }

    #[must_use]
    pub fn buff_removals(&self) -> &[BuffRemovalOrder] {
        &self.buff_removals
    }

    #[must_use]
    pub fn revive_orders(&self) -> &[ReviveOrder] {
        &self.revive_orders
    }

    #[must_use]
    pub fn summon_orders(&self) -> &[SummonOrder] {
        &self.summon_orders
    }

    #[must_use]
    pub fn scale_orders(&self) -> &[ScalePointOrder] {
        &self.scale_orders
    }

    #[must_use]
    pub fn damage_results(&self) -> &[CalculatedDamage] {
        &self.damage_results
    }

    #[must_use]
    pub fn resource_results(&self) -> &[ResourceChangeResult] {
        &self.resource_results
    }

    #[must_use]
    pub fn children(&self) -> &[EffectPlan] {
        &self.children
    }

    /// Total pending orders across all kinds.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.damage_orders.len()
            + self.resource_orders.len()
            + self.buff_orders.len()
            + self.buff_removals.len()
            + self.revive_orders.len()
            + self.summon_orders.len()
            + self.scale_orders.len()
    }

    /// No pending orders (children not counted).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order_count() == 0
    }

    /// Number of plans in this cascade, including this one.
    #[must_use]
    pub fn cascade_size(&self) -> usize {
        1 + self.children.iter().map(EffectPlan::cascade_size).sum::<usize>()
    }

    /// Depth-first, pre-order walk over the cascade with each plan's depth.
    pub fn walk(&self, visit: &mut impl FnMut(&EffectPlan, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at(&self, depth: usize, visit: &mut impl FnMut(&EffectPlan, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }
}
