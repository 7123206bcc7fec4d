//! Effect plans and their resolution primitives.
//!
//! - [`Order`]: immutable intent (damage, resource change, buff, revive,
//!   summon, scale shift)
//! - [`EffectPlan`]: orders grouped per kind, plus results and children
//! - [`ResourceChangeResolver`]: turns one order into one result
//! - [`TargetScope`] / [`TargetFilter`]: who an ability may target
//!
//! ## Design
//!
//! Orders carry ids, never references. A plan only describes what should
//! happen; the combat state walks it stage by stage and applies it. The
//! staged walk lives in `combat`, next to the roster it mutates.

mod order;
mod plan;
mod resolver;
mod targeting;

pub use order::{
    BuffOrder, BuffRemovalOrder, CalculatedDamage, DamageOrder, EffectRef, Order, RemovalFilter,
    ResourceChangeOrder, ResourceChangeResult, ReviveOrder, ScalePointOrder, ScaleSide, SummonOrder,
};
pub use plan::EffectPlan;
pub use resolver::{
    ClampAdd, HealthStrategy, ResourceChangeResolver, ResourceStrategy, StrategyOutcome, StrategyRegistry,
};
pub use targeting::{is_ally, ScopeGates, TargetFilter, TargetScope};
