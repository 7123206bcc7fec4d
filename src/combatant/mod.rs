//! Combatants and the things attached to them.
//!
//! - [`CombatantModel`]: runtime entity (resources, buffs, team, position)
//! - [`Buff`]: stateful modifier with aging and resource hooks
//! - [`ResourcePool`]: clamped `{current, min, max}` pool
//! - [`ElementInteractionRule`]: decides elemental resistance

mod buff;
mod element;
mod model;
mod resource;

pub use buff::{chain_incoming, chain_outgoing, AgingPhase, Buff, BuffKind, HookContext, Incapacitation};
pub use element::{Element, ElementInteractionRule, ElementWheel, NoResistance};
pub use model::{AttackStats, CombatantConfig, CombatantModel, DamageOutcome, MechanicKey, Passive};
pub use resource::{PoolConfig, ResourceKind, ResourcePool};
