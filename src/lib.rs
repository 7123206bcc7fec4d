//! # rust-combat
//!
//! A deterministic, turn-based combat rule engine.
//!
//! ## Design Principles
//!
//! 1. **Plans, not mutations**: abilities never touch the fight. They read a
//!    snapshot and return an [`EffectPlan`] of orders; the combat state
//!    applies it.
//!
//! 2. **Fixed stage order**: every plan resolves through the same twelve
//!    stages. Reactions (retaliation, death triggers, team passives) become
//!    child plans that resolve depth-first after their parent.
//!
//! 3. **Injected collaborators**: randomness, positions, spawning and
//!    element rules are traits. Seed the RNG and a fight replays exactly.
//!
//! ## Modules
//!
//! - `core`: ids, RNG, configuration, errors
//! - `combatant`: combatant model, resources, buffs, elements
//! - `effects`: orders, results, effect plans, the resource resolver, targeting
//! - `abilities`: the `Ability` trait, built-in abilities and reactions
//! - `events`: notifications and the event bus
//! - `combat`: `CombatState`, turn order and plan resolution
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_combat::abilities::ApplyBuff;
//! use rust_combat::{
//!     AbilityId, Buff, BuffKind, CombatConfig, CombatState, CombatantConfig, CombatantId,
//!     CombatantModel, ConfigSpawner, Element, EventLog, FixedRandom, SlotGrid, TeamId,
//! };
//!
//! let thorns = AbilityId::FIRST_CUSTOM;
//! let mut combat = CombatState::new(CombatConfig::default(), FixedRandom::always(), SlotGrid::new(4), ConfigSpawner::new())
//!     .with_ability(ApplyBuff::new(
//!         thorns,
//!         "Thorns",
//!         Buff::new(BuffKind::Retaliation, CombatantId(0)).with_duration(3),
//!     ));
//! let log = EventLog::new();
//! combat.subscribe(log.clone());
//!
//! let knight = CombatantConfig::new("knight", 40).with_attack(8, Element::Neutral);
//! let bramble = CombatantConfig::new("bramble", 20).with_attack(5, Element::Neutral);
//! combat.add_combatant(CombatantModel::new(CombatantId(1), TeamId::PLAYER, Arc::new(knight))).unwrap();
//! combat.add_combatant(CombatantModel::new(CombatantId(2), TeamId::ENEMY, Arc::new(bramble))).unwrap();
//!
//! combat.execute_selected_ability(thorns, CombatantId(2), CombatantId(2)).unwrap();
//! let plan = combat.execute_selected_ability(AbilityId::BASIC_ATTACK, CombatantId(1), CombatantId(2)).unwrap();
//!
//! // The knight's hit queued one retaliation, which struck back for 5.
//! assert_eq!(plan.children().len(), 1);
//! assert_eq!(combat.combatant(CombatantId(2)).unwrap().health(), 12);
//! assert_eq!(combat.combatant(CombatantId(1)).unwrap().health(), 35);
//! assert_eq!(log.names().last(), Some(&"cascade_resolved"));
//! ```

pub mod core;
pub mod combatant;
pub mod effects;
pub mod abilities;
pub mod events;
pub mod combat;

// Re-export commonly used types
pub use crate::core::{
    CombatantId, TeamId, PositionToken, ConfigRef, ClassTag,
    GameRng, GameRngState, FixedRandom, RandomService,
    CombatConfig, CombatError, Result,
};

pub use crate::combatant::{
    CombatantModel, CombatantConfig, AttackStats, Passive,
    Buff, BuffKind, AgingPhase,
    ResourceKind, ResourcePool,
    Element, ElementInteractionRule, ElementWheel,
};

pub use crate::effects::{
    Order, DamageOrder, ResourceChangeOrder, CalculatedDamage, ResourceChangeResult,
    EffectPlan, EffectRef, ResourceChangeResolver, TargetFilter, TargetScope,
};

pub use crate::abilities::{Ability, AbilityCategory, AbilityContext, AbilityId, AbilityRegistry};

pub use crate::events::{CombatEvent, CombatListener, EventBus, EventLog};

pub use crate::combat::{CombatState, ConfigSpawner, PositionProvider, SlotGrid, SpawnProvider};
