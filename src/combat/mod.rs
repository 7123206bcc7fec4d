//! The fight itself: roster, turn order, scales and plan resolution.
//!
//! [`CombatState`] owns every combatant once placed and is the only thing
//! that mutates them. Abilities produce plans against a read-only view;
//! [`CombatState::resolve_plan`] applies a plan and its cascade.
//!
//! ## Example
//!
//! ```
//! use rust_combat::abilities::AbilityId;
//! use rust_combat::combat::{CombatState, ConfigSpawner, SlotGrid};
//! use rust_combat::combatant::{CombatantConfig, CombatantModel, Element};
//! use rust_combat::core::{CombatConfig, CombatantId, FixedRandom, TeamId};
//! use std::sync::Arc;
//!
//! let mut combat = CombatState::new(CombatConfig::default(), FixedRandom::always(), SlotGrid::new(4), ConfigSpawner::new());
//! let hero = CombatantConfig::new("hero", 30).with_attack(10, Element::Neutral);
//! let slime = CombatantConfig::new("slime", 25);
//! combat.add_combatant(CombatantModel::new(CombatantId(1), TeamId::PLAYER, Arc::new(hero))).unwrap();
//! combat.add_combatant(CombatantModel::new(CombatantId(2), TeamId::ENEMY, Arc::new(slime))).unwrap();
//!
//! combat.execute_selected_ability(AbilityId::BASIC_ATTACK, CombatantId(1), CombatantId(2)).unwrap();
//! assert_eq!(combat.combatant(CombatantId(2)).unwrap().health(), 15);
//! ```

mod providers;
mod resolve;
mod roster;
mod scale;
mod state;
mod turn;

pub use providers::{ConfigSpawner, PositionProvider, SlotGrid, SpawnProvider};
pub use roster::Roster;
pub use scale::ScalePoints;
pub use state::CombatState;
pub use turn::TurnQueue;
