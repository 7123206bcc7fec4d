//! Notification surface.
//!
//! The combat state emits a [`CombatEvent`] for every observable change
//! (damage, deaths, buffs, turn order, plan lifecycle). Presentation,
//! logging and AI layers subscribe a [`CombatListener`] to the
//! [`EventBus`] and react outside the engine.
//!
//! ## Example
//!
//! ```
//! use rust_combat::core::CombatantId;
//! use rust_combat::events::{CombatEvent, EventBus, EventLog};
//!
//! let log = EventLog::new();
//! let mut bus = EventBus::new();
//! bus.subscribe(log.clone());
//!
//! bus.emit(&CombatEvent::CharacterDied { combatant: CombatantId(7) });
//! assert_eq!(log.names(), vec!["character_died"]);
//! ```

mod bus;
mod event;

pub use bus::{CombatListener, EventBus, EventLog, ListenerId};
pub use event::CombatEvent;
