//! Core engine types: identifiers, RNG, configuration, errors.
//!
//! Everything here is leaf-level: no module in `core` depends on the
//! combatant model or the resolution pipeline (apart from the ability id
//! carried by `CombatError`).

pub mod entity;
pub mod rng;
pub mod config;
pub mod error;

pub use entity::{ClassTag, CombatantId, ConfigRef, PositionToken, TeamId};
pub use rng::{FixedRandom, GameRng, GameRngState, RandomService};
pub use config::CombatConfig;
pub use error::{CombatError, Result};
