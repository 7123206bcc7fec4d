//! Identifiers for everything the engine references by value.
//!
//! Combatants never hold references to each other. Buffs, orders and
//! results point at combatants through `CombatantId`, which the roster
//! resolves on demand. A dangling id is a fatal precondition, reported as
//! `CombatError::UnknownCombatant`.
//!
//! ```
//! use rust_combat::core::{CombatantId, TeamId};
//!
//! let hero = CombatantId::new(1);
//! assert_eq!(hero.raw(), 1);
//! assert_eq!(TeamId::PLAYER.opposing(), TeamId::ENEMY);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a combatant in the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// Create a new combatant ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for CombatantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Combatant({})", self.0)
    }
}

/// Team affiliation.
///
/// Two teams is the common case, but nothing in the engine assumes it:
/// allies share a `TeamId`, everyone else is an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    /// The human-controlled side.
    pub const PLAYER: TeamId = TeamId(0);
    /// The opposing side.
    pub const ENEMY: TeamId = TeamId(1);

    /// Create a new team ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// The other side of a two-team fight.
    ///
    /// Teams beyond the first two map onto `PLAYER`.
    #[must_use]
    pub const fn opposing(self) -> Self {
        if self.0 == 0 {
            Self::ENEMY
        } else {
            Self::PLAYER
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Team {}", self.0)
    }
}

/// Opaque battlefield position handed out by a `PositionProvider`.
///
/// The engine only compares tokens and asks the provider for distances;
/// it never interprets the slot number itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionToken {
    pub team: TeamId,
    pub slot: u8,
}

impl PositionToken {
    #[must_use]
    pub const fn new(team: TeamId, slot: u8) -> Self {
        Self { team, slot }
    }
}

/// Name of a `CombatantConfig` known to the spawn provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigRef(pub String);

impl ConfigRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConfigRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class tag (opaque to the engine, games assign meaning).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassTag(pub u16);

impl ClassTag {
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}
