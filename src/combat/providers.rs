//! Position and spawn providers.
//!
//! The engine never decides where a combatant stands or how a
//! configuration becomes a combatant. It asks a [`PositionProvider`] and a
//! [`SpawnProvider`]. [`SlotGrid`] and [`ConfigSpawner`] are simple
//! implementations good enough for tests and small games.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::combatant::{CombatantConfig, CombatantModel};
use crate::core::{CombatError, CombatantId, ConfigRef, PositionToken, Result, TeamId};

/// Hands out and takes back battlefield positions.
pub trait PositionProvider {
    /// Claim the next free position for `team`, or `None` if the team's
    /// side is full.
    fn next_free_position(&mut self, team: TeamId) -> Option<PositionToken>;

    /// Mark a specific position as taken. Returns `false` if it already was.
    fn claim_position(&mut self, _position: PositionToken) -> bool {
        true
    }

    /// Give a position back (on death).
    fn release_position(&mut self, _position: PositionToken) {}

    /// Distance used by area effects.
    fn distance(&self, a: PositionToken, b: PositionToken) -> u32;
}

/// Builds combatants from configuration references.
pub trait SpawnProvider {
    fn instantiate_from_config(&mut self, config_ref: &ConfigRef, id: CombatantId, team: TeamId)
        -> Result<CombatantModel>;
}

/// A row of numbered slots per team.
///
/// Distance within a team is the slot difference; across teams one more.
#[derive(Clone, Debug)]
pub struct SlotGrid {
    slots_per_team: u8,
    occupied: FxHashSet<PositionToken>,
}

impl SlotGrid {
    pub fn new(slots_per_team: u8) -> Self {
        Self {
            slots_per_team,
            occupied: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn is_occupied(&self, position: PositionToken) -> bool {
        self.occupied.contains(&position)
    }

    #[must_use]
    pub fn occupied_count(&self, team: TeamId) -> usize {
        self.occupied.iter().filter(|p| p.team == team).count()
    }
}

impl PositionProvider for SlotGrid {
    fn next_free_position(&mut self, team: TeamId) -> Option<PositionToken> {
        let free = (0..self.slots_per_team)
            .map(|slot| PositionToken::new(team, slot))
            .find(|p| !self.occupied.contains(p))?;
        self.occupied.insert(free);
        Some(free)
    }

    fn claim_position(&mut self, position: PositionToken) -> bool {
        self.occupied.insert(position)
    }

    fn release_position(&mut self, position: PositionToken) {
        self.occupied.remove(&position);
    }

    fn distance(&self, a: PositionToken, b: PositionToken) -> u32 {
        let across = u32::from(a.team != b.team);
        u32::from(a.slot.abs_diff(b.slot)) + across
    }
}

/// Spawns combatants from a table of registered configurations.
#[derive(Clone, Debug, Default)]
pub struct ConfigSpawner {
    configs: FxHashMap<ConfigRef, Arc<CombatantConfig>>,
}

impl ConfigSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configuration under its own `config_ref`.
    pub fn register(&mut self, config: CombatantConfig) -> Arc<CombatantConfig> {
        let config = Arc::new(config);
        self.configs.insert(config.config_ref.clone(), Arc::clone(&config));
        config
    }

    /// Register a configuration (builder pattern).
    #[must_use]
    pub fn with(mut self, config: CombatantConfig) -> Self {
        self.register(config);
        self
    }

    #[must_use]
    pub fn get(&self, config_ref: &ConfigRef) -> Option<&Arc<CombatantConfig>> {
        self.configs.get(config_ref)
    }
}

impl SpawnProvider for ConfigSpawner {
    fn instantiate_from_config(
        &mut self,
        config_ref: &ConfigRef,
        id: CombatantId,
        team: TeamId,
    ) -> Result<CombatantModel> {
        let config = self
            .configs
            .get(config_ref)
            .ok_or_else(|| CombatError::MissingConfig(config_ref.clone()))?;
        Ok(CombatantModel::new(id, team, Arc::clone(config)))
    }
}
