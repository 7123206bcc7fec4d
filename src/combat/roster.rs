//! The set of combatants in a fight.

use crate::combatant::CombatantModel;
use crate::core::{CombatError, CombatantId, Result, TeamId};

/// Every combatant, living or dead, in insertion order.
///
/// Dead combatants stay so they can be revived and targeted by
/// dead-only scopes.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    members: Vec<CombatantModel>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a combatant. Ids must be unique.
    pub fn insert(&mut self, model: CombatantModel) -> Result<CombatantId> {
        let id = model.id();
        if self.contains(id) {
            return Err(CombatError::DuplicateCombatant(id));
        }
        self.members.push(model);
        Ok(id)
    }

    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.members.iter().any(|m| m.id() == id)
    }

    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&CombatantModel> {
        self.members.iter().find(|m| m.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: CombatantId) -> Option<&mut CombatantModel> {
        self.members.iter_mut().find(|m| m.id() == id)
    }

    /// Like [`Roster::get`], but a missing id is an error.
    pub fn require(&self, id: CombatantId) -> Result<&CombatantModel> {
        self.get(id).ok_or(CombatError::UnknownCombatant(id))
    }

    pub(crate) fn require_mut(&mut self, id: CombatantId) -> Result<&mut CombatantModel> {
        self.get_mut(id).ok_or(CombatError::UnknownCombatant(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatantModel> {
        self.members.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut CombatantModel> {
        self.members.iter_mut()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CombatantModel] {
        &self.members
    }

    /// Living members of `team`.
    pub fn alive_in(&self, team: TeamId) -> impl Iterator<Item = &CombatantModel> {
        self.members.iter().filter(move |m| m.team() == team && m.is_alive())
    }

    /// Dead members of `team`.
    pub fn defeated_in(&self, team: TeamId) -> impl Iterator<Item = &CombatantModel> {
        self.members.iter().filter(move |m| m.team() == team && m.is_dead())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::combatant::CombatantConfig;

    fn unit(id: u32, team: TeamId) -> CombatantModel {
        CombatantModel::new(CombatantId(id), team, Arc::new(CombatantConfig::new("unit", 10)))
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut roster = Roster::new();
        roster.insert(unit(1, TeamId::PLAYER)).unwrap();
        assert_eq!(
            roster.insert(unit(1, TeamId::ENEMY)),
            Err(CombatError::DuplicateCombatant(CombatantId(1)))
        );
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_alive_and_defeated() {
        let mut roster = Roster::new();
        roster.insert(unit(1, TeamId::PLAYER)).unwrap();
        roster.insert(unit(2, TeamId::PLAYER)).unwrap();
        roster.insert(unit(3, TeamId::ENEMY)).unwrap();
        roster.get_mut(CombatantId(2)).unwrap().die();

        let alive: Vec<_> = roster.alive_in(TeamId::PLAYER).map(CombatantModel::id).collect();
        let dead: Vec<_> = roster.defeated_in(TeamId::PLAYER).map(CombatantModel::id).collect();
        assert_eq!(alive, vec![CombatantId(1)]);
        assert_eq!(dead, vec![CombatantId(2)]);
        assert!(roster.require(CombatantId(9)).is_err());
    }
}
