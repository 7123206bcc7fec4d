//! Error types.
//!
//! Only fatal preconditions are errors. Expected outcomes such as an empty
//! target list, a summon with no free slot or removing a buff that isn't
//! there are silent no-ops and never reach this type.

use thiserror::Error;

use super::entity::{CombatantId, ConfigRef};
use crate::abilities::AbilityId;

/// Fatal combat engine errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("combatant not found in roster: {0}")]
    UnknownCombatant(CombatantId),

    #[error("combatant already in roster: {0}")]
    DuplicateCombatant(CombatantId),

    #[error("ability not registered: {0}")]
    UnknownAbility(AbilityId),

    #[error("no combatant configuration named '{0}'")]
    MissingConfig(ConfigRef),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CombatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CombatError::UnknownCombatant(CombatantId(3)).to_string(),
            "combatant not found in roster: Combatant(3)"
        );
        assert_eq!(
            CombatError::MissingConfig(ConfigRef::new("wisp")).to_string(),
            "no combatant configuration named 'wisp'"
        );
    }
}
