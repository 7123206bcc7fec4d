//! Target eligibility.
//!
//! A [`TargetScope`] names a set of five gates ([`ScopeGates`]). A
//! candidate passes when its life state passes the dead/alive gate and
//! its relation to the reference passes the self/ally/enemy gate.
//!
//! "Ally" is relative to the reference's *effective* team: a charmed
//! reference sees its own team as enemies and the opposing team as
//! allies.
//!
//! | scope            | dead | alive | self | allies | enemies |
//! |------------------|------|-------|------|--------|---------|
//! | `None`           |      |       |      |        |         |
//! | `Enemy`          |      |   x   |      |        |    x    |
//! | `FriendlyOrSelf` |      |   x   |  x   |   x    |         |
//! | `AnyOtherAlly`   |      |   x   |      |   x    |         |
//! | `DeadFriendly`   |  x   |       |  x   |   x    |         |
//! | `DeadEnemy`      |  x   |       |      |        |    x    |
//! | `AnyAlive`       |      |   x   |  x   |   x    |    x    |
//! | `AnyDead`        |  x   |       |  x   |   x    |    x    |
//! | `AnyAtAll`       |  x   |   x   |  x   |   x    |    x    |

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantModel;
use crate::core::{CombatantId, PositionToken, RandomService};

/// Which combatants an ability may target, relative to its caster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetScope {
    None,
    Enemy,
    FriendlyOrSelf,
    AnyOtherAlly,
    DeadFriendly,
    DeadEnemy,
    AnyAlive,
    AnyDead,
    AnyAtAll,
}

/// The five inclusion gates behind a scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScopeGates {
    pub include_dead: bool,
    pub include_alive: bool,
    pub include_self: bool,
    pub include_allies: bool,
    pub include_enemies: bool,
}

impl TargetScope {
    /// Every scope, in declaration order.
    pub const ALL: [TargetScope; 9] = [
        TargetScope::None,
        TargetScope::Enemy,
        TargetScope::FriendlyOrSelf,
        TargetScope::AnyOtherAlly,
        TargetScope::DeadFriendly,
        TargetScope::DeadEnemy,
        TargetScope::AnyAlive,
        TargetScope::AnyDead,
        TargetScope::AnyAtAll,
    ];

    #[must_use]
    pub const fn gates(self) -> ScopeGates {
        const fn g(dead: bool, alive: bool, own: bool, allies: bool, enemies: bool) -> ScopeGates {
            ScopeGates {
                include_dead: dead,
                include_alive: alive,
                include_self: own,
                include_allies: allies,
                include_enemies: enemies,
            }
        }
        match self {
            TargetScope::None => g(false, false, false, false, false),
            TargetScope::Enemy => g(false, true, false, false, true),
            TargetScope::FriendlyOrSelf => g(false, true, true, true, false),
            TargetScope::AnyOtherAlly => g(false, true, false, true, false),
            TargetScope::DeadFriendly => g(true, false, true, true, false),
            TargetScope::DeadEnemy => g(true, false, false, false, true),
            TargetScope::AnyAlive => g(false, true, true, true, true),
            TargetScope::AnyDead => g(true, false, true, true, true),
            TargetScope::AnyAtAll => g(true, true, true, true, true),
        }
    }
}

impl ScopeGates {
    /// Does `candidate` pass these gates relative to `reference`?
    #[must_use]
    pub fn admits(&self, reference: &CombatantModel, candidate: &CombatantModel) -> bool {
        let life = if candidate.is_dead() {
            self.include_dead
        } else {
            self.include_alive
        };
        let relation = if candidate.id() == reference.id() {
            self.include_self
        } else if is_ally(reference, candidate) {
            self.include_allies
        } else {
            self.include_enemies
        };
        life && relation
    }
}

/// Same effective team as `reference` (charm flips the comparison).
#[must_use]
pub fn is_ally(reference: &CombatantModel, candidate: &CombatantModel) -> bool {
    (candidate.team() == reference.team()) != reference.is_charmed()
}

/// Scope-based filters over a roster slice.
pub struct TargetFilter;

impl TargetFilter {
    #[must_use]
    pub fn is_valid_target(reference: &CombatantModel, candidate: &CombatantModel, scope: TargetScope) -> bool {
        scope.gates().admits(reference, candidate)
    }

    /// Every combatant in `roster` that `scope` admits, in roster order.
    #[must_use]
    pub fn filter_by_scope(
        roster: &[CombatantModel],
        reference: &CombatantModel,
        scope: TargetScope,
    ) -> Vec<CombatantId> {
        let gates = scope.gates();
        roster
            .iter()
            .filter(|c| gates.admits(reference, c))
            .map(CombatantModel::id)
            .collect()
    }

    /// One admitted combatant chosen uniformly, or `None` if nobody passes.
    pub fn random_by_scope(
        roster: &[CombatantModel],
        reference: &CombatantModel,
        scope: TargetScope,
        rng: &mut dyn RandomService,
    ) -> Option<CombatantId> {
        let candidates = Self::filter_by_scope(roster, reference, scope);
        if candidates.is_empty() {
            return None;
        }
        let last = candidates.len() as i64 - 1;
        let index = rng.int_range(0, last).clamp(0, last) as usize;
        Some(candidates[index])
    }

    /// Admitted combatants whose position lies within `radius` of `center`.
    /// Combatants without a position are skipped.
    pub fn within_distance(
        roster: &[CombatantModel],
        reference: &CombatantModel,
        scope: TargetScope,
        center: PositionToken,
        radius: u32,
        distance: impl Fn(PositionToken, PositionToken) -> u32,
    ) -> Vec<CombatantId> {
        let gates = scope.gates();
        roster
            .iter()
            .filter(|c| gates.admits(reference, c))
            .filter(|c| c.position().is_some_and(|p| distance(center, p) <= radius))
            .map(CombatantModel::id)
            .collect()
    }
}
