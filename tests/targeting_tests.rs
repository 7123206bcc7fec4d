//! Targeting integration tests.
//!
//! Properties of the scope table over randomly built rosters, plus the
//! scope checks `CombatState` exposes.

mod common;

use std::sync::Arc;

use proptest::prelude::*;
use rust_combat::abilities::{AbilityId, ReviveAlly};
use rust_combat::combatant::{CombatantConfig, CombatantModel, Element};
use rust_combat::core::{CombatantId, TeamId};
use rust_combat::effects::{TargetFilter, TargetScope};

use common::{id, Arena};

/// (team is player, is dead) per combatant, ids from 1.
fn roster_from(units: &[(bool, bool)]) -> Vec<CombatantModel> {
    let mut combat_roster = Arena::new();
    for (i, (player, _)) in units.iter().enumerate() {
        let config = CombatantConfig::new("unit", 10).with_attack(100, Element::Neutral);
        combat_roster = if *player {
            combat_roster.player(i as u32 + 1, config)
        } else {
            combat_roster.enemy(i as u32 + 1, config)
        };
    }
    let (mut combat, _log) = combat_roster.slots(16).build();

    // A neutral executioner outside both teams kills the marked ones
    let executioner = CombatantModel::new(
        CombatantId(999),
        TeamId::new(7),
        Arc::new(CombatantConfig::new("executioner", 10).with_attack(100, Element::Neutral)),
    );
    combat.add_combatant(executioner).unwrap();
    for (i, (_, dead)) in units.iter().enumerate() {
        if *dead {
            combat
                .execute_selected_ability(AbilityId::BASIC_ATTACK, CombatantId(999), id(i as u32 + 1))
                .unwrap();
        }
    }
    combat
        .roster()
        .iter()
        .filter(|c| c.id() != CombatantId(999))
        .cloned()
        .collect()
}

fn sorted(mut ids: Vec<CombatantId>) -> Vec<CombatantId> {
    ids.sort();
    ids
}

proptest! {
    /// `AnyAtAll` admits everybody, `None` nobody.
    #[test]
    fn prop_extreme_scopes(units in proptest::collection::vec(any::<(bool, bool)>(), 1..8), pick in 0usize..8) {
        let roster = roster_from(&units);
        let reference = &roster[pick % roster.len()];

        let all = TargetFilter::filter_by_scope(&roster, reference, TargetScope::AnyAtAll);
        prop_assert_eq!(all, roster.iter().map(CombatantModel::id).collect::<Vec<_>>());
        prop_assert!(TargetFilter::filter_by_scope(&roster, reference, TargetScope::None).is_empty());
    }

    /// Alive and dead partition the roster; so do friends and enemies.
    #[test]
    fn prop_scopes_partition(units in proptest::collection::vec(any::<(bool, bool)>(), 1..8), pick in 0usize..8) {
        let roster = roster_from(&units);
        let reference = &roster[pick % roster.len()];
        let filter = |scope| TargetFilter::filter_by_scope(&roster, reference, scope);

        let mut both = filter(TargetScope::AnyAlive);
        both.extend(filter(TargetScope::AnyDead));
        prop_assert_eq!(sorted(both), sorted(filter(TargetScope::AnyAtAll)));

        let enemies = filter(TargetScope::Enemy);
        for friend in filter(TargetScope::FriendlyOrSelf) {
            prop_assert!(!enemies.contains(&friend));
        }
        prop_assert!(!filter(TargetScope::AnyOtherAlly).contains(&reference.id()));
        for id in filter(TargetScope::DeadFriendly).into_iter().chain(filter(TargetScope::DeadEnemy)) {
            prop_assert!(roster.iter().any(|c| c.id() == id && c.is_dead()));
        }
    }
}

/// Eligible targets follow the ability's scope.
#[test]
fn test_eligible_targets_follow_scope() {
    let (mut combat, _log) = Arena::new()
        .player(1, CombatantConfig::new("priest", 10))
        .player(2, CombatantConfig::new("squire", 10))
        .enemy(3, CombatantConfig::new("ogre", 10).with_attack(50, Element::Neutral))
        .enemy(4, CombatantConfig::new("goblin", 10))
        .build();
    combat.abilities_mut().register(ReviveAlly::new(AbilityId(1000)));

    assert_eq!(
        combat.eligible_targets(AbilityId::BASIC_ATTACK, id(1)).unwrap(),
        vec![id(3), id(4)]
    );
    assert!(combat.eligible_targets(AbilityId(1000), id(1)).unwrap().is_empty());

    combat
        .execute_selected_ability(AbilityId::BASIC_ATTACK, id(3), id(2))
        .unwrap();
    assert_eq!(combat.eligible_targets(AbilityId(1000), id(1)).unwrap(), vec![id(2)]);
    assert!(combat.eligible_targets(AbilityId(77), id(1)).is_err());
}
