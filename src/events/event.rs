//! Combat notification types.

use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;
use crate::combatant::BuffKind;
use crate::core::{CombatantId, PositionToken, TeamId};
use crate::effects::{CalculatedDamage, ResourceChangeResult};

/// Something observable that happened during resolution.
///
/// Events are emitted synchronously, in the order the state changed.
/// They carry ids and copies of results; listeners look state up through
/// the combat state afterwards if they need more.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    // === Plan lifecycle ===
    /// A plan is about to run its stages (after finalization).
    PlanExecutionStart {
        caster: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        depth: usize,
    },
    /// A plan finished its own stages; its children have not run yet.
    PlanExecutionComplete {
        caster: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        depth: usize,
    },
    /// A plan and every descendant have resolved.
    CascadeResolved {
        caster: CombatantId,
        ability: AbilityId,
        depth: usize,
        /// Plans in the cascade, including the root.
        plans: usize,
    },

    // === Resources ===
    DamageResolved(CalculatedDamage),
    ResourceChanged(ResourceChangeResult),

    // === Buffs ===
    BuffAdded {
        target: CombatantId,
        kind: BuffKind,
        /// An existing buff of the same kind was replaced.
        replaced: bool,
    },
    /// Remaining turns ran out during aging.
    BuffExpired { target: CombatantId, kind: BuffKind },
    /// Removed early (charges, cleanse, dispel, consumed by a reaction).
    BuffRemoved { target: CombatantId, kind: BuffKind },

    // === Life cycle ===
    CharacterDied { combatant: CombatantId },
    CharacterRevived { combatant: CombatantId, health: i64 },
    CharacterSummoned {
        combatant: CombatantId,
        team: TeamId,
        position: PositionToken,
    },

    // === Turn and team state ===
    TurnOrderChanged {
        current: Option<CombatantId>,
        order: Vec<CombatantId>,
    },
    ScaleChanged { team: TeamId, light: u8, shadow: u8 },
}

impl CombatEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            CombatEvent::PlanExecutionStart { .. } => "plan_start",
            CombatEvent::PlanExecutionComplete { .. } => "plan_complete",
            CombatEvent::CascadeResolved { .. } => "cascade_resolved",
            CombatEvent::DamageResolved(_) => "damage_resolved",
            CombatEvent::ResourceChanged(_) => "resource_changed",
            CombatEvent::BuffAdded { .. } => "buff_added",
            CombatEvent::BuffExpired { .. } => "buff_expired",
            CombatEvent::BuffRemoved { .. } => "buff_removed",
            CombatEvent::CharacterDied { .. } => "character_died",
            CombatEvent::CharacterRevived { .. } => "character_revived",
            CombatEvent::CharacterSummoned { .. } => "character_summoned",
            CombatEvent::TurnOrderChanged { .. } => "turn_order_changed",
            CombatEvent::ScaleChanged { .. } => "scale_changed",
        }
    }

    /// The combatant the event is mainly about, if there is one.
    #[must_use]
    pub fn subject(&self) -> Option<CombatantId> {
        match self {
            CombatEvent::PlanExecutionStart { caster, .. }
            | CombatEvent::PlanExecutionComplete { caster, .. }
            | CombatEvent::CascadeResolved { caster, .. } => Some(*caster),
            CombatEvent::DamageResolved(result) => Some(result.target),
            CombatEvent::ResourceChanged(result) => Some(result.target),
            CombatEvent::BuffAdded { target, .. }
            | CombatEvent::BuffExpired { target, .. }
            | CombatEvent::BuffRemoved { target, .. } => Some(*target),
            CombatEvent::CharacterDied { combatant }
            | CombatEvent::CharacterRevived { combatant, .. }
            | CombatEvent::CharacterSummoned { combatant, .. } => Some(*combatant),
            CombatEvent::TurnOrderChanged { current, .. } => *current,
            CombatEvent::ScaleChanged { .. } => None,
        }
    }
}
