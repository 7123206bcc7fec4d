//! Buffs: stateful modifiers attached to a combatant.
//!
//! A buff is plain data plus one small behaviour per [`BuffKind`]. There is
//! no trait object per buff: the behaviour table is the `match` in each
//! hook, which keeps buffs `Clone + Serialize` and trivially comparable.
//!
//! ## Hooks
//!
//! Resource changes run through an ordered chain over the active buff
//! list. Each link is a pure `(context, amount) -> amount` function; kinds
//! without a hook return the amount unchanged.
//!
//! - **outgoing**: the source's buffs, applied to what it deals
//! - **incoming**: the target's buffs, applied to what it receives
//!
//! ```
//! use rust_combat::combatant::{Buff, BuffKind, HookContext, ResourceKind};
//! use rust_combat::core::CombatantId;
//!
//! let weak = Buff::new(BuffKind::Weakness, CombatantId(1)).with_duration(2);
//! let ctx = HookContext::damage();
//! assert_eq!(weak.modify_outgoing(&ctx, 11), 5);
//! assert_eq!(weak.modify_outgoing(&HookContext::resource(ResourceKind::Health), 11), 11);
//! ```

use serde::{Deserialize, Serialize};

use super::resource::ResourceKind;
use crate::core::CombatantId;

/// Concrete buff kind. A combatant carries at most one buff per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffKind {
    // === Outgoing modifiers ===
    /// Outgoing damage halved.
    Weakness,
    /// Outgoing damage doubled.
    Strengthen,
    /// Outgoing healing +50%.
    Focus,

    // === Incoming modifiers ===
    /// Incoming healing halved.
    Wither,
    /// Takes extra damage from non-resisted attacks.
    Vulnerability,
    /// Absorbs incoming health damage, one charge per point.
    Shield,

    // === Reactions ===
    /// Strikes back at whoever damages the bearer.
    Retaliation,
    /// Strikes back at whoever damages a teammate of the bearer.
    TeamRetaliation,
    /// Detonates against enemies when the bearer dies.
    ExplodeOnDeath,
    /// Brings the bearer back when it dies.
    ReviveOnDeath,

    // === Control ===
    /// Cannot act at all.
    Stun,
    /// Basic abilities only.
    Silence,
    /// Basic abilities only; allies and enemies are swapped for targeting.
    Charm,
    /// Basic abilities only.
    Taunt,

    // === Over time ===
    /// Restores `magnitude` health before each of the bearer's turns.
    Regeneration,
    /// Drains `magnitude` health before each of the bearer's turns.
    Poison,
}

/// How much a control buff restricts ability use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Incapacitation {
    None,
    /// Only the baseline category is available.
    Partial,
    /// No ability is available.
    Full,
}

impl BuffKind {
    /// Whether this kind counts as a debuff unless overridden.
    #[must_use]
    pub const fn is_debuff_by_default(self) -> bool {
        matches!(
            self,
            BuffKind::Weakness
                | BuffKind::Wither
                | BuffKind::Vulnerability
                | BuffKind::Stun
                | BuffKind::Silence
                | BuffKind::Charm
                | BuffKind::Taunt
                | BuffKind::Poison
        )
    }

    #[must_use]
    pub const fn incapacitation(self) -> Incapacitation {
        match self {
            BuffKind::Stun => Incapacitation::Full,
            BuffKind::Silence | BuffKind::Charm | BuffKind::Taunt => Incapacitation::Partial,
            _ => Incapacitation::None,
        }
    }
}

/// When a buff's remaining-turns counter ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingPhase {
    /// Start of the bearer's turn.
    TurnStart,
    /// End of the bearer's turn.
    #[default]
    TurnEnd,
    /// End of the current wave.
    WaveEnd,
}

/// What a hook is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookContext {
    pub resource: ResourceKind,
    /// The amount belongs to a damage order (positive = harm).
    pub is_damage: bool,
}

impl HookContext {
    #[must_use]
    pub const fn damage() -> Self {
        Self {
            resource: ResourceKind::Health,
            is_damage: true,
        }
    }

    #[must_use]
    pub const fn resource(resource: ResourceKind) -> Self {
        Self {
            resource,
            is_damage: false,
        }
    }

    const fn is_healing(&self, amount: i64) -> bool {
        !self.is_damage && matches!(self.resource, ResourceKind::Health) && amount > 0
    }
}

/// A buff attached to a combatant.
///
/// `source` and `target` are back-references by id; a buff never owns the
/// combatants it mentions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    pub kind: BuffKind,
    pub source: Option<CombatantId>,
    pub target: CombatantId,
    pub remaining_turns: u32,
    pub aging_phase: AgingPhase,
    /// Charges for charge-depleting buffs. `None` for everything else.
    pub charges: Option<u32>,
    pub is_debuff: bool,
    /// Per-tick amount for over-time kinds, revive percent for
    /// `ReviveOnDeath`, blast damage for `ExplodeOnDeath`.
    pub magnitude: i64,
}

impl Buff {
    /// Create a one-turn buff that ages at turn end.
    pub fn new(kind: BuffKind, target: CombatantId) -> Self {
        Self {
            kind,
            source: None,
            target,
            remaining_turns: 1,
            aging_phase: AgingPhase::default(),
            charges: None,
            is_debuff: kind.is_debuff_by_default(),
            magnitude: 0,
        }
    }

    /// Set the source combatant (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the duration in turns (builder pattern).
    #[must_use]
    pub fn with_duration(mut self, turns: u32) -> Self {
        self.remaining_turns = turns;
        self
    }

    /// Set the aging phase (builder pattern).
    #[must_use]
    pub fn aging_at(mut self, phase: AgingPhase) -> Self {
        self.aging_phase = phase;
        self
    }

    /// Make the buff charge-depleting (builder pattern).
    #[must_use]
    pub fn with_charges(mut self, charges: u32) -> Self {
        self.charges = Some(charges);
        self
    }

    /// Set the magnitude (builder pattern).
    #[must_use]
    pub fn with_magnitude(mut self, magnitude: i64) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Override the debuff flag (builder pattern).
    #[must_use]
    pub fn as_debuff(mut self, is_debuff: bool) -> Self {
        self.is_debuff = is_debuff;
        self
    }

    /// Retarget a copy of this buff (used when an ability applies a
    /// template to several combatants).
    #[must_use]
    pub fn for_target(&self, target: CombatantId) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// Outgoing hook, applied to amounts the bearer deals.
    #[must_use]
    pub fn modify_outgoing(&self, ctx: &HookContext, amount: i64) -> i64 {
        match self.kind {
            BuffKind::Weakness if ctx.is_damage && amount > 0 => amount / 2,
            BuffKind::Strengthen if ctx.is_damage && amount > 0 => amount.saturating_mul(2),
            BuffKind::Focus if ctx.is_healing(amount) => amount.saturating_mul(3) / 2,
            _ => amount,
        }
    }

    /// Incoming hook, applied to amounts the bearer receives.
    #[must_use]
    pub fn modify_incoming(&self, ctx: &HookContext, amount: i64) -> i64 {
        match self.kind {
            BuffKind::Wither if ctx.is_healing(amount) => amount / 2,
            _ => amount,
        }
    }

    /// Health change this buff produces before the bearer's turn, if any.
    #[must_use]
    pub fn pre_turn_delta(&self) -> Option<(ResourceKind, i64)> {
        match self.kind {
            BuffKind::Regeneration if self.magnitude != 0 => Some((ResourceKind::Health, self.magnitude)),
            BuffKind::Poison if self.magnitude != 0 => Some((ResourceKind::Health, -self.magnitude)),
            _ => None,
        }
    }

    /// Decrement the remaining-turns counter, floored at zero.
    pub fn tick(&mut self) {
        self.remaining_turns = self.remaining_turns.saturating_sub(1);
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_turns < 1
    }

    /// Spend one charge. Returns `true` when the buff has run out.
    /// Buffs without charges never run out this way.
    pub fn consume_charge(&mut self) -> bool {
        match self.charges.as_mut() {
            Some(charges) => {
                *charges = charges.saturating_sub(1);
                *charges == 0
            }
            None => false,
        }
    }
}

/// Fold an amount through the outgoing hooks of `buffs`, in list order.
#[must_use]
pub fn chain_outgoing(buffs: &[Buff], ctx: &HookContext, amount: i64) -> i64 {
    buffs.iter().fold(amount, |acc, buff| buff.modify_outgoing(ctx, acc))
}

/// Fold an amount through the incoming hooks of `buffs`, in list order.
#[must_use]
pub fn chain_incoming(buffs: &[Buff], ctx: &HookContext, amount: i64) -> i64 {
    buffs.iter().fold(amount, |acc, buff| buff.modify_incoming(ctx, acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buff(kind: BuffKind) -> Buff {
        Buff::new(kind, CombatantId(1))
    }

    #[test]
    fn test_defaults() {
        let b = buff(BuffKind::Poison);
        assert_eq!(b.remaining_turns, 1);
        assert_eq!(b.aging_phase, AgingPhase::TurnEnd);
        assert!(b.is_debuff);
        assert!(!buff(BuffKind::Shield).is_debuff);
    }

    #[test]
    fn test_outgoing_damage_hooks() {
        let ctx = HookContext::damage();
        assert_eq!(buff(BuffKind::Weakness).modify_outgoing(&ctx, 9), 4);
        assert_eq!(buff(BuffKind::Strengthen).modify_outgoing(&ctx, 9), 18);
        assert_eq!(buff(BuffKind::Strengthen).modify_outgoing(&ctx, -9), -9);
        assert_eq!(buff(BuffKind::Shield).modify_outgoing(&ctx, 9), 9);
    }

    #[test]
    fn test_healing_hooks() {
        let heal = HookContext::resource(ResourceKind::Health);
        assert_eq!(buff(BuffKind::Focus).modify_outgoing(&heal, 10), 15);
        assert_eq!(buff(BuffKind::Wither).modify_incoming(&heal, 10), 5);
        assert_eq!(buff(BuffKind::Wither).modify_incoming(&heal, -10), -10);

        let mana = HookContext::resource(ResourceKind::Mana);
        assert_eq!(buff(BuffKind::Focus).modify_outgoing(&mana, 10), 10);
    }

    #[test]
    fn test_chain_applies_in_order() {
        let ctx = HookContext::damage();
        // (7 / 2) * 2 = 6, while (7 * 2) / 2 = 7
        let weak_first = [buff(BuffKind::Weakness), buff(BuffKind::Strengthen)];
        let strong_first = [buff(BuffKind::Strengthen), buff(BuffKind::Weakness)];
        assert_eq!(chain_outgoing(&weak_first, &ctx, 7), 6);
        assert_eq!(chain_outgoing(&strong_first, &ctx, 7), 7);
        assert_eq!(chain_outgoing(&[], &ctx, 7), 7);
    }

    #[test]
    fn test_tick_floors_at_zero() {
        let mut b = buff(BuffKind::Stun).with_duration(1);
        b.tick();
        assert!(b.is_expired());
        b.tick();
        assert_eq!(b.remaining_turns, 0);
    }

    #[test]
    fn test_consume_charge() {
        let mut b = buff(BuffKind::Retaliation).with_charges(2);
        assert!(!b.consume_charge());
        assert!(b.consume_charge());

        let mut unlimited = buff(BuffKind::Retaliation);
        assert!(!unlimited.consume_charge());
    }

    #[test]
    fn test_pre_turn_delta() {
        assert_eq!(
            buff(BuffKind::Regeneration).with_magnitude(4).pre_turn_delta(),
            Some((ResourceKind::Health, 4))
        );
        assert_eq!(
            buff(BuffKind::Poison).with_magnitude(3).pre_turn_delta(),
            Some((ResourceKind::Health, -3))
        );
        assert_eq!(buff(BuffKind::Poison).pre_turn_delta(), None);
        assert_eq!(buff(BuffKind::Shield).pre_turn_delta(), None);
    }

    #[test]
    fn test_incapacitation() {
        assert_eq!(BuffKind::Stun.incapacitation(), Incapacitation::Full);
        assert_eq!(BuffKind::Charm.incapacitation(), Incapacitation::Partial);
        assert_eq!(BuffKind::Focus.incapacitation(), Incapacitation::None);
    }
}
