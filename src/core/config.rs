//! Engine-wide combat tuning.
//!
//! Per-archetype numbers (health, mitigation, attack) live on
//! `CombatantConfig`. `CombatConfig` holds the rules that apply to every
//! fight: resistance and vulnerability percentages, scale caps, revive
//! strength and the cascade ceiling.

use serde::{Deserialize, Serialize};

/// Engine-wide combat configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Extra mitigation (percent) when the victim resists the attack element.
    pub resistance_mitigation_bonus: u32,

    /// Extra damage (percent) taken while carrying a vulnerability debuff.
    pub vulnerability_bonus_percent: u32,

    /// Cap for each of the two scale counters of a team.
    pub scale_cap: u8,

    /// Both scale counters must reach this to unlock ultimates.
    pub ultimate_scale_requirement: u8,

    /// Outgoing damage bonus (percent) per scale point held by the caster's
    /// team, applied when a plan is finalized. 0 disables it.
    pub scale_damage_bonus_percent: u32,

    /// Health restored (percent of max) by revives that don't specify one.
    pub default_revive_health_percent: u32,

    /// Deepest child plan the resolver will run. Deeper cascades are dropped.
    pub max_cascade_depth: usize,

    /// Team retaliation ignores hits coming from basic attacks.
    pub team_retaliation_ignores_basic_attacks: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            resistance_mitigation_bonus: 25,
            vulnerability_bonus_percent: 25,
            scale_cap: 2,
            ultimate_scale_requirement: 2,
            scale_damage_bonus_percent: 0,
            default_revive_health_percent: 50,
            max_cascade_depth: 32,
            team_retaliation_ignores_basic_attacks: false,
        }
    }
}

impl CombatConfig {
    /// Set the resistance mitigation bonus.
    #[must_use]
    pub fn with_resistance_bonus(mut self, percent: u32) -> Self {
        self.resistance_mitigation_bonus = percent;
        self
    }

    /// Set the vulnerability bonus.
    #[must_use]
    pub fn with_vulnerability_bonus(mut self, percent: u32) -> Self {
        self.vulnerability_bonus_percent = percent;
        self
    }

    /// Set the per-point scale damage bonus.
    #[must_use]
    pub fn with_scale_damage_bonus(mut self, percent: u32) -> Self {
        self.scale_damage_bonus_percent = percent;
        self
    }

    /// Set the cascade depth ceiling.
    #[must_use]
    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    /// Make team retaliation ignore basic attacks.
    #[must_use]
    pub fn with_team_retaliation_ignoring_basic(mut self, ignore: bool) -> Self {
        self.team_retaliation_ignores_basic_attacks = ignore;
        self
    }
}
