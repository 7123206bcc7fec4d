//! Bounded resource pools.

use serde::{Deserialize, Serialize};

/// Kind of resource a combatant tracks.
///
/// `Health` is the primary pool (reaching zero kills). `Stagger` is the
/// secondary pool; a max of zero disables the stagger mechanic entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Health,
    Stagger,
    Mana,
    Energy,
}

/// A clamped `{current, min, max}` triple.
///
/// Every mutation keeps `min <= current <= max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    current: i64,
    min: i64,
    max: i64,
}

impl ResourcePool {
    /// A full pool in `[0, max]`.
    #[must_use]
    pub fn full(max: i64) -> Self {
        let max = max.max(0);
        Self { current: max, min: 0, max }
    }

    /// A pool with explicit bounds. `current` is clamped into them.
    #[must_use]
    pub fn with_bounds(min: i64, max: i64, current: i64) -> Self {
        let max = max.max(min);
        Self {
            current: current.clamp(min, max),
            min,
            max,
        }
    }

    #[must_use]
    pub fn current(&self) -> i64 {
        self.current
    }

    #[must_use]
    pub fn min(&self) -> i64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> i64 {
        self.max
    }

    /// `true` when the pool sits at its minimum.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= self.min
    }

    /// Add `delta`, clamping into bounds. Returns the change actually applied.
    pub fn apply_delta(&mut self, delta: i64) -> i64 {
        let before = self.current;
        self.current = before.saturating_add(delta).clamp(self.min, self.max);
        self.current - before
    }

    /// Set the current value, clamping into bounds.
    pub fn set_current(&mut self, value: i64) {
        self.current = value.clamp(self.min, self.max);
    }

    /// Refill to max.
    pub fn fill(&mut self) {
        self.current = self.max;
    }
}

/// Starting configuration for a non-core pool (mana, energy...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub kind: ResourceKind,
    pub max: i64,
    /// Starting value; defaults to `max` when absent.
    #[serde(default)]
    pub start: Option<i64>,
}
