//! Turn queue.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::CombatantId;

/// Round-robin queue of combatant ids. Each id appears at most once.
///
/// Backed by a persistent vector so snapshots (for listeners and
/// replays) are cheap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnQueue {
    order: Vector<CombatantId>,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless already queued. Returns `true` if added.
    pub fn push_back(&mut self, id: CombatantId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    /// Move (or insert) `id` to the front so it acts next.
    pub fn push_front(&mut self, id: CombatantId) {
        self.remove(id);
        self.order.push_front(id);
    }

    pub fn pop_front(&mut self) -> Option<CombatantId> {
        self.order.pop_front()
    }

    /// Remove `id`. Returns `true` if it was queued.
    pub fn remove(&mut self, id: CombatantId) -> bool {
        match self.order.index_of(&id) {
            Some(index) => {
                self.order.remove(index);
                true
            }
            None => false,
        }
    }

    /// Keep only ids for which `keep` holds.
    pub fn retain(&mut self, mut keep: impl FnMut(CombatantId) -> bool) -> usize {
        let before = self.order.len();
        self.order.retain(|id| keep(*id));
        before - self.order.len()
    }

    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.order.contains(&id)
    }

    #[must_use]
    pub fn front(&self) -> Option<CombatantId> {
        self.order.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<CombatantId> {
        self.iter().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
