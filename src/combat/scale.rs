//! Per-team scale counters.

use serde::{Deserialize, Serialize};

use crate::effects::ScaleSide;

/// A team's paired light/shadow counters, each clamped to `[0, cap]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalePoints {
    pub light: u8,
    pub shadow: u8,
}

impl ScalePoints {
    #[must_use]
    pub const fn get(&self, side: ScaleSide) -> u8 {
        match side {
            ScaleSide::Light => self.light,
            ScaleSide::Shadow => self.shadow,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.light as u32 + self.shadow as u32
    }

    /// Shift one counter by `delta`, clamped. Returns `true` if it moved.
    pub fn apply(&mut self, side: ScaleSide, delta: i8, cap: u8) -> bool {
        let counter = match side {
            ScaleSide::Light => &mut self.light,
            ScaleSide::Shadow => &mut self.shadow,
        };
        let next = (i16::from(*counter) + i16::from(delta)).clamp(0, i16::from(cap)) as u8;
        let changed = next != *counter;
        *counter = next;
        changed
    }
}
