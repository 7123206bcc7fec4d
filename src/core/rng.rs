//! Random number service for combat rolls.
//!
//! The engine only ever talks to [`RandomService`]. Two implementations ship
//! with the crate:
//!
//! - [`GameRng`]: seeded ChaCha8 stream with forking and O(1) checkpoints,
//!   so a fight can be replayed from its seed
//! - [`FixedRandom`]: scripted answers for tests and deterministic previews
//!
//! All calls happen from inside plan resolution on a single thread; the
//! order of calls is part of the replay contract.
//!
//! ```
//! use rust_combat::core::{GameRng, RandomService};
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.int_range(1, 100), b.int_range(1, 100));
//! assert!(a.percent_chance(100));
//! assert!(!a.percent_chance(0));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Source of percent-chance and ranged draws.
pub trait RandomService {
    /// Uniform integer in `[min, max]` (inclusive). Returns `min` when the
    /// range is empty.
    fn int_range(&mut self, min: i64, max: i64) -> i64;

    /// Uniform float in `[min, max)`. Returns `min` when the range is empty.
    fn float_range(&mut self, min: f64, max: f64) -> f64;

    /// `true` with probability `percent / 100`. Values of 100 or more always
    /// succeed, 0 never does.
    fn percent_chance(&mut self, percent: u32) -> bool;
}

/// Seeded ChaCha8 stream.
///
/// Forks share the seed and draw from their own ChaCha stream id, so a
/// checkpoint only needs `(seed, stream, word position)`.
#[derive(Clone, Debug)]
pub struct GameRng {
    chacha: ChaCha8Rng,
    seed: u64,
    /// Next stream id handed to a fork.
    next_stream: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::on_stream(seed, 0, 1)
    }

    fn on_stream(seed: u64, stream: u64, next_stream: u64) -> Self {
        let mut chacha = ChaCha8Rng::seed_from_u64(seed);
        chacha.set_stream(stream);
        Self { chacha, seed, next_stream }
    }

    /// Branch off an independent stream.
    ///
    /// Previews draw from a fork so the live stream is left where it was.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        let stream = self.next_stream;
        self.next_stream += 1;
        Self::on_stream(self.seed, stream, self.next_stream)
    }

    /// Seed this stream family was built from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Snapshot the stream position so a fight can be replayed from here.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            stream: self.chacha.get_stream(),
            word_pos: self.chacha.get_word_pos(),
            next_stream: self.next_stream,
        }
    }

    #[must_use]
    pub fn from_state(checkpoint: &GameRngState) -> Self {
        let mut rng = Self::on_stream(checkpoint.seed, checkpoint.stream, checkpoint.next_stream);
        rng.chacha.set_word_pos(checkpoint.word_pos);
        rng
    }
}

impl RandomService for GameRng {
    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.chacha.gen_range(min..=max)
    }

    fn float_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.chacha.gen_range(min..max)
    }

    fn percent_chance(&mut self, percent: u32) -> bool {
        match percent {
            0 => false,
            p if p >= 100 => true,
            p => self.chacha.gen_range(0..100) < p,
        }
    }
}

/// Checkpoint of a [`GameRng`] stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub stream: u64,
    /// Position in the keystream, in 32-bit words.
    pub word_pos: u128,
    pub next_stream: u64,
}

/// Scripted random service.
///
/// Every chance roll returns the same answer and every ranged draw returns
/// the configured roll clamped into the requested range (or the range
/// minimum when no roll is set).
#[derive(Clone, Debug)]
pub struct FixedRandom {
    succeed: bool,
    roll: Option<i64>,
}

impl FixedRandom {
    /// Every chance succeeds (hits land, crits happen).
    #[must_use]
    pub fn always() -> Self {
        Self { succeed: true, roll: None }
    }

    /// Every chance fails.
    #[must_use]
    pub fn never() -> Self {
        Self { succeed: false, roll: None }
    }

    /// Fix the value returned by ranged draws.
    #[must_use]
    pub fn with_roll(mut self, roll: i64) -> Self {
        self.roll = Some(roll);
        self
    }
}

impl RandomService for FixedRandom {
    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        match self.roll {
            Some(roll) if min <= max => roll.clamp(min, max),
            _ => min,
        }
    }

    fn float_range(&mut self, min: f64, _max: f64) -> f64 {
        min
    }

    fn percent_chance(&mut self, _percent: u32) -> bool {
        self.succeed
    }
}
