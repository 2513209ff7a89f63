//! Injected dice service. Every roll in the game goes through one `GameRng`
//! so a seeded session replays identically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait GameRng {
    /// Uniform integer in `[lo, hi]` (inclusive). Returns `lo` when `hi < lo`.
    fn roll(&mut self, lo: i64, hi: i64) -> i64;

    /// True with `chance` percent probability. `chance` is clamped to `[0, 100]`.
    fn percent(&mut self, chance: u32) -> bool {
        let chance = chance.min(100) as i64;
        self.roll(1, 100) <= chance
    }

    /// Index into a non-empty slice of length `len`.
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.roll(0, len as i64 - 1) as usize
    }
}

/// `StdRng`-backed dice, seedable for reproducible sessions.
pub struct StdGameRng {
    rng: StdRng,
}

impl StdGameRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when a seed is configured, entropy otherwise.
    pub fn from_config(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl GameRng for StdGameRng {
    fn roll(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a fixed list of rolls, cycling when exhausted. Each value is
/// clamped into the requested range. Handy for pinning combat in tests.
pub struct ScriptedRng {
    rolls: Vec<i64>,
    next: usize,
}

impl ScriptedRng {
    pub fn new(rolls: Vec<i64>) -> Self {
        Self { rolls, next: 0 }
    }
}

impl GameRng for ScriptedRng {
    fn roll(&mut self, lo: i64, hi: i64) -> i64 {
        if self.rolls.is_empty() || hi <= lo {
            return lo;
        }
        let value = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        value.clamp(lo, hi)
    }
}
