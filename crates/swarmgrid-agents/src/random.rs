//! The randomness seam shared by every stochastic stage.
//!
//! Stages never call `rand` directly; they ask a [`RandomSource`] for a
//! domain-level draw ("which direction", "did the trade succeed"). The
//! default implementations derive each draw from the underlying seeded
//! generator, and tests override individual draws to force an outcome
//! without touching the stage code.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swarmgrid_types::ResourceType;

use crate::movement::Direction;
use crate::trade::{HYBRID_ABSTAIN_PROBABILITY, MAX_TRADE_UNITS, TRADE_SUCCESS_PROBABILITY};

/// Source of every random decision a tick makes.
pub trait RandomSource {
    /// The generator the default draws are built on.
    fn generator(&mut self) -> &mut StdRng;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        self.generator().random::<f64>()
    }

    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    /// Uniform index in `[0, len)`; 0 when `len` is 0.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.generator().random_range(0..len)
    }

    /// Uniform integer in `[low, high]`; `low` when the range is empty.
    fn between(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.generator().random_range(low..=high)
    }

    /// Direction of a single movement step.
    fn direction(&mut self) -> Direction {
        let i = self.index(Direction::ALL.len());
        Direction::ALL.get(i).copied().unwrap_or(Direction::Up)
    }

    /// Resource type of a trade attempt.
    fn resource_type(&mut self) -> ResourceType {
        let i = self.index(ResourceType::ALL.len());
        ResourceType::ALL
            .get(i)
            .copied()
            .unwrap_or(ResourceType::Compute)
    }

    /// Upper bound drawn for a trade before holdings are considered.
    fn trade_cap(&mut self) -> u32 {
        self.between(1, MAX_TRADE_UNITS)
    }

    /// Units requested once the cap is known.
    fn trade_amount(&mut self, cap: u32) -> u32 {
        self.between(1, cap)
    }

    /// Whether a trade attempt succeeds.
    fn trade_succeeds(&mut self) -> bool {
        self.chance(TRADE_SUCCESS_PROBABILITY)
    }

    /// Whether a hybrid sits out the consumer role this tick.
    fn hybrid_abstains(&mut self) -> bool {
        self.chance(HYBRID_ABSTAIN_PROBABILITY)
    }
}

/// A [`RandomSource`] backed by a seeded [`StdRng`].
///
/// Two instances built from the same seed produce the same stream.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this source was created with.
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn generator(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
