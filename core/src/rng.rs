//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SimRng instances derived from the
//! single master seed handed to the World.
//!
//! Each stream is seeded from (master_seed, stream slot, tick). This means:
//!   - Setup draws never shift the draws made while ticking.
//!   - Any tick's draws are reproducible without replaying earlier ticks.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one stream at one tick.
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    /// Create an RNG from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a usize in the inclusive range [lo, hi].
    pub fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        lo + self.next_u64_below((hi - lo) as u64 + 1) as usize
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly. None for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }
}

/// Hands out the per-stream RNGs for a single run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_stream(&self, slot: StreamSlot) -> SimRng {
        SimRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }

    /// The stream for `slot` at `tick`. Each tick gets a fresh,
    /// independent sequence.
    pub fn for_stream_at_tick(&self, slot: StreamSlot, tick: u64) -> SimRng {
        let index = (slot as u64).wrapping_add(tick.wrapping_mul(0x2545_f491_4f6c_dd1d));
        SimRng::new(self.master_seed, index).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Setup = 0,
    Activation = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Activation => "activation",
        }
    }
}
