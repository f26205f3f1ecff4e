//! Seeded random source
//!
//! A run is driven by an opaque seed string. The string is folded into a
//! 64-bit value with FNV-1a (stable across platforms and toolchains, unlike
//! `std`'s hasher) which seeds a PCG32 stream.

use rand::distr::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Length of generated seeds
const GENERATED_SEED_LEN: usize = 16;

/// Opaque run seed. Any string is valid, including the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    /// Fresh random seed for a new run, drawn from the OS generator
    pub fn generate() -> Self {
        let seed: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_SEED_LEN)
            .map(char::from)
            .collect();
        Self(seed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Seed {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Fold a seed string into 64 bits (FNV-1a)
fn fold_seed(seed: &str) -> u64 {
    seed.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Reproducible stream of floats in [0, 1), bound to one seed
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: Pcg32,
    draws: u64,
}

impl RandomSource {
    pub fn new(seed: &str) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(fold_seed(seed)),
            draws: 0,
        }
    }

    pub fn from_seed(seed: &Seed) -> Self {
        Self::new(seed.as_str())
    }

    /// Next value in [0, 1)
    pub fn draw(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }

    /// Number of draws taken so far (useful when auditing the seed contract)
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

/// Seed bookkeeping across runs: the live seed plus one "continue" slot.
///
/// Starting a new run replaces both; ending a run parks its seed so the next
/// run can continue from it.
#[derive(Debug, Clone, Default)]
pub struct SeedSlot {
    current: Option<Seed>,
    continue_slot: Option<Seed>,
}

impl SeedSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new run with a fresh seed, discarding any continue slot
    pub fn begin_new_run(&mut self) -> Seed {
        self.begin_with(Seed::generate())
    }

    /// Begin a new run with an explicit seed, discarding any continue slot
    pub fn begin_with(&mut self, seed: Seed) -> Seed {
        self.continue_slot = None;
        self.current = Some(seed.clone());
        seed
    }

    /// End the live run, keeping its seed for a later continue
    pub fn end_run(&mut self) {
        if let Some(seed) = self.current.take() {
            self.continue_slot = Some(seed);
        }
    }

    /// Resume from the parked seed, if any
    pub fn continue_run(&mut self) -> Option<Seed> {
        let seed = self.continue_slot.take()?;
        self.current = Some(seed.clone());
        Some(seed)
    }

    pub fn current(&self) -> Option<&Seed> {
        self.current.as_ref()
    }

    pub fn has_continue(&self) -> bool {
        self.continue_slot.is_some()
    }
}
