//! Pluggable uniform integer source used by the identifier [factory][crate::factory].
//!
//! The factory needs one primitive: an integer drawn uniformly from an open
//! interval. Parameterizing it behind a trait, instead of reaching for a
//! global RNG, keeps [crate::factory::create_between] deterministic under
//! test: property tests and soak tests seed a [rand::rngs::SmallRng] and
//! log the seed, so a failing run is reproducible from its printed seed.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniformly distributed `i32` values drawn from an open interval.
pub trait RandomSource {
    /// Return a value `r` with `lo < r < hi`. Callers only invoke this when
    /// `hi - lo >= 2`, i.e. the open interval is nonempty.
    fn next_between(&mut self, lo: i32, hi: i32) -> i32;
}

impl<T: Rng> RandomSource for T {
    fn next_between(&mut self, lo: i32, hi: i32) -> i32 {
        self.gen_range(lo + 1..hi)
    }
}

/// Construct the default, process-seeded random source used by replicas in
/// production. Tests prefer a seeded `SmallRng` directly so failures are
/// reproducible.
pub fn default_source() -> StdRng {
    StdRng::from_entropy()
}
