//! The source of randomness used by audit sampling.
//!
//! It is always passed in explicitly, so a caller can make a whole pass reproducible
//! by handing in a seeded generator.
use rand::Rng;

pub trait RandomSource {
    /// Returns an integer drawn uniformly from `[0, bound)`.
    ///
    /// `bound` is always greater than zero.
    fn next_index(&mut self, bound: u64) -> u64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_index(&mut self, bound: u64) -> u64 {
        self.gen_range(0..bound)
    }
}
