//! Single-pass, fixed-size uniform sampling of segment keys.
//!
//! A [`Reservoir`] receives every segment key stored by one node during a metadata pass.
//! The total number of keys is unknown until the pass ends and can be huge, so instead of
//! collecting all of them and sampling at the end, the reservoir keeps at most `capacity`
//! keys at any point in time:
//!
//!  1. the first `capacity` keys are stored as they arrive
//!  2. the n-th key after that replaces a uniformly chosen slot with probability `capacity / n`
//!
//! After any prefix of `n` keys, every key seen so far is retained with probability
//! `min(1, capacity / n)` and, when retained, sits in any slot with equal probability.
use serde::Serialize;

use crate::{
    error::{Error, Result},
    metainfo::SegmentKey,
};

use super::random::RandomSource;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reservoir {
    capacity: usize,
    seen: u64,
    segments: Vec<SegmentKey>,
}

impl Reservoir {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: 0,
            segments: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys ever offered to this reservoir
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// The current sample. Holds at most [`Self::capacity`] keys.
    pub fn segments(&self) -> &[SegmentKey] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<SegmentKey> {
        self.segments
    }

    /// Offers `key` to the reservoir.
    ///
    /// No randomness is consumed while the reservoir is still filling up.
    pub fn sample<R: RandomSource + ?Sized>(&mut self, rng: &mut R, key: SegmentKey) {
        self.seen += 1;

        if self.seen <= self.capacity as u64 {
            self.segments.push(key);
            return;
        }

        let index = rng.next_index(self.seen);
        if index < self.capacity as u64 {
            self.segments[index as usize] = key;
        }
    }

    /// Folds `other` into `self`, as if a single reservoir had observed both streams.
    ///
    /// Both reservoirs must have sampled disjoint streams with the same capacity. The merged
    /// sample is drawn without replacement from the union: each pick comes from `self` with
    /// probability proportional to how many of its observed keys haven't been picked yet,
    /// and is then a uniformly chosen key among that side's remaining samples.
    ///
    /// # Errors
    /// Returns [`Error::Logic`] if the capacities differ
    pub fn merge<R: RandomSource + ?Sized>(&mut self, rng: &mut R, other: Reservoir) -> Result<()> {
        if self.capacity != other.capacity {
            return Err(Error::Logic {
                reason: format!(
                    "Unable to merge reservoirs with different capacities ({} and {})",
                    self.capacity, other.capacity
                ),
            });
        }

        let seen = self.seen + other.seen;
        let target = (self.capacity as u64).min(seen) as usize;

        let mut lhs = std::mem::take(&mut self.segments);
        let mut rhs = other.segments;
        let mut lhs_remaining = self.seen;
        let mut rhs_remaining = other.seen;

        let mut merged = Vec::with_capacity(target);
        while merged.len() < target {
            let pick = rng.next_index(lhs_remaining + rhs_remaining);
            // a side with keys left to represent always has samples left, since
            // fewer than `capacity` picks have been made so far
            let (side, remaining) = if pick < lhs_remaining {
                (&mut lhs, &mut lhs_remaining)
            } else {
                (&mut rhs, &mut rhs_remaining)
            };

            let index = rng.next_index(side.len() as u64) as usize;
            merged.push(side.swap_remove(index));
            *remaining -= 1;
        }

        self.seen = seen;
        self.segments = merged;
        Ok(())
    }
}
