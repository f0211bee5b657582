//! Module that contains utilities shared by test code

use std::collections::VecDeque;

use crate::audit::RandomSource;

/// A [`RandomSource`] that returns a predetermined sequence of draws.
///
/// Every requested bound is recorded so tests can assert on when (and over which range)
/// randomness was consumed. Running out of draws is a test bug and panics.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    draws: VecDeque<u64>,
    bounds: Vec<u64>,
}

impl ScriptedSource {
    pub fn new(draws: Vec<u64>) -> Self {
        Self {
            draws: draws.into(),
            bounds: Vec::new(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.draws.is_empty()
    }

    /// The bound passed to each draw, in call order
    pub fn bounds(&self) -> &[u64] {
        &self.bounds
    }
}

impl RandomSource for ScriptedSource {
    fn next_index(&mut self, bound: u64) -> u64 {
        self.bounds.push(bound);
        let draw = self
            .draws
            .pop_front()
            .expect("ScriptedSource ran out of draws");
        assert!(draw < bound, "scripted draw {} out of range [0, {})", draw, bound);
        draw
    }
}
