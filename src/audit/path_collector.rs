//! The [`PathCollector`] observes a metadata pass and keeps one [`Reservoir`] per storage node.
//!
//! Every piece of every remote segment offers the segment key to the reservoir of the node
//! storing that piece. Once the pass is over, each reservoir holds an unbiased sample of the
//! segments that node is supposed to store, which is what the audit scheduler picks its
//! verification targets from.
//!
//! Memory is bounded by `nodes * reservoir_slots`, no matter how large the metadata corpus is.
//! A collector is built for a single pass and dropped after its reservoirs are read.
//!
//! The collector isn't synchronized. Walkers that fan out over several workers should give
//! each worker its own collector (and its own seeded [`RandomSource`]) and combine them with
//! [`PathCollector::merge`] once every worker is done.
use std::collections::{hash_map::Entry, HashMap};

use serde::Serialize;
use tracing::{event, instrument, Level};

use crate::{
    error::{Error, Result},
    metainfo::{NodeId, Object, Observer, Segment},
};

use super::{
    config::{AuditConfig, DuplicatePiecePolicy},
    random::RandomSource,
    reservoir::Reservoir,
};

pub struct PathCollector<R> {
    reservoirs: HashMap<NodeId, Reservoir>,
    reservoir_slots: usize,
    duplicate_pieces: DuplicatePiecePolicy,
    rng: R,
}

impl<R> std::fmt::Debug for PathCollector<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathCollector")
            .field("nodes", &self.reservoirs.len())
            .field("reservoir_slots", &self.reservoir_slots)
            .field("duplicate_pieces", &self.duplicate_pieces)
            .finish()
    }
}

/// Aggregated view of a collector, mostly useful for logging at the end of a pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of distinct nodes observed
    pub nodes: usize,
    /// Total number of keys currently held across all reservoirs
    pub sampled: usize,
    /// Total number of keys offered across all reservoirs
    pub seen: u64,
}

impl<R: RandomSource> PathCollector<R> {
    pub fn new(reservoir_slots: usize, rng: R) -> Self {
        Self {
            reservoirs: HashMap::new(),
            reservoir_slots,
            duplicate_pieces: DuplicatePiecePolicy::default(),
            rng,
        }
    }

    /// Builds a collector out of an [`AuditConfig`].
    ///
    /// # Errors
    /// Returns [`crate::error::Error::InvalidConfig`] if the configured slot count is invalid
    pub fn from_config(config: &AuditConfig, rng: R) -> Result<Self> {
        let collector = Self::new(config.reservoir_slots()?, rng);
        Ok(collector.with_duplicate_pieces(config.duplicate_pieces))
    }

    pub fn with_duplicate_pieces(mut self, policy: DuplicatePiecePolicy) -> Self {
        self.duplicate_pieces = policy;
        self
    }

    pub fn reservoir_slots(&self) -> usize {
        self.reservoir_slots
    }

    /// The per-node samples collected so far
    pub fn reservoirs(&self) -> &HashMap<NodeId, Reservoir> {
        &self.reservoirs
    }

    pub fn into_reservoirs(self) -> HashMap<NodeId, Reservoir> {
        self.reservoirs
    }

    pub fn summary(&self) -> Summary {
        self.reservoirs
            .values()
            .fold(Summary::default(), |mut summary, reservoir| {
                summary.nodes += 1;
                summary.sampled += reservoir.segments().len();
                summary.seen += reservoir.seen();
                summary
            })
    }

    /// Folds the reservoirs of `other` (built from a disjoint part of the same pass) into this
    /// collector, using this collector's [`RandomSource`] for the re-sampling.
    ///
    /// Nothing is modified when the merge is rejected.
    ///
    /// # Errors
    /// Returns [`Error::Logic`] if the collectors were built with different slot counts
    #[instrument(level = "debug", skip_all, fields(lhs_nodes = self.reservoirs.len(), rhs_nodes = other.reservoirs.len()))]
    pub fn merge<O>(&mut self, other: PathCollector<O>) -> Result<()> {
        if self.reservoir_slots != other.reservoir_slots {
            return Err(Error::Logic {
                reason: format!(
                    "Unable to merge collectors with different reservoir slots ({} and {})",
                    self.reservoir_slots, other.reservoir_slots
                ),
            });
        }

        // every reservoir was created with `reservoir_slots`, so per-node merges can't fail
        for (node, reservoir) in other.reservoirs {
            match self.reservoirs.entry(node) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(&mut self.rng, reservoir)?,
                Entry::Vacant(entry) => {
                    entry.insert(reservoir);
                }
            }
        }

        Ok(())
    }
}

impl<R: RandomSource> Observer for PathCollector<R> {
    /// Offers the segment key to the reservoir of every node holding one of its pieces
    fn remote_segment(&mut self, segment: &Segment) -> Result<()> {
        let key = segment.location.encode();

        let mut sampled_nodes: Vec<NodeId> = Vec::with_capacity(segment.pieces.len());
        for piece in segment.pieces.iter() {
            let node = piece.storage_node;
            if sampled_nodes.contains(&node) {
                event!(
                    Level::WARN,
                    "segment {:?} has more than one piece on node {}",
                    key,
                    node
                );
                if self.duplicate_pieces == DuplicatePiecePolicy::OncePerNode {
                    continue;
                }
            } else {
                sampled_nodes.push(node);
            }

            let reservoir_slots = self.reservoir_slots;
            let reservoir = self.reservoirs.entry(node).or_insert_with(|| {
                event!(Level::TRACE, "creating reservoir for node {}", node);
                Reservoir::new(reservoir_slots)
            });
            reservoir.sample(&mut self.rng, key.clone());
        }

        Ok(())
    }

    /// Objects don't say anything about where data is stored
    fn object(&mut self, _object: &Object) -> Result<()> {
        Ok(())
    }

    /// Inline segments live in the metadata itself, so there is no node to audit
    fn inline_segment(&mut self, _segment: &Segment) -> Result<()> {
        Ok(())
    }
}
