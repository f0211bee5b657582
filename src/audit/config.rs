use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{Error, Result};

/// What to do when a single segment lists more than one piece on the same node.
///
/// Placement is supposed to make this impossible, but the sampler can't verify it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DuplicatePiecePolicy {
    /// Offer the segment key to the node's reservoir once per piece. This over-weights the
    /// segment for that node.
    #[default]
    SamplePerPiece,
    /// Offer the segment key to the node's reservoir once, however many pieces it holds
    OncePerNode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditConfig {
    /// Per-node sample size. Signed so that a negative value can be reported instead of
    /// failing deep inside serde with a generic type error.
    pub reservoir_slots: i64,
    #[serde(default)]
    pub duplicate_pieces: DuplicatePiecePolicy,
    /// Seed for the sampling [`crate::audit::RandomSource`]. A fresh one is drawn from
    /// entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AuditConfig {
    pub fn new(reservoir_slots: i64) -> Self {
        Self {
            reservoir_slots,
            duplicate_pieces: DuplicatePiecePolicy::default(),
            seed: None,
        }
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let c = tokio::fs::read_to_string(path).await?;
        Self::from_json(&c)
    }

    /// Parses and validates a json config
    pub fn from_json(c: &str) -> Result<Self> {
        let config: AuditConfig = serde_json::from_str(c).map_err(|e| Error::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.reservoir_slots()?;

        Ok(config)
    }

    /// The validated per-node reservoir capacity
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if `reservoir_slots` is negative or doesn't fit in a usize
    pub fn reservoir_slots(&self) -> Result<usize> {
        usize::try_from(self.reservoir_slots).map_err(|_| Error::InvalidConfig {
            reason: format!(
                "reservoir_slots must be a non-negative integer, got {}",
                self.reservoir_slots
            ),
        })
    }
}
