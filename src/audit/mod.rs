//! Audit target sampling.
//!
//! During one metadata pass, a [`PathCollector`] builds a bounded, unbiased sample of the
//! segments stored by each node. The audit scheduler (outside of this crate) turns the
//! resulting [`Reservoir`]s into verification requests.
pub mod config;
pub mod path_collector;
pub mod random;
pub mod reservoir;

pub use config::{AuditConfig, DuplicatePiecePolicy};
pub use path_collector::{PathCollector, Summary};
pub use random::RandomSource;
pub use reservoir::Reservoir;
