//! This module defines the errors that can be returned by audit-sampler.
//!
//! Sampling itself never fails. Errors only surface while building a
//! [`crate::audit::PathCollector`] from outside input (config files, walk event files)
//! or when a caller combines incompatible results.

use std::fmt::Display;

use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Error enum with all possible variants
#[derive(Debug, Serialize)]
pub enum Error {
    /// Construction-time misconfiguration (eg: a negative reservoir slot count)
    InvalidConfig { reason: String },
    /// A walk event could not be decoded
    InvalidEvent { reason: String },
    Io { reason: String },
    /// The caller did something that is never valid (eg: merging reservoirs of different capacities)
    Logic { reason: String },
}

impl Error {
    /// Returns true if this is an instance of a [`Error::InvalidConfig`] variant
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Error::InvalidConfig { .. })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}
