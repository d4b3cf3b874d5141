//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. The
//! spawn cycle itself never fails; errors come from definition validation, group
//! lookups and the configuration layer.
use thiserror::Error;

use crate::definition::SpawnerId;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("region '{context}' is empty")]
    EmptyRegion { context: String },

    #[error("unknown spawner {id}")]
    UnknownSpawner { id: SpawnerId },

    #[error("duplicate spawner {id}")]
    DuplicateSpawner { id: SpawnerId },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
