//! Error type definition.

use thiserror::Error;

/// Error type for splicing derivation and scoring.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("location error")]
    Location(#[from] crate::location::Error),
    #[error("coordinate projection error")]
    Mapper(#[from] crate::mapper::Error),
    #[error("hit pair has zero total length")]
    ZeroLengthHit,
}
