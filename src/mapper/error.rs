//! Error type definition.

use thiserror::Error;

/// Error type for coordinate projection.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("location error")]
    Location(#[from] crate::location::Error),
    #[error("segment {0} has negative length: {1}..{2}")]
    NegativeSegmentLength(usize, i64, i64),
    #[error("segment {0} starts at {1} before the end {2} of its predecessor")]
    UnsortedSegments(usize, i64, i64),
}
