//! Error type definition.

use thiserror::Error;

/// Error type for location algebra.
///
/// All variants are contract violations of the caller; expected-empty inputs are never
/// reported as errors.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("invalid strand value: {0}")]
    InvalidStrand(i8),
    #[error("location mixes strands: part {0} has strand {1:?}, expected {2:?}")]
    MixedStrand(usize, Option<i8>, Option<i8>),
    #[error("strand mismatch between operands: {0:?} vs. {1:?}")]
    StrandMismatch(Option<i8>, Option<i8>),
    #[error("part has negative length: {0}..{1}")]
    NegativeLength(i64, i64),
    #[error("cannot merge parts of a reverse strand location")]
    ReverseStrandMerge,
    #[error("missing tag {0}")]
    MissingTag(String),
    #[error("tag {0} is not of type {1}")]
    UnexpectedTagType(String, &'static str),
}
