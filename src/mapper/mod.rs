//! Projection of locations between coordinate systems.

pub mod convert;
mod error;
pub mod segments;

pub use convert::{
    convert_location, nucleotide_to_amino, relative_to_alignment, relative_to_location,
};
pub use error::Error;
pub use segments::{
    check_segments, get_alignment_segments, get_convert_to_local_segments, ConvertSegment,
};
