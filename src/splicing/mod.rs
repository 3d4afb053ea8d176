//! Splicing regions of isoform pairs and their comparison across alignments.

pub mod as_type;
mod error;
pub mod events;
pub mod hit;
pub mod score;

pub use as_type::{get_as_types, isoform_as_types, AsEvent, AsType, IsoformAsTypes};
pub use error::Error;
pub use events::{
    assign_event_ids, convert_splicing, extend_splicing, split_splicing, splicing_regions,
    FrameState,
};
pub use hit::{compare, isoform_blast_score, AlignedHit, QuerySplicing, SplicingFeatures};
pub use score::{difference_score, similarity_score, Config, MatchTable};
