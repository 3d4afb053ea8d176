pub mod location;
pub mod mapper;
pub mod sequences;
pub mod splicing;
