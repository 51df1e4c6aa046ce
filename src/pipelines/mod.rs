//! Decoding pipeline implementations

pub mod replay;

pub use replay::ReplayPipeline;
