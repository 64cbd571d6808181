//! Filler sources for response bodies.
//!
//! # Design Decisions
//! - Callers depend on the [`FillerSource`] capability, never a concrete generator
//! - The random source is the only state shared between connections; every
//!   draw holds its lock for the whole slice, so concurrent draws never interleave

use std::sync::Arc;

use crate::config::{FillerPolicy, ResponseConfig};

pub mod constant;
pub mod random;

pub use constant::ConstantFiller;
pub use random::SeededRandomFiller;

/// Something that can fill a response body.
pub trait FillerSource: Send + Sync {
    /// Overwrite every byte of `buf` with filler.
    fn fill(&self, buf: &mut [u8]);

    /// Which policy this source implements.
    fn policy(&self) -> FillerPolicy;
}

/// Build the filler source selected by config.
pub fn from_config(config: &ResponseConfig) -> Arc<dyn FillerSource> {
    match config.filler {
        FillerPolicy::Random => Arc::new(SeededRandomFiller::new(config.seed)),
        FillerPolicy::Dot => Arc::new(ConstantFiller::dot()),
    }
}
