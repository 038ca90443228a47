//! Audio generation module.
//!
//! Provides the generator that wraps an engine and the pipeline that runs
//! generation followed by materialization.

pub mod adapter;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod stub;

// Re-export commonly used items
pub use adapter::MusicGenerator;
pub use pipeline::{
    estimate_generation_time, estimate_samples, generate_and_save, validate_request,
    GenerationOutput,
};
