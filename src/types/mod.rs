//! Core types for promptwave.
//!
//! This module re-exports the data types shared across the crate:
//! - [`AudioTensor`]: Raw generated audio as returned by the engine
//! - [`ClipBatch`]: An audio tensor resolved into single or batched clips
//! - [`AudioClip`]: Metadata for one WAV file written to disk
//! - [`ModelConfig`]: Configuration parameters for the MusicGen model

mod clip;
mod config;
mod tensor;

// Re-export all types at the module level
pub use clip::AudioClip;
pub use config::ModelConfig;
pub use tensor::{AudioTensor, ClipBatch};
