//! Audio output module.
//!
//! Provides WAV encoding and the materializer that writes generated
//! tensors to the output directory.

pub mod download;
pub mod materializer;
pub mod wav;

// Re-export commonly used items
pub use download::{download_link_html, encode_base64};
pub use materializer::{ensure_output_dir, Materializer, MaterializerConfig, DEFAULT_OUTPUT_DIR};
pub use wav::{samples_to_duration, write_wav, SAMPLE_RATE};
