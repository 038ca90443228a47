//! Generation engine and MusicGen model components.
//!
//! - [`GenerationEngine`](engine::GenerationEngine): the engine contract
//! - [`MusicGenModels`](loader::MusicGenModels): the ONNX MusicGen engine
//! - [`MusicGenTextEncoder`](text_encoder::MusicGenTextEncoder): Text prompt encoding
//! - [`MusicGenDecoder`](decoder::MusicGenDecoder): Autoregressive token generation
//! - [`MusicGenAudioCodec`](audio_codec::MusicGenAudioCodec): Token to audio decoding
//! - [`DelayedCodes`](delay_pattern::DelayedCodes): 4-codebook delay pattern
//! - [`Logits`](logits::Logits): Guidance and token selection

pub mod audio_codec;
pub mod decoder;
pub mod delay_pattern;
pub mod downloader;
pub mod engine;
pub mod loader;
pub mod logits;
pub mod text_encoder;

// Re-export commonly used types
pub use downloader::ensure_models;
pub use engine::{GenerationEngine, GenerationParams, DEFAULT_TOP_K};
pub use loader::{check_models, MusicGenModels, MODEL_URLS, REQUIRED_MODEL_FILES};
