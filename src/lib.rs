//! promptwave: text-to-music generation using the MusicGen ONNX models.
//!
//! A free-text description goes in, `audio_{idx}.wav` files come out. The
//! library is split into a generator that turns a description into an audio
//! tensor and a materializer that writes that tensor to disk as WAV clips.
//!
//! # Modules
//!
//! - [`generation`]: Generator over an engine, plus the generate-and-save pipeline
//! - [`audio`]: Materializer, WAV writing, download links
//! - [`models`]: MusicGen ONNX engine and model download
//! - [`types`]: Core data types (AudioTensor, ClipBatch, AudioClip, ModelConfig)
//! - [`config`]: Runtime configuration (StudioConfig)
//! - [`error`]: Error types and codes (StudioError, ErrorCode)
//! - [`cli`], [`rpc`]: Command-line and JSON-RPC front ends
//!
//! # Example
//!
//! ```rust,ignore
//! use promptwave::{
//!     audio::{ensure_output_dir, Materializer},
//!     generation::{generate_and_save, MusicGenerator},
//!     models::MusicGenModels,
//!     StudioConfig,
//! };
//!
//! let config = StudioConfig::from_env();
//! ensure_output_dir(&config.output_dir)?;
//!
//! let models = MusicGenModels::load(&config.effective_model_path(), config.threads)?;
//! let mut generator = MusicGenerator::new(models);
//! let materializer = Materializer::new(config.materializer());
//!
//! let output = generate_and_save(&mut generator, &materializer, "calm piano melody", 5)?;
//! println!("{}", output.clips[0].path.display());
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod rpc;
pub mod types;

pub use audio::{Materializer, MaterializerConfig};
pub use config::StudioConfig;
pub use error::{ErrorCode, Result, StudioError};
pub use generation::MusicGenerator;
pub use models::{GenerationEngine, GenerationParams};
pub use types::{AudioClip, AudioTensor, ClipBatch, ModelConfig};
