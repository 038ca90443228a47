//! Generation engine abstraction.
//!
//! The engine is the pretrained text-to-music model. Callers configure the
//! decoding policy, then request one audio tensor per description.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::AudioTensor;

/// Default top-k truncation used when sampling.
pub const DEFAULT_TOP_K: usize = 250;

/// Decoding parameters applied to the next inference call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sample from the truncated distribution instead of taking the argmax.
    pub use_sampling: bool,
    /// Number of most likely tokens kept when sampling.
    pub top_k: usize,
    /// Length of the audio to generate, in seconds.
    pub duration_sec: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            use_sampling: true,
            top_k: DEFAULT_TOP_K,
            duration_sec: 5,
        }
    }
}

/// A pretrained text-to-music model.
///
/// Configuration is stored on the engine and read by the next call to
/// [`infer`](GenerationEngine::infer), so one engine must not be shared
/// between concurrent requests.
pub trait GenerationEngine {
    /// Sets the decoding parameters for subsequent inference calls.
    fn configure(&mut self, params: GenerationParams);

    /// Returns the parameters currently in effect.
    fn params(&self) -> GenerationParams;

    /// Generates one audio tensor per description, in input order.
    ///
    /// Blocks until inference completes.
    fn infer(&mut self, descriptions: &[String]) -> Result<Vec<AudioTensor>>;

    /// Returns the model version identifier.
    fn version(&self) -> &str;

    /// Returns the sample rate of the generated audio in Hz.
    fn sample_rate(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_sample_with_top_k() {
        let params = GenerationParams::default();
        assert!(params.use_sampling);
        assert_eq!(params.top_k, 250);
    }
}
