//! Generator wrapping a generation engine.
//!
//! [`MusicGenerator`] owns the engine handle and applies the fixed decoding
//! policy (sampling on, top-k truncation, caller's duration) before each
//! single-description request.

use log::{info, warn};

use crate::error::{Result, StudioError};
use crate::models::{GenerationEngine, GenerationParams, DEFAULT_TOP_K};
use crate::types::AudioTensor;

/// Text-to-music generator over an owned engine.
///
/// The engine is loaded once by the caller and reused for every call.
/// `generate` takes `&mut self`, so one generator serves one request at a time.
pub struct MusicGenerator<E: GenerationEngine> {
    engine: E,
    top_k: usize,
}

impl<E: GenerationEngine> MusicGenerator<E> {
    /// Wraps an already loaded engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Overrides the top-k truncation passed to the engine.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Returns the wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Generates audio for one description.
    ///
    /// `duration_sec` is passed to the engine unchanged; range checks are
    /// the caller's business. Engine errors are returned as-is.
    ///
    /// If the engine returns more than one tensor, the first is used.
    pub fn generate(&mut self, description: &str, duration_sec: u32) -> Result<AudioTensor> {
        info!("Description: \"{}\"", description);
        info!("Duration: {}s", duration_sec);

        self.engine.configure(GenerationParams {
            use_sampling: true,
            top_k: self.top_k,
            duration_sec,
        });

        let outputs = self.engine.infer(&[description.to_string()])?;
        let count = outputs.len();
        if count > 1 {
            warn!(
                "Engine returned {} tensors for a single description; keeping the first",
                count
            );
        }

        outputs.into_iter().next().ok_or_else(|| {
            StudioError::model_inference_failed("engine returned no audio for the description")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::generation::stub::StubEngine;

    #[test]
    fn configures_fixed_policy_before_inference() {
        let mut generator = MusicGenerator::new(StubEngine::new());
        generator.generate("calm piano melody", 3).unwrap();

        let params = generator.engine().params();
        assert!(params.use_sampling);
        assert_eq!(params.top_k, 250);
        assert_eq!(params.duration_sec, 3);
        assert_eq!(generator.engine().seen, vec!["calm piano melody".to_string()]);
    }

    #[test]
    fn returns_first_tensor() {
        let mut generator = MusicGenerator::new(StubEngine::new());
        let tensor = generator.generate("lofi beats", 2).unwrap();
        assert_eq!(tensor.shape(), &[1, 1, 64000]);
    }

    #[test]
    fn extra_tensors_are_dropped() {
        let mut engine = StubEngine::new();
        engine.copies = 3;
        let mut generator = MusicGenerator::new(engine);
        let tensor = generator.generate("drums", 1).unwrap();
        assert_eq!(tensor.rank(), 3);
    }

    #[test]
    fn empty_engine_output_is_an_error() {
        let mut engine = StubEngine::new();
        engine.copies = 0;
        let mut generator = MusicGenerator::new(engine);
        let err = generator.generate("silence", 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelInferenceFailed);
    }

    #[test]
    fn duration_is_not_range_checked() {
        let mut generator = MusicGenerator::new(StubEngine::new());
        // Above the 20s the front ends allow; the generator passes it through.
        let tensor = generator.generate("ambient", 30).unwrap();
        assert_eq!(tensor.frames(), 30 * 32000);
    }

    #[test]
    fn engine_errors_propagate() {
        let mut generator = MusicGenerator::new(StubEngine::new());
        let err = generator.generate("calm piano melody", 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelInferenceFailed);
    }

    #[test]
    fn top_k_override() {
        let mut generator = MusicGenerator::new(StubEngine::new()).with_top_k(50);
        generator.generate("jazz", 1).unwrap();
        assert_eq!(generator.engine().params().top_k, 50);
    }
}
