//! Deterministic engine used by tests in place of the ONNX models.

use std::f32::consts::PI;

use ndarray::Array3;

use crate::error::{Result, StudioError};
use crate::models::{GenerationEngine, GenerationParams};
use crate::types::AudioTensor;

/// Produces a 440Hz tone of the configured duration per description.
pub(crate) struct StubEngine {
    pub params: GenerationParams,
    pub sample_rate: u32,
    pub channels: usize,
    /// Number of tensors returned per description.
    pub copies: usize,
    /// Every description passed to `infer`, in call order.
    pub seen: Vec<String>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            params: GenerationParams::default(),
            sample_rate: 32000,
            channels: 1,
            copies: 1,
            seen: Vec::new(),
        }
    }
}

impl GenerationEngine for StubEngine {
    fn configure(&mut self, params: GenerationParams) {
        self.params = params;
    }

    fn params(&self) -> GenerationParams {
        self.params
    }

    fn infer(&mut self, descriptions: &[String]) -> Result<Vec<AudioTensor>> {
        if self.params.duration_sec == 0 {
            return Err(StudioError::model_inference_failed(
                "duration must be a positive number of seconds",
            ));
        }

        let frames = self.params.duration_sec as usize * self.sample_rate as usize;
        let rate = self.sample_rate as f32;
        let mut outputs = Vec::new();
        for description in descriptions {
            self.seen.push(description.clone());
            for _ in 0..self.copies {
                let tone = Array3::from_shape_fn((1, self.channels, frames), |(_, _, t)| {
                    0.5 * (2.0 * PI * 440.0 * t as f32 / rate).sin()
                });
                outputs.push(AudioTensor::from(tone));
            }
        }
        Ok(outputs)
    }

    fn version(&self) -> &str {
        "stub-v1"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
