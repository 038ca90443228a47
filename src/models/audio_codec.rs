//! Audio codec wrapper for MusicGen.
//!
//! Decodes codebook token frames into audio samples using EnCodec.

use std::path::Path;

use half::f16;
use ort::session::Session;
use ort::value::{DynValue, Tensor};

use crate::error::{Result, StudioError};
use crate::types::AudioTensor;

use super::decoder::CODEBOOKS;
use super::loader::session_from_file;

/// MusicGen audio codec (EnCodec decoder).
pub struct MusicGenAudioCodec {
    session: Session,
}

impl MusicGenAudioCodec {
    /// Loads `encodec_decode.onnx` from the model directory.
    pub fn load(model_dir: &Path, threads: Option<usize>) -> Result<Self> {
        let session = session_from_file(&model_dir.join("encodec_decode.onnx"), threads)?;
        Ok(Self { session })
    }

    /// Decodes token frames into a `[batch, channels, time]` audio tensor.
    ///
    /// The tensor keeps whatever shape the codec reports; for MusicGen small
    /// that is `[1, 1, frames * 640]`. No frames decode to an empty
    /// `[1, 1, 0]` tensor without running the codec.
    pub fn decode(&mut self, frames: &[[i64; CODEBOOKS]]) -> Result<AudioTensor> {
        if frames.is_empty() {
            return AudioTensor::from_shape_vec(&[1, 1, 0], Vec::new());
        }

        let codes = codebook_major(frames);
        let input = Tensor::from_array(([1usize, 1, CODEBOOKS, frames.len()], codes)).map_err(|e| {
            StudioError::model_inference_failed(format!("Failed to create token tensor: {}", e))
        })?;

        let mut outputs = self.session.run(ort::inputs![input]).map_err(|e| {
            StudioError::model_inference_failed(format!("Audio codec inference failed: {}", e))
        })?;

        let audio_values: DynValue = outputs.remove("audio_values").ok_or_else(|| {
            StudioError::model_inference_failed("audio_values not found in output")
        })?;

        if let Ok((shape, data)) = audio_values.try_extract_tensor::<f32>() {
            let shape: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            return AudioTensor::from_shape_vec(&shape, data.to_vec());
        }
        if let Ok((shape, data)) = audio_values.try_extract_tensor::<f16>() {
            let shape: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            let data = data.iter().map(|e| f32::from(*e)).collect();
            return AudioTensor::from_shape_vec(&shape, data);
        }

        Err(StudioError::model_inference_failed(
            "Audio values must be either f16 or f32",
        ))
    }
}

/// Lays out step-major frames as `[codebook][step]`, as EnCodec expects.
fn codebook_major(frames: &[[i64; CODEBOOKS]]) -> Vec<i64> {
    (0..CODEBOOKS)
        .flat_map(|book| frames.iter().map(move |frame| frame[book]))
        .collect()
}
