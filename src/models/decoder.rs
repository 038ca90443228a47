//! MusicGen decoder wrapper with KV cache support.
//!
//! Generates codebook tokens autoregressively. The first step runs the full
//! decoder; later steps feed the cached keys/values to the `with_past`
//! variant so each step only processes the newest token.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use half::f16;
use log::debug;
use ort::session::{Session, SessionInputValue};
use ort::value::{DynValue, Tensor};
use rand::Rng;

use crate::error::{Result, StudioError};
use crate::types::ModelConfig;

use super::delay_pattern::DelayedCodes;
use super::loader::session_from_file;
use super::logits::Logits;
use super::text_encoder::EncodedText;

/// Number of codebooks predicted per step.
pub const CODEBOOKS: usize = 4;

/// Conditional plus unconditional rows for classifier-free guidance.
const GUIDED_BATCH: usize = CODEBOOKS * 2;

/// How the next token of each codebook is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingPolicy {
    /// Sample from the top-k distribution; otherwise argmax.
    pub use_sampling: bool,
    /// Truncation width when sampling.
    pub top_k: usize,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
}

/// MusicGen decoder using split architecture with KV cache.
pub struct MusicGenDecoder {
    decoder_model: Session,
    decoder_with_past: Session,
    config: ModelConfig,
}

impl MusicGenDecoder {
    /// Loads `decoder_model.onnx` and `decoder_with_past_model.onnx`.
    pub fn load(model_dir: &Path, config: ModelConfig, threads: Option<usize>) -> Result<Self> {
        let decoder_model = session_from_file(&model_dir.join("decoder_model.onnx"), threads)?;
        let decoder_with_past =
            session_from_file(&model_dir.join("decoder_with_past_model.onnx"), threads)?;

        Ok(Self {
            decoder_model,
            decoder_with_past,
            config,
        })
    }

    /// Generates `max_len` aligned token frames for the encoded description.
    ///
    /// The first frame only completes once every codebook has started, so
    /// the step count is padded to yield exactly `max_len` frames.
    pub fn generate_tokens<R: Rng + ?Sized>(
        &mut self,
        encoded: EncodedText,
        max_len: usize,
        policy: &DecodingPolicy,
        rng: &mut R,
    ) -> Result<Vec<[i64; CODEBOOKS]>> {
        let pad_token_id = self.config.pad_token_id;
        let num_layers = self.config.num_hidden_layers as usize;

        // Second half of the batch is the unconditional (zeroed) prompt.
        let hidden_states = duplicate_with_zeros(&encoded.hidden_states)?;
        let attention_mask = duplicate_with_zeros_typed::<i64>(&encoded.attention_mask)?;

        let initial_ids = input_ids([pad_token_id; CODEBOOKS])?;
        let inputs: Vec<(Cow<str>, SessionInputValue)> = vec![
            (Cow::from("encoder_attention_mask"), SessionInputValue::from(attention_mask.view())),
            (Cow::from("encoder_hidden_states"), SessionInputValue::from(hidden_states.view())),
            (Cow::from("input_ids"), SessionInputValue::from(initial_ids.view())),
        ];

        let mut outputs = self.decoder_model.run(inputs).map_err(|e| {
            StudioError::model_inference_failed(format!("Initial decoder inference failed: {}", e))
        })?;

        let mut codes = DelayedCodes::<CODEBOOKS>::new();
        let logits = outputs.remove("logits").ok_or_else(|| missing_output("logits"))?;
        codes.push(next_codes(&logits, policy, rng)?);

        let mut kv_cache: HashMap<String, DynValue> = HashMap::with_capacity(num_layers * 4);
        for layer in 0..num_layers {
            for part in ["decoder.key", "decoder.value", "encoder.key", "encoder.value"] {
                let name = format!("present.{layer}.{part}");
                let value = outputs.remove(&name).ok_or_else(|| missing_output(&name))?;
                kv_cache.insert(format!("past_key_values.{layer}.{part}"), value);
            }
        }
        drop(outputs);

        let mut frames = Vec::new();
        let steps = max_len + CODEBOOKS - 2;

        for step in 0..steps {
            let ids = input_ids(codes.next_input(pad_token_id))?;

            let mut inputs: Vec<(Cow<str>, SessionInputValue)> = vec![
                (Cow::from("input_ids"), SessionInputValue::from(ids.view())),
                (
                    Cow::from("encoder_attention_mask"),
                    SessionInputValue::from(attention_mask.view()),
                ),
            ];
            for (name, value) in &kv_cache {
                inputs.push((Cow::from(name.as_str()), SessionInputValue::from(value.view())));
            }

            let mut outputs = self.decoder_with_past.run(inputs).map_err(|e| {
                StudioError::model_inference_failed(format!(
                    "Decoder with past inference failed at step {}: {}",
                    step, e
                ))
            })?;

            let logits = outputs.remove("logits").ok_or_else(|| missing_output("logits"))?;
            codes.push(next_codes(&logits, policy, rng)?);
            if let Some(frame) = codes.last_aligned() {
                frames.push(frame);
            }

            // Only the decoder self-attention cache grows; encoder entries stay.
            for layer in 0..num_layers {
                for part in ["decoder.key", "decoder.value"] {
                    let name = format!("present.{layer}.{part}");
                    let value = outputs.remove(&name).ok_or_else(|| missing_output(&name))?;
                    kv_cache.insert(format!("past_key_values.{layer}.{part}"), value);
                }
            }

            if step % 50 == 0 {
                debug!("Decoder step {}/{}", step, steps);
            }
        }

        Ok(frames)
    }
}

fn missing_output(name: &str) -> StudioError {
    StudioError::model_inference_failed(format!("{} not found in output", name))
}

/// Reads the step's logits and selects one token per codebook.
fn next_codes<R: Rng + ?Sized>(
    logits: &DynValue,
    policy: &DecodingPolicy,
    rng: &mut R,
) -> Result<[i64; CODEBOOKS]> {
    let logits = Logits::from_3d_dyn_value(logits)?
        .apply_free_guidance(policy.guidance_scale)?;
    let tokens = logits.select(policy.use_sampling, policy.top_k, rng)?;
    let count = tokens.len();
    tokens.try_into().map_err(|_| {
        StudioError::model_inference_failed(format!(
            "Expected {} codebook tokens, got {}",
            CODEBOOKS, count
        ))
    })
}

/// Builds the `[8, 1]` input ids, repeating the codes for both guidance halves.
fn input_ids(codes: [i64; CODEBOOKS]) -> Result<Tensor<i64>> {
    let data: Vec<i64> = codes.iter().chain(codes.iter()).copied().collect();
    Tensor::from_array(([GUIDED_BATCH, 1usize], data)).map_err(|e| {
        StudioError::model_inference_failed(format!("Failed to create input_ids: {}", e))
    })
}

/// Doubles the first dimension, filling the new half with zeros.
/// Handles both fp16 and fp32 encoder outputs.
fn duplicate_with_zeros(tensor: &DynValue) -> Result<DynValue> {
    duplicate_with_zeros_typed::<f16>(tensor).or_else(|_| duplicate_with_zeros_typed::<f32>(tensor))
}

fn duplicate_with_zeros_typed<T>(tensor: &DynValue) -> Result<DynValue>
where
    T: ort::tensor::PrimitiveTensorElementType + Clone + Default + std::fmt::Debug + 'static,
{
    let (shape, data) = tensor.try_extract_tensor::<T>().map_err(|e| {
        StudioError::model_inference_failed(format!("Failed to extract tensor: {}", e))
    })?;

    let mut new_shape: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
    if let Some(first) = new_shape.first_mut() {
        *first *= 2;
    }

    let combined: Vec<T> = data
        .iter()
        .cloned()
        .chain(std::iter::repeat(T::default()).take(data.len()))
        .collect();

    let result = Tensor::from_array((new_shape, combined)).map_err(|e| {
        StudioError::model_inference_failed(format!("Failed to create duplicated tensor: {}", e))
    })?;

    Ok(result.into_dyn())
}
