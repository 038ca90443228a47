//! Logits processing for MusicGen decoder output.
//!
//! Handles classifier-free guidance and token selection (top-k sampling or
//! greedy argmax) for each decoding step.

use std::fmt::{Debug, Formatter};
use std::ops::Deref;

use half::f16;
use ndarray::{s, Array, Array2, Axis, Ix3, IxDyn};
use ort::tensor::ArrayExtensions;
use ort::value::DynValue;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

use crate::error::{Result, StudioError};

/// Default classifier-free guidance scale for MusicGen.
pub const DEFAULT_GUIDANCE_SCALE: f32 = 3.0;

/// Wrapper around a `[batch, vocab]` logits array.
pub struct Logits(Array2<f32>);

impl Deref for Logits {
    type Target = Array2<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Debug for Logits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Logits({:?})", self.0.dim())
    }
}

impl From<Array2<f32>> for Logits {
    fn from(arr: Array2<f32>) -> Self {
        Self(arr)
    }
}

impl Logits {
    /// Creates Logits from a 3D DynValue, supporting both f32 and f16.
    ///
    /// The input shape is `[batch_size, decoder_sequence_length, vocab_size]`
    /// with a sequence length of 1, which is dropped.
    pub fn from_3d_dyn_value(value: &DynValue) -> Result<Self> {
        let (shape, data): (Vec<usize>, Vec<f32>) =
            if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                (shape.iter().map(|&x| x as usize).collect(), data.to_vec())
            } else if let Ok((shape, data)) = value.try_extract_tensor::<f16>() {
                (
                    shape.iter().map(|&x| x as usize).collect(),
                    data.iter().map(|e| f32::from(*e)).collect(),
                )
            } else {
                return Err(StudioError::model_inference_failed(
                    "Logits must be f32 or f16",
                ));
            };

        let arr = Array::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| {
                StudioError::model_inference_failed(format!("Failed to create array: {}", e))
            })?
            .into_dimensionality::<Ix3>()
            .map_err(|e| {
                StudioError::model_inference_failed(format!("Expected 3D logits: {}", e))
            })?;

        Ok(Self(arr.remove_axis(Axis(1))))
    }

    /// Applies classifier-free guidance.
    ///
    /// The first half of the batch holds conditional logits and the second
    /// half unconditional ones. Produces `uncond + (cond - uncond) * scale`.
    pub fn apply_free_guidance(self, guidance_scale: f32) -> Result<Self> {
        let rows = self.0.nrows();
        if rows % 2 != 0 {
            return Err(StudioError::model_inference_failed(format!(
                "Guidance needs an even batch, got {}",
                rows
            )));
        }

        let half = rows / 2;
        let cond = self.0.slice(s![0..half, ..]);
        let uncond = self.0.slice(s![half.., ..]);
        Ok(Self((&cond - &uncond) * guidance_scale + uncond))
    }

    /// Samples one token per batch row from the `k` most likely tokens.
    pub fn sample_top_k<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Result<Vec<i64>> {
        let probs = self.0.softmax(Axis(1));
        let mut tokens = Vec::with_capacity(probs.nrows());

        for row in probs.axis_iter(Axis(0)) {
            let k = k.clamp(1, row.len().max(1));

            let mut ranked: Vec<(i64, f32)> =
                row.iter().enumerate().map(|(i, p)| (i as i64, *p)).collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            ranked.truncate(k);

            let distribution = WeightedIndex::new(ranked.iter().map(|e| e.1)).map_err(|e| {
                StudioError::model_inference_failed(format!("Invalid token distribution: {}", e))
            })?;

            tokens.push(ranked[distribution.sample(rng)].0);
        }

        Ok(tokens)
    }

    /// Picks the most likely token of each batch row.
    pub fn argmax(&self) -> Vec<i64> {
        self.0
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
                        if v > best.1 {
                            (i, v)
                        } else {
                            best
                        }
                    })
                    .0 as i64
            })
            .collect()
    }

    /// Selects the next token of each row according to the decoding policy.
    pub fn select<R: Rng + ?Sized>(
        &self,
        use_sampling: bool,
        top_k: usize,
        rng: &mut R,
    ) -> Result<Vec<i64>> {
        if use_sampling {
            self.sample_top_k(top_k, rng)
        } else {
            Ok(self.argmax())
        }
    }
}
