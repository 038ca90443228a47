//! Text encoder wrapper for MusicGen.
//!
//! Tokenizes descriptions and runs the T5 encoder over them.

use std::path::Path;

use ort::session::Session;
use ort::value::{DynValue, Tensor};
use tokenizers::Tokenizer;

use crate::error::{Result, StudioError};

use super::loader::session_from_file;

/// Encoder output for one description.
pub struct EncodedText {
    /// `[1, tokens, d_model]` hidden states.
    pub hidden_states: DynValue,
    /// `[1, tokens]` attention mask of ones.
    pub attention_mask: DynValue,
}

/// MusicGen text encoder combining tokenizer and T5 encoder.
pub struct MusicGenTextEncoder {
    tokenizer: Tokenizer,
    session: Session,
}

impl MusicGenTextEncoder {
    /// Loads `tokenizer.json` and `text_encoder.onnx` from the given directory.
    pub fn load(model_dir: &Path, threads: Option<usize>) -> Result<Self> {
        let mut tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json")).map_err(|e| {
            StudioError::model_load_failed(format!("Failed to load tokenizer: {}", e))
        })?;

        tokenizer
            .with_padding(None)
            .with_truncation(None)
            .map_err(|e| {
                StudioError::model_load_failed(format!("Failed to configure tokenizer: {}", e))
            })?;

        let session = session_from_file(&model_dir.join("text_encoder.onnx"), threads)?;

        Ok(Self { tokenizer, session })
    }

    /// Encodes a description into hidden states and an attention mask.
    pub fn encode(&mut self, text: &str) -> Result<EncodedText> {
        let ids: Vec<i64> = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| {
                StudioError::model_inference_failed(format!("Tokenization failed: {}", e))
            })?
            .get_ids()
            .iter()
            .map(|&id| id as i64)
            .collect();

        let len = ids.len();
        let input_ids = Tensor::from_array(([1, len], ids)).map_err(|e| {
            StudioError::model_inference_failed(format!("Failed to create input tensor: {}", e))
        })?;
        let mask = attention_mask(len)?;

        let mut outputs = self
            .session
            .run(ort::inputs![input_ids, mask])
            .map_err(|e| {
                StudioError::model_inference_failed(format!("Text encoder inference failed: {}", e))
            })?;

        let hidden_states = outputs.remove("last_hidden_state").ok_or_else(|| {
            StudioError::model_inference_failed("last_hidden_state not found in output")
        })?;

        // The decoder cross-attends over the same tokens.
        Ok(EncodedText {
            hidden_states,
            attention_mask: attention_mask(len)?.into_dyn(),
        })
    }
}

/// Builds a `[1, len]` mask of ones.
fn attention_mask(len: usize) -> Result<Tensor<i64>> {
    Tensor::from_array(([1, len], vec![1i64; len])).map_err(|e| {
        StudioError::model_inference_failed(format!("Failed to create attention mask: {}", e))
    })
}
