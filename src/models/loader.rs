//! Model loader for MusicGen ONNX models.
//!
//! Loads the model ensemble once and exposes it as a [`GenerationEngine`].

use std::path::Path;

use log::{debug, info};
use ort::session::Session;
use rand::thread_rng;

use crate::error::{Result, StudioError};
use crate::types::{AudioTensor, ModelConfig};

use super::audio_codec::MusicGenAudioCodec;
use super::decoder::{DecodingPolicy, MusicGenDecoder};
use super::engine::{GenerationEngine, GenerationParams};
use super::logits::DEFAULT_GUIDANCE_SCALE;
use super::text_encoder::MusicGenTextEncoder;

/// Required model files for MusicGen.
pub const REQUIRED_MODEL_FILES: &[&str] = &[
    "tokenizer.json",
    "text_encoder.onnx",
    "decoder_model.onnx",
    "decoder_with_past_model.onnx",
    "encodec_decode.onnx",
];

/// HuggingFace model URLs for musicgen-small-fp16.
pub const MODEL_URLS: &[(&str, &str)] = &[
    (
        "config.json",
        "https://huggingface.co/gabotechs/music_gen/resolve/main/small/config.json",
    ),
    (
        "tokenizer.json",
        "https://huggingface.co/gabotechs/music_gen/resolve/main/small/tokenizer.json",
    ),
    (
        "text_encoder.onnx",
        "https://huggingface.co/gabotechs/music_gen/resolve/main/small_fp16/text_encoder.onnx",
    ),
    (
        "decoder_model.onnx",
        "https://huggingface.co/gabotechs/music_gen/resolve/main/small_fp16/decoder_model.onnx",
    ),
    (
        "decoder_with_past_model.onnx",
        concat!(
            "https://huggingface.co/gabotechs/music_gen/resolve/main/small_fp16/",
            "decoder_with_past_model.onnx"
        ),
    ),
    (
        "encodec_decode.onnx",
        "https://huggingface.co/gabotechs/music_gen/resolve/main/small_fp16/encodec_decode.onnx",
    ),
];

/// Builds an ONNX Runtime session for one model file.
pub(crate) fn session_from_file(path: &Path, threads: Option<usize>) -> Result<Session> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut builder = Session::builder()
        .map_err(|e| StudioError::model_load_failed(format!("Failed to create session: {}", e)))?;

    if let Some(threads) = threads {
        builder = builder.with_intra_threads(threads).map_err(|e| {
            StudioError::model_load_failed(format!("Failed to set thread count: {}", e))
        })?;
    }

    builder
        .commit_from_file(path)
        .map_err(|e| StudioError::model_load_failed(format!("Failed to load {}: {}", name, e)))
}

/// Returns the required model files missing from `model_dir`.
pub fn missing_model_files(model_dir: &Path) -> Vec<&'static str> {
    REQUIRED_MODEL_FILES
        .iter()
        .copied()
        .filter(|file| !model_dir.join(file).exists())
        .collect()
}

/// Checks if all required model files exist in the directory.
pub fn check_models(model_dir: &Path) -> Result<()> {
    let missing = missing_model_files(model_dir);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StudioError::model_not_found(format!(
            "{} (missing: {})",
            model_dir.display(),
            missing.join(", ")
        )))
    }
}

/// The loaded MusicGen ensemble.
///
/// Construct once with [`MusicGenModels::load`] and hand it to the
/// generator; it is reused for every request.
pub struct MusicGenModels {
    text_encoder: MusicGenTextEncoder,
    decoder: MusicGenDecoder,
    audio_codec: MusicGenAudioCodec,
    config: ModelConfig,
    version: String,
    params: GenerationParams,
}

impl MusicGenModels {
    /// Loads all sessions from `model_dir`.
    ///
    /// The directory must contain every file in [`REQUIRED_MODEL_FILES`];
    /// `config.json` is optional.
    pub fn load(model_dir: &Path, threads: Option<usize>) -> Result<Self> {
        check_models(model_dir)?;

        let config = load_or_default_config(model_dir)?;
        if let Some(problem) = config.validate() {
            return Err(StudioError::model_load_failed(format!(
                "Invalid model config: {}",
                problem
            )));
        }

        info!("Loading text encoder...");
        let text_encoder = MusicGenTextEncoder::load(model_dir, threads)?;

        info!("Loading decoder models...");
        let decoder = MusicGenDecoder::load(model_dir, config.clone(), threads)?;

        info!("Loading audio codec...");
        let audio_codec = MusicGenAudioCodec::load(model_dir, threads)?;

        let version = detect_model_version(model_dir);
        info!("All models loaded ({})", version);

        Ok(Self {
            text_encoder,
            decoder,
            audio_codec,
            config,
            version,
            params: GenerationParams::default(),
        })
    }

    fn generate_one(
        &mut self,
        description: &str,
        max_tokens: usize,
        policy: &DecodingPolicy,
    ) -> Result<AudioTensor> {
        let encoded = self.text_encoder.encode(description)?;

        debug!("Generating {} token frames", max_tokens);
        let frames = self
            .decoder
            .generate_tokens(encoded, max_tokens, policy, &mut thread_rng())?;

        debug!("Decoding {} frames to audio", frames.len());
        self.audio_codec.decode(&frames)
    }
}

impl GenerationEngine for MusicGenModels {
    fn configure(&mut self, params: GenerationParams) {
        self.params = params;
    }

    fn params(&self) -> GenerationParams {
        self.params
    }

    fn infer(&mut self, descriptions: &[String]) -> Result<Vec<AudioTensor>> {
        let params = self.params;
        let max_tokens = token_budget(&self.config, params.duration_sec)?;

        let policy = DecodingPolicy {
            use_sampling: params.use_sampling,
            top_k: params.top_k,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
        };

        let mut outputs = Vec::with_capacity(descriptions.len());
        for description in descriptions {
            outputs.push(self.generate_one(description, max_tokens, &policy)?);
        }
        Ok(outputs)
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

/// Returns the token frames to decode for `duration_sec`.
///
/// Rejects durations the decoder cannot produce before any inference runs.
fn token_budget(config: &ModelConfig, duration_sec: u32) -> Result<usize> {
    if duration_sec == 0 {
        return Err(StudioError::model_inference_failed(
            "duration must be a positive number of seconds",
        ));
    }

    let max = config.max_duration_sec();
    if duration_sec > max {
        return Err(StudioError::model_inference_failed(format!(
            "duration {}s exceeds the model limit of {}s",
            duration_sec, max
        )));
    }

    Ok(config.tokens_for_duration(duration_sec))
}

/// Loads model configuration from config.json or uses defaults.
fn load_or_default_config(model_dir: &Path) -> Result<ModelConfig> {
    let config_path = model_dir.join("config.json");
    if !config_path.exists() {
        return Ok(ModelConfig::musicgen_small());
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        StudioError::model_load_failed(format!("Failed to read config.json: {}", e))
    })?;
    let json: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        StudioError::model_load_failed(format!("Failed to parse config.json: {}", e))
    })?;

    ModelConfig::from_hf_json(&json).ok_or_else(|| {
        StudioError::model_load_failed("config.json missing 'decoder' section")
    })
}

/// Detects model version from directory name.
fn detect_model_version(model_dir: &Path) -> String {
    let dir_name = model_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let size = if dir_name.contains("medium") { "medium" } else { "small" };
    let precision = if dir_name.contains("fp32") { "fp32" } else { "fp16" };
    format!("musicgen-{}-{}-v1", size, precision)
}
