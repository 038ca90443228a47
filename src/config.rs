//! Runtime configuration.
//!
//! Contains the settings shared by the CLI and JSON-RPC front ends: where
//! the model lives, where clips are written, and the decoding defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::audio::{MaterializerConfig, DEFAULT_OUTPUT_DIR, SAMPLE_RATE};
use crate::error::{Result, StudioError};
use crate::models::DEFAULT_TOP_K;

/// Shortest duration accepted from users, in seconds.
pub const MIN_DURATION_SEC: u32 = 2;

/// Longest duration accepted from users, in seconds.
pub const MAX_DURATION_SEC: u32 = 20;

/// Duration used when the user does not pick one, in seconds.
pub const DEFAULT_DURATION_SEC: u32 = 5;

/// Runtime configuration for promptwave.
///
/// Loaded from environment variables at startup; command-line flags
/// override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Directory containing the MusicGen ONNX model files.
    /// If None, uses the platform-specific default cache location.
    pub model_path: Option<PathBuf>,

    /// Directory receiving `audio_{idx}.wav`.
    pub output_dir: PathBuf,

    /// Sample rate written into WAV headers.
    pub sample_rate: u32,

    /// Top-k truncation passed to the engine.
    pub top_k: usize,

    /// Number of threads for intra-op parallelism in ONNX Runtime.
    /// If None, uses ONNX Runtime's default.
    pub threads: Option<usize>,
}

impl StudioConfig {
    /// Creates a new StudioConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a StudioConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `PROMPTWAVE_MODEL_PATH` - Path to the MusicGen model directory
    /// - `PROMPTWAVE_OUTPUT_DIR` - Directory for generated clips
    /// - `PROMPTWAVE_SAMPLE_RATE` - Sample rate written to WAV files
    /// - `PROMPTWAVE_TOP_K` - Top-k truncation for sampling
    /// - `PROMPTWAVE_THREADS` - Number of ONNX Runtime threads
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("PROMPTWAVE_MODEL_PATH") {
            config.model_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("PROMPTWAVE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(path);
        }

        if let Some(rate) = lookup("PROMPTWAVE_SAMPLE_RATE").and_then(|v| v.parse::<u32>().ok()) {
            if rate > 0 {
                config.sample_rate = rate;
            }
        }

        if let Some(top_k) = lookup("PROMPTWAVE_TOP_K").and_then(|v| v.parse::<usize>().ok()) {
            if top_k > 0 {
                config.top_k = top_k;
            }
        }

        if let Some(threads) = lookup("PROMPTWAVE_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            if threads > 0 {
                config.threads = Some(threads);
            }
        }

        config
    }

    /// Returns the effective model path, using platform defaults if not specified.
    pub fn effective_model_path(&self) -> PathBuf {
        self.model_path.clone().unwrap_or_else(default_model_path)
    }

    /// Returns the materializer settings.
    pub fn materializer(&self) -> MaterializerConfig {
        MaterializerConfig {
            output_dir: self.output_dir.clone(),
            sample_rate: self.sample_rate,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.sample_rate == 0 {
            return Some("sample_rate must be > 0".to_string());
        }

        if self.top_k == 0 {
            return Some("top_k must be > 0".to_string());
        }

        if let Some(threads) = self.threads {
            if threads == 0 {
                return Some("threads must be > 0".to_string());
            }
            if threads > 256 {
                return Some(format!("threads too high: {} (max 256)", threads));
            }
        }

        None
    }

    /// Checks that the configured WAV rate matches the engine's output rate.
    ///
    /// Samples are written unresampled, so any other header rate would
    /// change pitch and reported duration.
    pub fn check_engine_rate(&self, engine_rate: u32) -> Result<()> {
        if self.sample_rate != engine_rate {
            return Err(StudioError::invalid_config(format!(
                "sample_rate {} does not match the engine's output rate {}",
                self.sample_rate, engine_rate
            )));
        }
        Ok(())
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            sample_rate: SAMPLE_RATE,
            top_k: DEFAULT_TOP_K,
            threads: None,
        }
    }
}

/// Returns the platform-specific default model storage path.
///
/// - macOS: ~/Library/Caches/promptwave/musicgen
/// - Linux: ~/.cache/promptwave/musicgen
/// - Windows: C:\Users\<user>\AppData\Local\promptwave\cache\musicgen
pub fn default_model_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "promptwave") {
        proj_dirs.cache_dir().join("musicgen")
    } else {
        PathBuf::from("./models/musicgen")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = StudioConfig::new();
        assert_eq!(config.output_dir, PathBuf::from("audio_output"));
        assert_eq!(config.sample_rate, 32000);
        assert_eq!(config.top_k, 250);
        assert!(config.threads.is_none());
        assert!(config.validate().is_none());
    }

    #[test]
    fn config_validation() {
        let mut config = StudioConfig::new();
        config.threads = Some(0);
        assert!(config.validate().is_some());

        config.threads = Some(4);
        assert!(config.validate().is_none());

        config.top_k = 0;
        assert!(config.validate().is_some());
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = StudioConfig::from_lookup(lookup_from(&[
            ("PROMPTWAVE_MODEL_PATH", "/models/small_fp16"),
            ("PROMPTWAVE_OUTPUT_DIR", "/tmp/clips"),
            ("PROMPTWAVE_SAMPLE_RATE", "48000"),
            ("PROMPTWAVE_TOP_K", "50"),
            ("PROMPTWAVE_THREADS", "8"),
        ]));
        assert_eq!(config.effective_model_path(), PathBuf::from("/models/small_fp16"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/clips"));
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.top_k, 50);
        assert_eq!(config.threads, Some(8));
    }

    #[test]
    fn lookup_ignores_invalid_values() {
        let config = StudioConfig::from_lookup(lookup_from(&[
            ("PROMPTWAVE_SAMPLE_RATE", "fast"),
            ("PROMPTWAVE_TOP_K", "0"),
            ("PROMPTWAVE_THREADS", "-1"),
        ]));
        assert_eq!(config.sample_rate, 32000);
        assert_eq!(config.top_k, 250);
        assert!(config.threads.is_none());
    }

    #[test]
    fn materializer_settings_follow_config() {
        let mut config = StudioConfig::new();
        config.output_dir = PathBuf::from("out");
        config.sample_rate = 16000;
        let materializer = config.materializer();
        assert_eq!(materializer.output_dir, PathBuf::from("out"));
        assert_eq!(materializer.sample_rate, 16000);
    }

    #[test]
    fn engine_rate_must_match() {
        let mut config = StudioConfig::new();
        assert!(config.check_engine_rate(32000).is_ok());

        config.sample_rate = 48000;
        let err = config.check_engine_rate(32000).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidConfig);
        assert!(err.message.contains("48000"));
    }

    #[test]
    fn effective_model_path_defaults_to_cache() {
        let config = StudioConfig::new();
        let path = config.effective_model_path();
        assert!(!path.as_os_str().is_empty());
        assert!(path.ends_with("musicgen"));
    }
}
