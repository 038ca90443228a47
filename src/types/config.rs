//! ModelConfig type for MusicGen model parameters.
//!
//! Holds the architecture values of the MusicGen ONNX ensemble that the
//! decoder needs to shape its inputs and KV cache.

use serde::{Deserialize, Serialize};

/// Configuration parameters for the MusicGen model architecture.
///
/// Values come from the model's `config.json` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Token vocabulary size per codebook.
    pub vocab_size: u32,

    /// Number of decoder transformer layers.
    pub num_hidden_layers: u32,

    /// Number of attention heads in each layer.
    pub num_attention_heads: u32,

    /// Hidden dimension of the text encoder.
    pub d_model: u32,

    /// Key/value dimension per attention head.
    pub d_kv: u32,

    /// Number of audio channels produced by the codec (mono).
    pub audio_channels: u32,

    /// Audio sample rate of the codec output in Hz.
    pub sample_rate: u32,

    /// Number of EnCodec codebooks.
    pub codebooks: u32,

    /// Token frames produced per second of audio.
    pub frame_rate: u32,

    /// Padding token ID for the decoder.
    pub pad_token_id: i64,

    /// Longest decoder sequence the positional embeddings cover.
    pub max_position_embeddings: u32,
}

impl ModelConfig {
    /// Creates a ModelConfig for the musicgen-small model.
    pub fn musicgen_small() -> Self {
        Self {
            vocab_size: 2048,
            num_hidden_layers: 24,
            num_attention_heads: 16,
            d_model: 1024,
            d_kv: 64,
            audio_channels: 1,
            sample_rate: 32000,
            codebooks: 4,
            frame_rate: 50,
            pad_token_id: 2048,
            max_position_embeddings: 2048,
        }
    }

    /// Reads the architecture values from a parsed HuggingFace `config.json`.
    ///
    /// Missing fields fall back to the musicgen-small values. Returns `None`
    /// when the document has no `decoder` section.
    pub fn from_hf_json(json: &serde_json::Value) -> Option<Self> {
        let defaults = Self::musicgen_small();
        let decoder = json.get("decoder")?;
        let text_encoder = json.get("text_encoder");
        let audio_encoder = json.get("audio_encoder");

        let read_u32 = |section: Option<&serde_json::Value>, key: &str, fallback: u32| {
            section
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .unwrap_or(fallback)
        };

        Some(Self {
            vocab_size: read_u32(Some(decoder), "vocab_size", defaults.vocab_size),
            num_hidden_layers: read_u32(
                Some(decoder),
                "num_hidden_layers",
                defaults.num_hidden_layers,
            ),
            num_attention_heads: read_u32(
                Some(decoder),
                "num_attention_heads",
                defaults.num_attention_heads,
            ),
            d_model: read_u32(text_encoder, "d_model", defaults.d_model),
            d_kv: read_u32(text_encoder, "d_kv", defaults.d_kv),
            audio_channels: read_u32(audio_encoder, "audio_channels", defaults.audio_channels),
            sample_rate: read_u32(audio_encoder, "sampling_rate", defaults.sample_rate),
            codebooks: read_u32(Some(decoder), "num_codebooks", defaults.codebooks),
            frame_rate: defaults.frame_rate,
            pad_token_id: decoder
                .get("pad_token_id")
                .and_then(|v| v.as_i64())
                .unwrap_or(defaults.pad_token_id),
            max_position_embeddings: read_u32(
                Some(decoder),
                "max_position_embeddings",
                defaults.max_position_embeddings,
            ),
        })
    }

    /// Validates the configuration for consistency.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.vocab_size == 0 {
            return Some("vocab_size must be > 0".to_string());
        }

        if self.num_hidden_layers == 0 {
            return Some("num_hidden_layers must be > 0".to_string());
        }

        if self.num_attention_heads == 0 {
            return Some("num_attention_heads must be > 0".to_string());
        }

        if self.sample_rate == 0 || self.frame_rate == 0 {
            return Some("sample_rate and frame_rate must be > 0".to_string());
        }

        // The decoder feeds exactly four codebooks per step.
        if self.codebooks != 4 {
            return Some(format!("codebooks must be 4, got {}", self.codebooks));
        }

        None
    }

    /// Returns the number of token frames needed for the given duration.
    pub fn tokens_for_duration(&self, duration_sec: u32) -> usize {
        duration_sec as usize * self.frame_rate as usize
    }

    /// Returns the longest duration the decoder can produce in one pass.
    ///
    /// The delay pattern adds `codebooks - 1` steps on top of the frames.
    pub fn max_duration_sec(&self) -> u32 {
        let delay = self.codebooks.saturating_sub(1);
        self.max_position_embeddings.saturating_sub(delay) / self.frame_rate.max(1)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::musicgen_small()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn musicgen_small_config() {
        let config = ModelConfig::musicgen_small();
        assert_eq!(config.vocab_size, 2048);
        assert_eq!(config.num_hidden_layers, 24);
        assert_eq!(config.sample_rate, 32000);
        assert_eq!(config.codebooks, 4);
        assert!(config.validate().is_none());
    }

    #[test]
    fn config_validation() {
        let mut config = ModelConfig::musicgen_small();
        config.codebooks = 8;
        assert!(config.validate().is_some());
    }

    #[test]
    fn token_and_sample_counts() {
        let config = ModelConfig::musicgen_small();
        assert_eq!(config.tokens_for_duration(5), 250);
    }

    #[test]
    fn duration_limit_follows_position_embeddings() {
        let mut config = ModelConfig::musicgen_small();
        // (2048 - 3) / 50
        assert_eq!(config.max_duration_sec(), 40);

        config.max_position_embeddings = 1503;
        assert_eq!(config.max_duration_sec(), 30);

        config.max_position_embeddings = 2;
        assert_eq!(config.max_duration_sec(), 0);
    }

    #[test]
    fn from_hf_json_reads_nested_sections() {
        let json = serde_json::json!({
            "decoder": {
                "num_hidden_layers": 48,
                "num_attention_heads": 24,
                "pad_token_id": 2048,
                "max_position_embeddings": 1024
            },
            "text_encoder": { "d_model": 768, "d_kv": 64 },
            "audio_encoder": { "sampling_rate": 32000 }
        });
        let config = ModelConfig::from_hf_json(&json).unwrap();
        assert_eq!(config.num_hidden_layers, 48);
        assert_eq!(config.num_attention_heads, 24);
        assert_eq!(config.d_model, 768);
        assert_eq!(config.vocab_size, 2048);
        assert_eq!(config.max_position_embeddings, 1024);
    }

    #[test]
    fn from_hf_json_requires_decoder() {
        let json = serde_json::json!({ "text_encoder": {} });
        assert!(ModelConfig::from_hf_json(&json).is_none());
    }
}
