//! Error types for promptwave.
//!
//! Defines the error codes and the error type used throughout the crate
//! for consistent error handling and reporting.

use std::fmt;

/// Error codes identifying the kind of failure.
///
/// These codes are also surfaced in JSON-RPC error responses so that
/// clients can react to specific conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// ONNX model files not found at expected path.
    /// Trigger: Model files missing from the model directory.
    ModelNotFound,

    /// Failed to load ONNX model into memory.
    /// Trigger: Corrupt file, wrong format, or OOM during load.
    ModelLoadFailed,

    /// Failed to download model from remote source.
    /// Trigger: Network error, disk full during download.
    ModelDownloadFailed,

    /// Model inference failed during generation.
    /// Trigger: Invalid generation configuration, numerical instability, OOM.
    ModelInferenceFailed,

    /// Audio tensor rank is neither 2 nor 3.
    /// Trigger: The engine returned a malformed tensor.
    InvalidTensorShape,

    /// Writing or reading an audio file failed.
    /// Trigger: Missing output directory, disk full, permissions.
    AudioWriteFailed,

    /// Requested duration is outside the accepted range.
    /// Trigger: Duration outside 2-20 seconds at the shell.
    InvalidDuration,

    /// Prompt text is invalid.
    /// Trigger: Empty description at the shell.
    InvalidPrompt,

    /// Runtime configuration is invalid.
    /// Trigger: Zero sample rate, zero top-k, or bad thread count.
    InvalidConfig,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ModelNotFound => "MODEL_NOT_FOUND",
            ErrorCode::ModelLoadFailed => "MODEL_LOAD_FAILED",
            ErrorCode::ModelDownloadFailed => "MODEL_DOWNLOAD_FAILED",
            ErrorCode::ModelInferenceFailed => "MODEL_INFERENCE_FAILED",
            ErrorCode::InvalidTensorShape => "INVALID_TENSOR_SHAPE",
            ErrorCode::AudioWriteFailed => "AUDIO_WRITE_FAILED",
            ErrorCode::InvalidDuration => "INVALID_DURATION",
            ErrorCode::InvalidPrompt => "INVALID_PROMPT",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ModelNotFound => "ONNX model files not found at expected path",
            ErrorCode::ModelLoadFailed => "Failed to load ONNX model into memory",
            ErrorCode::ModelDownloadFailed => "Failed to download model from remote source",
            ErrorCode::ModelInferenceFailed => "Model inference failed during generation",
            ErrorCode::InvalidTensorShape => "Audio tensor must have rank 2 or 3",
            ErrorCode::AudioWriteFailed => "Failed to write or read an audio file",
            ErrorCode::InvalidDuration => "Duration must be between 2 and 20 seconds",
            ErrorCode::InvalidPrompt => "Description must not be empty",
            ErrorCode::InvalidConfig => "Runtime configuration is invalid",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::ModelNotFound => {
                "Run once with network access to download models automatically, \
                 or manually download from https://huggingface.co/gabotechs/music_gen"
            }
            ErrorCode::ModelLoadFailed => {
                "Check available memory (4GB+ recommended), verify model files are not corrupted, \
                 or delete the model directory and re-download"
            }
            ErrorCode::ModelDownloadFailed => {
                "Check internet connection, verify disk space (500MB+ required), \
                 or try again later if HuggingFace is unavailable"
            }
            ErrorCode::ModelInferenceFailed => {
                "Check the duration is positive, try a shorter duration, or check system memory"
            }
            ErrorCode::InvalidTensorShape => {
                "The generation engine returned an unexpected tensor layout; \
                 expected [channels, time] or [batch, channels, time]"
            }
            ErrorCode::AudioWriteFailed => {
                "Make sure the output directory exists and is writable, \
                 and that disk space is available"
            }
            ErrorCode::InvalidDuration => {
                "Specify a duration between 2 and 20 seconds (e.g., duration_sec: 5)"
            }
            ErrorCode::InvalidPrompt => {
                "Provide a description of the music (e.g., 'calm piano melody')"
            }
            ErrorCode::InvalidConfig => {
                "Check the PROMPTWAVE_* environment variables and command-line flags"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for promptwave operations.
#[derive(Debug)]
pub struct StudioError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StudioError {
    /// Creates a new StudioError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new StudioError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a MODEL_NOT_FOUND error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ModelNotFound,
            format!("Model files not found at: {}", path.into()),
        )
    }

    /// Creates a MODEL_LOAD_FAILED error.
    pub fn model_load_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ModelLoadFailed,
            format!("Failed to load model: {}", reason.into()),
        )
    }

    /// Creates a MODEL_DOWNLOAD_FAILED error.
    pub fn model_download_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ModelDownloadFailed,
            format!("Failed to download model: {}", reason.into()),
        )
    }

    /// Creates a MODEL_INFERENCE_FAILED error.
    pub fn model_inference_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ModelInferenceFailed,
            format!("Inference failed: {}", reason.into()),
        )
    }

    /// Creates an INVALID_TENSOR_SHAPE error for a tensor of the given shape.
    pub fn invalid_tensor_shape(shape: &[usize]) -> Self {
        Self::new(
            ErrorCode::InvalidTensorShape,
            format!(
                "Audio tensor has rank {} (shape {:?}), expected rank 2 or 3",
                shape.len(),
                shape
            ),
        )
    }

    /// Creates an AUDIO_WRITE_FAILED error wrapping the underlying cause.
    pub fn audio_write_failed(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(ErrorCode::AudioWriteFailed, context, source)
    }

    /// Creates an INVALID_DURATION error.
    pub fn invalid_duration(duration: i64) -> Self {
        Self::new(
            ErrorCode::InvalidDuration,
            format!(
                "Invalid duration: {} seconds (must be between 2 and 20)",
                duration
            ),
        )
    }

    /// Creates an INVALID_PROMPT error for empty descriptions.
    pub fn empty_prompt() -> Self {
        Self::new(ErrorCode::InvalidPrompt, "Description cannot be empty")
    }

    /// Creates an INVALID_CONFIG error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfig,
            format!("Invalid configuration: {}", reason.into()),
        )
    }
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        write!(f, ". Recovery: {}", self.code.recovery_hint())
    }
}

impl std::error::Error for StudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using StudioError.
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_code_as_str() {
        assert_eq!(ErrorCode::ModelNotFound.as_str(), "MODEL_NOT_FOUND");
        assert_eq!(ErrorCode::ModelLoadFailed.as_str(), "MODEL_LOAD_FAILED");
        assert_eq!(ErrorCode::ModelDownloadFailed.as_str(), "MODEL_DOWNLOAD_FAILED");
        assert_eq!(ErrorCode::ModelInferenceFailed.as_str(), "MODEL_INFERENCE_FAILED");
        assert_eq!(ErrorCode::InvalidTensorShape.as_str(), "INVALID_TENSOR_SHAPE");
        assert_eq!(ErrorCode::AudioWriteFailed.as_str(), "AUDIO_WRITE_FAILED");
        assert_eq!(ErrorCode::InvalidDuration.as_str(), "INVALID_DURATION");
        assert_eq!(ErrorCode::InvalidPrompt.as_str(), "INVALID_PROMPT");
        assert_eq!(ErrorCode::InvalidConfig.as_str(), "INVALID_CONFIG");
    }

    #[test]
    fn error_code_recovery_hints_not_empty() {
        let codes = [
            ErrorCode::ModelNotFound,
            ErrorCode::ModelLoadFailed,
            ErrorCode::ModelDownloadFailed,
            ErrorCode::ModelInferenceFailed,
            ErrorCode::InvalidTensorShape,
            ErrorCode::AudioWriteFailed,
            ErrorCode::InvalidDuration,
            ErrorCode::InvalidPrompt,
            ErrorCode::InvalidConfig,
        ];
        for code in codes {
            assert!(!code.recovery_hint().is_empty(), "{} has no hint", code);
            assert!(!code.description().is_empty(), "{} has no description", code);
        }
    }

    #[test]
    fn studio_error_display() {
        let err = StudioError::invalid_duration(200);
        assert!(err.to_string().contains("INVALID_DURATION"));
        assert!(err.to_string().contains("200"));
        assert!(err.to_string().contains("Recovery:"));
    }

    #[test]
    fn tensor_shape_error_mentions_rank() {
        let err = StudioError::invalid_tensor_shape(&[4]);
        assert_eq!(err.code, ErrorCode::InvalidTensorShape);
        assert!(err.message.contains("rank 1"));
    }

    #[test]
    fn audio_write_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory");
        let err = StudioError::audio_write_failed("Failed to create audio_0.wav", io);
        assert_eq!(err.code, ErrorCode::AudioWriteFailed);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("no such directory"));
    }
}
