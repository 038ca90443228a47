//! JSON-RPC types for the stdio protocol.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DURATION_SEC;
use crate::error::{ErrorCode, StudioError};
use crate::types::AudioClip;

pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier, echoed back in the response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

/// One request line. A request without `id` is a notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Successful response line.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    pub result: T,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(id: RequestId, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// Error response line. `id` is null when the request could not be parsed.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

/// Carried by application errors only.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorData {
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl JsonRpcError {
    fn plain(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Request line is not valid JSON.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::plain(-32700, message)
    }

    /// Request is JSON but not a JSON-RPC 2.0 request.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::plain(-32600, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::plain(-32601, format!("Unknown method '{}'", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::plain(-32602, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::plain(-32603, message)
    }
}

/// Application error codes start at -32000.
fn application_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ModelNotFound => -32000,
        ErrorCode::ModelLoadFailed => -32001,
        ErrorCode::ModelDownloadFailed => -32002,
        ErrorCode::ModelInferenceFailed => -32003,
        ErrorCode::InvalidDuration => -32005,
        ErrorCode::InvalidPrompt => -32006,
        ErrorCode::InvalidTensorShape => -32007,
        ErrorCode::AudioWriteFailed => -32008,
        ErrorCode::InvalidConfig => -32009,
    }
}

impl From<&StudioError> for JsonRpcError {
    fn from(err: &StudioError) -> Self {
        Self {
            code: application_code(err.code),
            message: err.code.description().to_string(),
            data: Some(JsonRpcErrorData {
                error_code: err.code.as_str().to_string(),
                details: Some(err.to_string()),
            }),
        }
    }
}

impl From<StudioError> for JsonRpcError {
    fn from(err: StudioError) -> Self {
        Self::from(&err)
    }
}

/// Parameters of the `generate` method.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateParams {
    /// Free-text description of the music.
    pub description: String,
    /// Requested length in seconds (2-20).
    #[serde(default = "default_duration")]
    pub duration_sec: i64,
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_SEC as i64
}

/// Result of the `generate` method.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    /// Path of the first clip, the one offered for playback.
    pub path: String,
    /// Every clip written, in batch order.
    pub clips: Vec<AudioClip>,
    /// Duration of the first clip in seconds.
    pub duration_sec: f32,
    /// Sample rate of the written files.
    pub sample_rate: u32,
    /// Time spent generating, in seconds.
    pub generation_time_sec: f32,
    /// Engine version that produced the audio.
    pub model_version: String,
    /// Base64 of the first clip's WAV bytes.
    pub audio_base64: String,
    /// HTML anchor downloading the first clip.
    pub download_html: String,
}
