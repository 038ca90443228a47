//! JSON-RPC method handlers.

use crate::audio::download_link_html;
use crate::audio::encode_base64;
use crate::generation::{generate_and_save, validate_request};
use crate::models::GenerationEngine;

use super::server::ServerState;
use super::types::{GenerateParams, GenerateResult, JsonRpcError};

/// Handles a JSON-RPC method call.
pub fn handle_request<E: GenerationEngine>(
    method: &str,
    params: serde_json::Value,
    state: &mut ServerState<E>,
) -> Result<serde_json::Value, JsonRpcError> {
    match method {
        "generate" => handle_generate(params, state),
        "ping" => handle_ping(),
        "shutdown" => handle_shutdown(state),
        _ => Err(JsonRpcError::method_not_found(method)),
    }
}

/// Handles the ping method for health checks.
fn handle_ping() -> Result<serde_json::Value, JsonRpcError> {
    Ok(serde_json::json!({ "status": "ok" }))
}

/// Handles the shutdown method.
fn handle_shutdown<E: GenerationEngine>(
    state: &mut ServerState<E>,
) -> Result<serde_json::Value, JsonRpcError> {
    state.shutdown();
    Ok(serde_json::json!({ "status": "shutting_down" }))
}

/// Handles the generate method.
///
/// Generation blocks the server loop until the clips are written; the
/// response carries the first clip for playback and download.
fn handle_generate<E: GenerationEngine>(
    params: serde_json::Value,
    state: &mut ServerState<E>,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: GenerateParams = serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;

    let duration_sec = validate_request(&params.description, params.duration_sec)?;

    let output = generate_and_save(
        &mut state.generator,
        &state.materializer,
        &params.description,
        duration_sec,
    )?;

    let first = output
        .first_clip()
        .ok_or_else(|| JsonRpcError::internal_error("No audio clip was written"))?
        .clone();

    let bytes = state.materializer.read_clip(first.index)?;

    let result = GenerateResult {
        path: first.path.to_string_lossy().into_owned(),
        duration_sec: first.duration_sec(),
        sample_rate: first.sample_rate,
        generation_time_sec: output.generation_time.as_secs_f32(),
        model_version: output.model_version.clone(),
        audio_base64: encode_base64(&bytes),
        download_html: download_link_html(&first.file_name(), &bytes, "Audio"),
        clips: output.clips,
    };

    serde_json::to_value(result)
        .map_err(|e| JsonRpcError::internal_error(format!("Failed to serialize result: {}", e)))
}
