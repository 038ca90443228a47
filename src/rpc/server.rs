//! JSON-RPC server over stdin/stdout.
//!
//! One request per line, one response per line. Requests are handled in
//! arrival order; a `generate` call blocks the loop until its clips are
//! written.

use std::io::{self, BufRead, Write};

use log::{error, info, warn};

use crate::audio::Materializer;
use crate::config::StudioConfig;
use crate::error::Result;
use crate::generation::MusicGenerator;
use crate::models::GenerationEngine;

use super::methods::handle_request;
use super::types::{
    JsonRpcError, JsonRpcErrorResponse, JsonRpcRequest, JsonRpcResponse, RequestId,
    JSONRPC_VERSION,
};

/// State shared across all request handlers.
pub struct ServerState<E: GenerationEngine> {
    /// Generator over the engine loaded at startup.
    pub generator: MusicGenerator<E>,
    /// Writes generated clips to the output directory.
    pub materializer: Materializer,
    /// Configuration the server was started with.
    pub config: StudioConfig,
    shutdown: bool,
}

impl<E: GenerationEngine> ServerState<E> {
    /// Creates server state around a loaded generator.
    ///
    /// Fails with `INVALID_CONFIG` when the configured sample rate differs
    /// from the engine's output rate.
    pub fn new(generator: MusicGenerator<E>, config: StudioConfig) -> Result<Self> {
        config.check_engine_rate(generator.engine().sample_rate())?;
        Ok(Self {
            generator,
            materializer: Materializer::new(config.materializer()),
            config,
            shutdown: false,
        })
    }

    /// Signals the server to shut down after the current response.
    pub fn shutdown(&mut self) {
        self.shutdown = true;
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }
}

/// Runs the JSON-RPC server on the process's stdin and stdout.
pub fn run_server<E: GenerationEngine>(state: ServerState<E>) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(state, stdin.lock(), stdout.lock())
}

/// Serves requests from `reader`, writing responses to `writer`.
pub fn serve<E, R, W>(mut state: ServerState<E>, reader: R, mut writer: W) -> Result<()>
where
    E: GenerationEngine,
    R: BufRead,
    W: Write,
{
    info!("JSON-RPC server started, waiting for requests...");

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Error reading stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = process_request(&line, &mut state) {
            if let Err(e) = writeln!(writer, "{}", response).and_then(|_| writer.flush()) {
                error!("Error writing response: {}", e);
                break;
            }
        }

        if state.is_shutdown() {
            info!("Server shutdown requested");
            break;
        }
    }

    info!("JSON-RPC server stopped");
    Ok(())
}

/// Processes a single JSON-RPC request line.
///
/// Returns the response line, or `None` for notifications.
pub(crate) fn process_request<E: GenerationEngine>(
    line: &str,
    state: &mut ServerState<E>,
) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            let error = JsonRpcError::parse_error(format!("Invalid JSON: {}", e));
            return Some(error_line(None, error));
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
        Ok(r) => r,
        Err(e) => {
            let id = value
                .get("id")
                .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
            let error = JsonRpcError::invalid_request(format!("Invalid request: {}", e));
            return Some(error_line(id, error));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        let error = JsonRpcError::invalid_request("Invalid JSON-RPC version (expected 2.0)");
        return request.id.map(|id| error_line(Some(id), error));
    }

    let result = handle_request(&request.method, request.params, state);
    if let Err(ref error) = result {
        warn!("{} failed: {}", request.method, error.message);
    }

    let id = request.id?;
    Some(match result {
        Ok(result) => serde_json::to_string(&JsonRpcResponse::new(id, result)).unwrap_or_default(),
        Err(error) => error_line(Some(id), error),
    })
}

fn error_line(id: Option<RequestId>, error: JsonRpcError) -> String {
    serde_json::to_string(&JsonRpcErrorResponse::new(id, error)).unwrap_or_default()
}
