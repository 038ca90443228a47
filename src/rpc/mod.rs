//! JSON-RPC 2.0 server over stdio.
//!
//! Methods:
//! - `generate`: Generate music for a description and write it to disk
//! - `ping`: Health check
//! - `shutdown`: Stop the server

pub mod methods;
pub mod server;
pub mod types;

pub use server::{run_server, serve, ServerState};
pub use types::{
    GenerateParams, GenerateResult, JsonRpcError, JsonRpcErrorResponse, JsonRpcRequest,
    JsonRpcResponse, RequestId,
};
