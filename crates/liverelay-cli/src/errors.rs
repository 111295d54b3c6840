//! Errors reported by the client.

use std::io;
use std::sync::Arc;

use ortho_config::OrthoError;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ClientError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<OrthoError>),
    #[error("parameter '{0}' must have the form KEY=VALUE")]
    MalformedParameter(String),
    #[error("parameter key '{0}' is reserved")]
    ReservedKey(String),
    #[error("failed to resolve relay address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to relay at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[error("failed to serialise request: {0}")]
    SerialiseRequest(serde_json::Error),
    #[error("failed to send request to relay: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response from relay: {0}")]
    ReadResponse(io::Error),
    #[error("relay closed the connection without responding")]
    ConnectionClosed,
    #[error("failed to parse relay response: {0}")]
    ParseResponse(serde_json::Error),
    #[error("failed to render response: {0}")]
    RenderResponse(serde_json::Error),
    #[error("failed to write response: {0}")]
    ForwardResponse(io::Error),
}
