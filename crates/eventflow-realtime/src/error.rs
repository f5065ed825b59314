//! Error types for the real-time channel.

use thiserror::Error;

/// Errors that can occur on the real-time channel.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket protocol or handshake error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Event could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Server rejected the authentication handshake.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The connection was closed by the peer or dropped.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Unexpected frame or event for the current state.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation attempted on a transport that is not connected.
    #[error("Transport is not connected")]
    NotConnected,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
