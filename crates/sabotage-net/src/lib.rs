//! Network layer for sabotaged
//!
//! Provides:
//! - WebSocket server, one JSON object per text frame
//! - Origin check during the handshake
//! - Per-connection delivery plus broadcast to every connection
//! - A small client for tests and tooling

mod client;
mod server;

pub use client::*;
pub use server::*;

use thiserror::Error;

/// Network errors
#[derive(Debug, Error)]
pub enum NetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Server error: {0}")]
    ServerError(String),
}

pub type NetResult<T> = Result<T, NetError>;
