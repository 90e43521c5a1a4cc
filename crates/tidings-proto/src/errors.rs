//! Protocol error types.

use thiserror::Error;

/// Errors produced while encoding or decoding wire frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame was not valid JSON, or its discriminator/shape was not
    /// recognized.
    ///
    /// Callers are expected to log and drop the offending frame; decode
    /// failures never tear down the connection.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Convenience result alias for protocol operations.
pub type Result<T> = core::result::Result<T, ProtocolError>;
