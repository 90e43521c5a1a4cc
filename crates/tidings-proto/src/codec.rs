//! JSON codec for wire frames.
//!
//! Thin wrappers over `serde_json` that pin down the failure contract:
//! encoding internally-constructed requests cannot fail in practice, and
//! decoding returns an error for the caller to log and drop rather than
//! panicking on hostile input.

use crate::errors::Result;
use crate::messages::{ClientRequest, ServerFrame};

/// Encode an outbound request as a JSON text frame.
pub fn encode(request: &ClientRequest) -> Result<String> {
    Ok(serde_json::to_string(request)?)
}

/// Decode an inbound JSON text frame.
///
/// Fails on malformed JSON, an unknown `type` discriminator, or a payload
/// that does not match the discriminated shape. The connection stays open
/// either way; the caller drops the frame.
pub fn decode(raw: &str) -> Result<ServerFrame> {
    Ok(serde_json::from_str(raw)?)
}
