// src/protocol/codec.rs

//! JSON framing for protocol messages.
//!
//! Decoding failures on inbound frames are protocol violations, not JSON
//! errors: the peer sent something we cannot act on.

use crate::errors::{BisectError, Result};
use crate::protocol::messages::{ClientMessage, ServerMessage};

pub fn decode_server(frame: &str) -> Result<ServerMessage> {
    serde_json::from_str(frame).map_err(|e| {
        BisectError::Protocol(format!("undecodable message from oracle ({e}): {}", preview(frame)))
    })
}

pub fn encode_client(message: &ClientMessage) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode_client(frame: &str) -> Result<ClientMessage> {
    serde_json::from_str(frame).map_err(|e| {
        BisectError::Protocol(format!("undecodable message from client ({e}): {}", preview(frame)))
    })
}

pub fn encode_server(message: &ServerMessage) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// First few characters of a frame, for error messages. DAG listings can be
/// megabytes long.
fn preview(frame: &str) -> String {
    const MAX: usize = 80;
    match frame.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &frame[..idx]),
        None => frame.to_string(),
    }
}
