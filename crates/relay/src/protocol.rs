//! Protocol module - line-delimited JSON messages between host and clients
//!
//! One message per line, tagged by `"type"`. Gameplay payloads are opaque to
//! the host and relayed untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

/// Session-stable participant identifier. The host is always 0.
pub type PeerId = u32;

pub const HOST_ID: PeerId = 0;

// ============== Client -> Host ==============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello { name: String },
    Event { payload: Value },
    Ended { score: u32 },
}

// ============== Host -> Client ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// Reply to `hello`: the new client's id and everyone already present.
    Welcome { id: PeerId, peers: Vec<Peer> },
    Joined { id: PeerId, name: String },
    Left { id: PeerId },
    Started,
    Rejected { reason: String },
    Event { from: PeerId, payload: Value },
    Ended { id: PeerId, score: u32 },
    Winner { id: PeerId, score: u32 },
}

pub fn parse_client_message(line: &str) -> Result<ClientMessage, RelayError> {
    serde_json::from_str(line.trim()).map_err(|e| RelayError::Protocol(e.to_string()))
}

pub fn parse_host_message(line: &str) -> Result<HostMessage, RelayError> {
    serde_json::from_str(line.trim()).map_err(|e| RelayError::Protocol(e.to_string()))
}

/// Encode a message as one line, newline included.
pub fn encode_line<T: Serialize>(msg: &T) -> Result<String, RelayError> {
    let mut line = serde_json::to_string(msg).map_err(|e| RelayError::Protocol(e.to_string()))?;
    line.push('\n');
    Ok(line)
}
