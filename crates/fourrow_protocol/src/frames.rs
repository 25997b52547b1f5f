//! Frames exchanged on the real-time channel.
//!
//! Every frame is a tagged JSON object: `{"kind": ..., "payload": ...}`.
//! Deserialization of an unknown or malformed kind fails; the connection
//! layer drops such frames rather than surfacing them.

use serde::{Deserialize, Serialize};

use crate::board::{BoardSnapshot, Seat};

/// Inbound frames from the authoritative peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerFrame {
    /// A match was assigned; the session leaves the waiting room.
    MatchStart(MatchStart),
    /// A fresh authoritative board snapshot.
    StateUpdate(BoardSnapshot),
}

/// Payload of a [`ServerFrame::MatchStart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStart {
    /// Opaque room token; echoed back on every move.
    pub room_id: String,
    /// Display name of the opponent.
    pub opponent: String,
    /// Seat assigned to the local player. Older peers omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<Seat>,
}

/// Outbound frames from the client to the peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientFrame {
    /// Request to occupy a column.
    Move(MoveIntent),
}

/// A user intent to drop a piece. Constructed at gate-pass, transmitted,
/// discarded; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIntent {
    /// Target column index.
    pub column: usize,
    /// Room the move belongs to.
    pub room_id: String,
}
