//! Client error types.

use derive_more::{Display, Error};

/// Errors produced by the transport and polling layers.
///
/// Nothing here is fatal to the client: transport failures collapse the
/// session back to the lobby, and polling failures keep the previous
/// standings.
#[derive(Debug, Display, Error)]
pub enum ClientError {
    /// WebSocket transport failure.
    #[display("transport error: {source}")]
    Transport {
        /// Underlying tungstenite error.
        source: tokio_tungstenite::tungstenite::Error,
    },
    /// Leaderboard endpoint failure.
    #[display("leaderboard request failed: {source}")]
    Http {
        /// Underlying HTTP error.
        source: reqwest::Error,
    },
    /// Frame (de)serialization failure.
    #[display("codec error: {source}")]
    Codec {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Operation attempted on a channel that is no longer open.
    #[display("channel closed")]
    ChannelClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(source: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport { source }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(source: reqwest::Error) -> Self {
        Self::Http { source }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(source: serde_json::Error) -> Self {
        Self::Codec { source }
    }
}
