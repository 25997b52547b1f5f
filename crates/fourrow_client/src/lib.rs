//! Real-time client for the 4 in a Row arena.
//!
//! The library follows the shape of a game: the connection layer owns the
//! WebSocket channel and turns raw frames into typed events, the session
//! state machine folds those events into a phase, the client driver glues
//! the two together behind the user-intent surface (join, drop a piece,
//! disconnect, restart), and the leaderboard poller fetches standings
//! independently of any game.
//!
//! The remote service is authoritative for all game rules; this client
//! only mirrors the state it pushes and gates what the user may send.
//!
//! # Example
//!
//! ```no_run
//! use fourrow_client::{ClientConfig, ClientEvent, GameClient};
//!
//! # async fn example() {
//! let mut client = GameClient::new(ClientConfig::new("ws://localhost:8080/ws".into()));
//! client.join("alice");
//!
//! while let Some(event) = client.next_event().await {
//!     match event {
//!         ClientEvent::Won(notice) if notice.local_win => println!("you win!"),
//!         ClientEvent::Reset => break,
//!         _ => {}
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod connection;
mod error;
mod leaderboard;
mod session;

// Crate-level exports - client driver
pub use client::{ClientConfig, ClientEvent, GameClient};

// Crate-level exports - connection management
pub use connection::{Channel, ChannelEvent, ChannelEventKind, Transport, WsTransport};

// Crate-level exports - errors
pub use error::ClientError;

// Crate-level exports - leaderboard polling
pub use leaderboard::{
    DEFAULT_POLL_PERIOD, HttpStandingsSource, LeaderboardPoller, PollerHandle, StandingsSource,
};

// Crate-level exports - session state machine
pub use session::{Phase, Session, SessionEvent, WinNotice};
