//! Wire protocol and board types for the 4 in a Row arena.
//!
//! Everything in this crate is pure data: the frames exchanged over the
//! real-time channel, the board snapshot the service pushes, and the
//! leaderboard rows its REST endpoint returns. No I/O lives here, which is
//! what lets the session state machine be tested without a transport.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod frames;
mod standings;

pub use board::{BoardSnapshot, COLS, Cell, InvalidCode, ROWS, Seat};
pub use frames::{ClientFrame, MatchStart, MoveIntent, ServerFrame};
pub use standings::LeaderboardEntry;
