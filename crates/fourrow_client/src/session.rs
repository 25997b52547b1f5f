//! Session state machine: a pure follower of authoritative snapshots.
//!
//! The session never predicts or computes board states. It folds channel
//! events into a phase and mirrors whatever snapshot the peer last pushed,
//! so the transition table is testable without any transport.

use fourrow_protocol::{BoardSnapshot, Seat};
use strum::Display;
use tracing::{debug, info, instrument};

/// High-level mode of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Phase {
    /// Not connected; the initial state and the target of every reset.
    #[default]
    Lobby,
    /// Channel open, no match assigned yet.
    Waiting,
    /// Match assigned, snapshots flowing.
    Playing,
    /// A terminal snapshot arrived.
    Finished,
}

/// Input consumed by [`Session::apply`]: the closed set of things a channel
/// can report, flattened for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Transport handshake completed.
    Opened,
    /// The peer assigned a match.
    MatchStarted {
        /// Opaque room token.
        room_id: String,
        /// Opponent display name.
        opponent: String,
        /// Seat assigned to the local player, when the peer says.
        seat: Option<Seat>,
    },
    /// The peer pushed a fresh snapshot.
    SnapshotReceived(BoardSnapshot),
    /// The channel terminated, for any reason.
    Closed,
}

/// Notice yielded when a terminal snapshot names a winner.
///
/// Purely observational; consuming it must not feed back into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinNotice {
    /// The winning seat.
    pub winner: Seat,
    /// Whether the local player won. When the peer never assigned a seat
    /// this falls back to assuming the local player holds seat 1.
    pub local_win: bool,
}

/// The client's view of one game attempt, from join to reset.
#[derive(Debug, Clone)]
pub struct Session {
    identity: String,
    phase: Phase,
    room_id: Option<String>,
    opponent: Option<String>,
    seat: Option<Seat>,
    snapshot: Option<BoardSnapshot>,
}

impl Session {
    /// Creates a session for `identity`, starting in the lobby.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            phase: Phase::default(),
            room_id: None,
            opponent: None,
            seat: None,
            snapshot: None,
        }
    }

    /// Local display name, immutable once joined.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Room token assigned at match start.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Opponent name assigned at match start.
    pub fn opponent(&self) -> Option<&str> {
        self.opponent.as_deref()
    }

    /// Seat assigned to the local player, when known.
    pub fn seat(&self) -> Option<Seat> {
        self.seat
    }

    /// Latest authoritative snapshot, if any.
    pub fn snapshot(&self) -> Option<&BoardSnapshot> {
        self.snapshot.as_ref()
    }

    /// True when the phase permits transmitting a move.
    pub fn can_move(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// True when it is the local player's turn, as far as the client can
    /// tell. With no assigned seat the client cannot tell and defers to
    /// the peer.
    pub fn our_turn(&self) -> bool {
        match (self.seat, &self.snapshot) {
            (Some(seat), Some(snapshot)) => snapshot.current_player() == seat,
            _ => true,
        }
    }

    /// Single mutation entry point: folds one event into the session.
    ///
    /// Returns a [`WinNotice`] when the event carried a terminal snapshot
    /// naming a winner; every other outcome is observable through the
    /// accessors. Events that the transition table does not define for the
    /// current phase leave the session untouched.
    #[instrument(skip(self, event), fields(phase = %self.phase))]
    pub fn apply(&mut self, event: SessionEvent) -> Option<WinNotice> {
        match event {
            SessionEvent::Opened => {
                if self.phase == Phase::Lobby {
                    debug!("Channel open, waiting for a match");
                    self.phase = Phase::Waiting;
                }
                None
            }
            SessionEvent::MatchStarted {
                room_id,
                opponent,
                seat,
            } => {
                if self.phase != Phase::Waiting {
                    debug!("Ignoring match start outside Waiting");
                    return None;
                }
                info!(room_id = %room_id, opponent = %opponent, "Match started");
                self.room_id = Some(room_id);
                self.opponent = Some(opponent);
                self.seat = seat;
                self.snapshot = None;
                self.phase = Phase::Playing;
                None
            }
            SessionEvent::SnapshotReceived(snapshot) => {
                if self.phase != Phase::Playing {
                    debug!("Ignoring snapshot outside Playing");
                    return None;
                }
                let finished = snapshot.is_finished();
                let winner = snapshot.winner();
                self.snapshot = Some(snapshot);
                if !finished {
                    return None;
                }
                info!(winner = ?winner, "Game finished");
                self.phase = Phase::Finished;
                winner.map(|winner| WinNotice {
                    winner,
                    local_win: winner == self.seat.unwrap_or(Seat::One),
                })
            }
            SessionEvent::Closed => {
                debug!("Channel terminated, resetting session");
                self.reset();
                None
            }
        }
    }

    /// Resets everything but the identity back to the lobby: snapshot,
    /// room, opponent and seat are gone.
    pub fn reset(&mut self) {
        self.phase = Phase::Lobby;
        self.room_id = None;
        self.opponent = None;
        self.seat = None;
        self.snapshot = None;
    }
}
