//! Client driver: owns the session, the channel, and the intent surface.
//!
//! All session mutation funnels through two places: user intents on this
//! driver and [`GameClient::next_event`], which pumps channel events into
//! the state machine. The presentation layer only ever reads.

use derive_getters::Getters;
use derive_new::new;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use fourrow_protocol::{ClientFrame, MoveIntent, ServerFrame};

use crate::connection::{Channel, ChannelEvent, ChannelEventKind, Transport};
use crate::session::{Phase, Session, SessionEvent, WinNotice};

/// Endpoints the client talks to.
#[derive(Debug, Clone, Getters, new)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game service.
    ws_url: String,
}

/// Observable outcome of pumping one channel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// Session state advanced; re-read the accessors.
    Updated,
    /// A terminal snapshot named a winner. Implies `Updated`.
    Won(WinNotice),
    /// The channel terminated; the session is back in the lobby.
    Reset,
}

/// Driver for one player's connection to the arena.
pub struct GameClient {
    config: ClientConfig,
    session: Session,
    channel: Option<Channel>,
    generation: u64,
    event_tx: mpsc::UnboundedSender<ChannelEvent>,
    event_rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl GameClient {
    /// Creates a client with no session in flight.
    pub fn new(config: ClientConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            config,
            session: Session::new(""),
            channel: None,
            generation: 0,
            event_tx,
            event_rx,
        }
    }

    /// Read-only view of the current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True while a channel handle exists and its handshake completed.
    pub fn is_connected(&self) -> bool {
        self.channel.as_ref().is_some_and(Channel::is_open)
    }

    /// Joins the arena as `identity`.
    ///
    /// A blank identity is a no-op, as is joining while a session is
    /// already in flight. The dial happens in the background; the session
    /// reaches Waiting when the handshake completes.
    #[instrument(skip(self))]
    pub fn join(&mut self, identity: &str) {
        let Some(identity) = self.begin_join(identity) else {
            return;
        };
        self.channel = Some(Channel::connect(
            self.config.ws_url.clone(),
            identity,
            self.generation,
            self.event_tx.clone(),
        ));
    }

    /// Joins the arena over an already-established transport.
    ///
    /// Same preconditions and lifecycle as [`GameClient::join`]; used by
    /// tests and by embedders that dial their own connection.
    pub fn join_with_transport<T: Transport>(&mut self, identity: &str, transport: T) {
        let Some(_identity) = self.begin_join(identity) else {
            return;
        };
        self.channel = Some(Channel::from_transport(
            transport,
            self.generation,
            self.event_tx.clone(),
        ));
    }

    /// Shared join preconditions: non-blank identity, lobby phase. Bumps
    /// the generation and installs the fresh session on success.
    fn begin_join(&mut self, identity: &str) -> Option<String> {
        let identity = identity.trim();
        if identity.is_empty() {
            debug!("Join ignored: blank identity");
            return None;
        }
        if self.session.phase() != Phase::Lobby {
            debug!(phase = %self.session.phase(), "Join ignored: session already active");
            return None;
        }
        self.generation += 1;
        info!(identity, generation = self.generation, "Joining arena");
        self.session = Session::new(identity);
        Some(identity.to_string())
    }

    /// The move gate: transmits a column-click intent when every
    /// precondition holds, and silently drops it otherwise.
    ///
    /// Preconditions: the session is Playing, an open channel exists, the
    /// column is within the board, and (when the peer assigned a seat) it
    /// is the local player's turn. No optimistic board mutation happens;
    /// the cell changes only with the next snapshot.
    #[instrument(skip(self))]
    pub fn drop_piece(&mut self, column: usize) {
        if !self.session.can_move() {
            debug!(phase = %self.session.phase(), "Move gated: not playing");
            return;
        }
        let Some(channel) = self.channel.as_ref().filter(|c| c.is_open()) else {
            debug!("Move gated: no open channel");
            return;
        };
        if let Some(snapshot) = self.session.snapshot()
            && column >= snapshot.width()
        {
            debug!(width = snapshot.width(), "Move gated: column out of range");
            return;
        }
        if !self.session.our_turn() {
            debug!("Move gated: not our turn");
            return;
        }
        let Some(room_id) = self.session.room_id() else {
            debug!("Move gated: no room assigned");
            return;
        };
        channel.send(ClientFrame::Move(MoveIntent {
            column,
            room_id: room_id.to_string(),
        }));
    }

    /// Closes the channel. Idempotent; the session resets once the
    /// channel's `Closed` event comes back through [`Self::next_event`].
    pub fn disconnect(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            channel.close();
        }
    }

    /// Explicit restart intent: tears everything back to a fresh lobby,
    /// the equivalent of reloading the page. The generation bump makes any
    /// in-flight event from the old channel stale.
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        info!("Restarting client");
        self.channel = None;
        self.generation += 1;
        self.session = Session::new("");
    }

    /// Waits for the next channel event, folds it into the session, and
    /// reports the observable outcome.
    ///
    /// Events tagged with a stale generation are dropped without touching
    /// the session. With no channel in flight this waits until one exists
    /// and produces something, so callers typically drive it from a
    /// `select!` alongside user input.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        loop {
            let event = self.event_rx.recv().await?;
            if event.generation != self.generation {
                debug!(
                    stale = event.generation,
                    current = self.generation,
                    "Dropping event from stale channel"
                );
                continue;
            }
            match event.kind {
                ChannelEventKind::Opened => {
                    self.session.apply(SessionEvent::Opened);
                    return Some(ClientEvent::Updated);
                }
                ChannelEventKind::Frame(ServerFrame::MatchStart(start)) => {
                    self.session.apply(SessionEvent::MatchStarted {
                        room_id: start.room_id,
                        opponent: start.opponent,
                        seat: start.seat,
                    });
                    return Some(ClientEvent::Updated);
                }
                ChannelEventKind::Frame(ServerFrame::StateUpdate(snapshot)) => {
                    let notice = self.session.apply(SessionEvent::SnapshotReceived(snapshot));
                    return Some(match notice {
                        Some(notice) => ClientEvent::Won(notice),
                        None => ClientEvent::Updated,
                    });
                }
                ChannelEventKind::Closed => {
                    self.session.apply(SessionEvent::Closed);
                    self.channel = None;
                    return Some(ClientEvent::Reset);
                }
            }
        }
    }
}

impl std::fmt::Debug for GameClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameClient")
            .field("phase", &self.session.phase())
            .field("generation", &self.generation)
            .field("connected", &self.is_connected())
            .finish()
    }
}
