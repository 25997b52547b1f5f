//! Real-time channel lifecycle and frame dispatch.
//!
//! A [`Channel`] owns one WebSocket connection through a background task
//! that translates raw text frames into typed [`ChannelEvent`]s, delivered
//! strictly in arrival order. Malformed frames are dropped where they land;
//! any termination, graceful or not, is reported as a single `Closed`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, instrument, warn};

use fourrow_protocol::{ClientFrame, ServerFrame};

use crate::error::ClientError;

/// Raw text transport underneath a [`Channel`].
///
/// Production code uses [`WsTransport`]; tests script a mock.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Transmits one text frame.
    async fn send(&mut self, text: String) -> Result<(), ClientError>;
    /// Receives the next text frame. `None` means the peer closed.
    async fn recv(&mut self) -> Option<Result<String, ClientError>>;
    /// Closes the transport.
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// WebSocket transport over tokio-tungstenite.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    /// Dials the service, passing the identity as a query parameter. This
    /// is the whole handshake; there is no further registration payload.
    #[instrument(skip_all, fields(identity = %identity))]
    pub async fn connect(ws_url: &str, identity: &str) -> Result<Self, ClientError> {
        let url = format!("{ws_url}?username={identity}");
        debug!(url = %url, "Dialing game service");
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(ClientError::from)
    }

    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                // Binary, ping and pong are not protocol frames.
                Ok(_) => continue,
                Err(e) => return Some(Err(ClientError::from(e))),
            }
        }
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.stream.close(None).await.map_err(ClientError::from)
    }
}

/// A typed event dispatched from a channel task.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    /// Generation of the channel that produced the event. The driver drops
    /// events whose generation is not current, so a torn-down channel can
    /// never mutate a newer session.
    pub generation: u64,
    /// What happened.
    pub kind: ChannelEventKind,
}

/// The closed set of things a channel can report.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEventKind {
    /// Transport handshake completed.
    Opened,
    /// A well-formed protocol frame arrived.
    Frame(ServerFrame),
    /// The channel terminated. Emitted exactly once per channel, whether
    /// the peer closed, the transport failed, or the client asked.
    Closed,
}

/// Handle to one live real-time channel.
///
/// At most one channel exists per session. The handle owns the background
/// task; dropping it requests teardown.
pub struct Channel {
    generation: u64,
    cmd_tx: mpsc::UnboundedSender<ClientFrame>,
    open: Arc<AtomicBool>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Channel {
    /// Opens a channel to `ws_url` for `identity`.
    ///
    /// Returns immediately; the dial runs inside the channel task. The
    /// task emits `Opened` once the handshake completes, or `Closed` when
    /// the dial fails.
    #[instrument(skip(event_tx), fields(identity = %identity))]
    pub fn connect(
        ws_url: String,
        identity: String,
        generation: u64,
        event_tx: mpsc::UnboundedSender<ChannelEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let open = Arc::new(AtomicBool::new(false));
        let task_open = Arc::clone(&open);

        tokio::spawn(async move {
            match WsTransport::connect(&ws_url, &identity).await {
                Ok(transport) => {
                    run_channel(transport, cmd_rx, event_tx, task_open, shutdown_rx, generation)
                        .await;
                }
                Err(e) => {
                    warn!(error = %e, generation, "Connection attempt failed");
                    emit(&event_tx, generation, ChannelEventKind::Closed);
                }
            }
        });

        Self {
            generation,
            cmd_tx,
            open,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Wraps an already-established transport.
    ///
    /// Used by tests and by embedders that dial their own connection,
    /// matching [`Channel::connect`] in every other respect.
    pub fn from_transport<T: Transport>(
        transport: T,
        generation: u64,
        event_tx: mpsc::UnboundedSender<ChannelEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let open = Arc::new(AtomicBool::new(false));
        let task_open = Arc::clone(&open);

        tokio::spawn(run_channel(
            transport,
            cmd_rx,
            event_tx,
            task_open,
            shutdown_rx,
            generation,
        ));

        Self {
            generation,
            cmd_tx,
            open,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Generation tag of this channel.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True between the handshake completing and the channel terminating.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Queues an outbound frame. When the channel is not open the frame is
    /// logged and dropped; this never errors back to the caller.
    pub fn send(&self, frame: ClientFrame) {
        if !self.is_open() {
            warn!(generation = self.generation, "Dropping outbound frame, channel not open");
            return;
        }
        if self.cmd_tx.send(frame).is_err() {
            warn!(generation = self.generation, "Dropping outbound frame, channel task gone");
        }
    }

    /// Requests teardown. Closing an already-closed channel has no further
    /// effect.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            debug!(generation = self.generation, "Closing channel");
            let _ = tx.send(());
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("generation", &self.generation)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Channel task: multiplexes outbound frames, inbound frames and shutdown.
///
/// Inbound frames are dispatched strictly in arrival order. Exits on peer
/// close, transport error, shutdown signal, or the handle being dropped,
/// and always emits `Closed` exactly once on the way out.
async fn run_channel<T: Transport>(
    mut transport: T,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientFrame>,
    event_tx: mpsc::UnboundedSender<ChannelEvent>,
    open: Arc<AtomicBool>,
    mut shutdown_rx: oneshot::Receiver<()>,
    generation: u64,
) {
    open.store(true, Ordering::Release);
    info!(generation, "Channel open");
    emit(&event_tx, generation, ChannelEventKind::Opened);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(frame) => match serde_json::to_string(&frame) {
                    Ok(json) => {
                        if let Err(e) = transport.send(json).await {
                            warn!(error = %e, generation, "Transport send failed");
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to encode outbound frame"),
                },
                // Handle dropped; tear down.
                None => {
                    let _ = transport.close().await;
                    break;
                }
            },
            _ = &mut shutdown_rx => {
                debug!(generation, "Shutdown requested");
                let _ = transport.close().await;
                break;
            }
            inbound = transport.recv() => match inbound {
                Some(Ok(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                    Ok(frame) => emit(&event_tx, generation, ChannelEventKind::Frame(frame)),
                    Err(e) => warn!(error = %e, raw = %text, "Dropping malformed frame"),
                },
                Some(Err(e)) => {
                    warn!(error = %e, generation, "Transport receive failed");
                    break;
                }
                None => {
                    debug!(generation, "Peer closed the channel");
                    break;
                }
            },
        }
    }

    open.store(false, Ordering::Release);
    info!(generation, "Channel closed");
    emit(&event_tx, generation, ChannelEventKind::Closed);
}

fn emit(event_tx: &mpsc::UnboundedSender<ChannelEvent>, generation: u64, kind: ChannelEventKind) {
    if event_tx.send(ChannelEvent { generation, kind }).is_err() {
        debug!("Event receiver dropped");
    }
}
