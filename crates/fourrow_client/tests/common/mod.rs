//! Shared test support: a scripted transport and wire-frame builders.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use fourrow_client::{ClientError, Transport};
use fourrow_protocol::{
    BoardSnapshot, COLS, Cell, MatchStart, MoveIntent, ROWS, Seat, ServerFrame,
};

/// A scripted transport: replays queued inbound items in order and records
/// every outbound frame.
///
/// Each queued item is either `Some(result)` (a frame or a transport
/// error) or `None` (clean peer close). Once the script runs out, `recv`
/// hangs so the channel stays alive until it is closed.
pub struct MockTransport {
    incoming: VecDeque<Option<Result<String, ClientError>>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new(
        incoming: Vec<Option<Result<String, ClientError>>>,
    ) -> (Self, Arc<Mutex<Vec<String>>>, Arc<AtomicBool>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let transport = Self {
            incoming: VecDeque::from(incoming),
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        };
        (transport, sent, closed)
    }

    /// Transport that delivers `frames` and then hangs until closed.
    pub fn scripted(frames: Vec<String>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let (transport, sent, _closed) = Self::new(frames.into_iter().map(|f| Some(Ok(f))).collect());
        (transport, sent)
    }

    /// Transport that delivers `frames` and then closes cleanly.
    pub fn scripted_then_close(frames: Vec<String>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let mut incoming: Vec<Option<Result<String, ClientError>>> =
            frames.into_iter().map(|f| Some(Ok(f))).collect();
        incoming.push(None);
        let (transport, sent, _closed) = Self::new(incoming);
        (transport, sent)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        if let Some(item) = self.incoming.pop_front() {
            item
        } else {
            // Script exhausted; stay alive until the channel closes us.
            std::future::pending().await
        }
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// Empty standard-size grid.
pub fn empty_grid() -> Vec<Vec<Cell>> {
    vec![vec![Cell::Empty; COLS]; ROWS]
}

pub fn snapshot(current: Seat, finished: bool, draw: bool, winner: Option<Seat>) -> BoardSnapshot {
    BoardSnapshot::new(empty_grid(), current, finished, draw, winner)
}

pub fn match_start_json(room: &str, opponent: &str, seat: Option<Seat>) -> String {
    serde_json::to_string(&ServerFrame::MatchStart(MatchStart {
        room_id: room.into(),
        opponent: opponent.into(),
        seat,
    }))
    .unwrap()
}

pub fn state_update_json(
    current: Seat,
    finished: bool,
    draw: bool,
    winner: Option<Seat>,
) -> String {
    serde_json::to_string(&ServerFrame::StateUpdate(snapshot(
        current, finished, draw, winner,
    )))
    .unwrap()
}

pub fn move_json(column: usize, room: &str) -> String {
    serde_json::to_string(&fourrow_protocol::ClientFrame::Move(MoveIntent {
        column,
        room_id: room.into(),
    }))
    .unwrap()
}

/// Polls until `sent` holds at least `count` frames, or panics after a
/// second.
pub async fn wait_for_sends(sent: &Arc<Mutex<Vec<String>>>, count: usize) {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("expected outbound frame was never sent");
}

/// Gives background tasks a moment, then returns the recorded sends.
pub async fn settled_sends(sent: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    sent.lock().unwrap().clone()
}
