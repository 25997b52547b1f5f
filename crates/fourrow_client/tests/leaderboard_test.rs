//! Poller tests with a scripted standings source.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use fourrow_client::{ClientError, LeaderboardPoller, StandingsSource};
use fourrow_protocol::LeaderboardEntry;

/// Replays scripted fetch results in order; once exhausted, every further
/// fetch fails.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<LeaderboardEntry>, ClientError>>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Vec<LeaderboardEntry>, ClientError>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StandingsSource for &'static ScriptedSource {
    async fn fetch(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::ChannelClosed))
    }
}

fn entry(username: &str, wins: u64) -> LeaderboardEntry {
    LeaderboardEntry {
        username: username.into(),
        wins,
    }
}

fn leak(source: ScriptedSource) -> &'static ScriptedSource {
    Box::leak(Box::new(source))
}

#[tokio::test(start_paused = true)]
async fn first_fetch_happens_immediately() {
    let source = leak(ScriptedSource::new(vec![Ok(vec![entry("alice", 3)])]));
    let (mut poller, mut standings) = LeaderboardPoller::spawn(source, Duration::from_secs(10));

    standings.changed().await.unwrap();
    assert_eq!(*standings.borrow(), vec![entry("alice", 3)]);
    assert_eq!(source.fetches.load(Ordering::Relaxed), 1);

    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_the_previous_projection() {
    let source = leak(ScriptedSource::new(vec![
        Ok(vec![entry("alice", 3), entry("bob", 1)]),
        Err(ClientError::ChannelClosed),
        Ok(vec![entry("carol", 9)]),
    ]));
    let (mut poller, mut standings) = LeaderboardPoller::spawn(source, Duration::from_secs(10));

    standings.changed().await.unwrap();
    let first = standings.borrow_and_update().clone();
    assert_eq!(first, vec![entry("alice", 3), entry("bob", 1)]);

    // Ride past the failing poll: the projection must not move.
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(source.fetches.load(Ordering::Relaxed) >= 2);
    assert!(!standings.has_changed().unwrap());
    assert_eq!(*standings.borrow(), first);

    // The next successful poll replaces it wholesale.
    standings.changed().await.unwrap();
    assert_eq!(*standings.borrow(), vec![entry("carol", 9)]);

    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_recurring_poll() {
    let source = leak(ScriptedSource::new(vec![Ok(vec![entry("alice", 3)])]));
    let (mut poller, mut standings) = LeaderboardPoller::spawn(source, Duration::from_secs(10));

    standings.changed().await.unwrap();
    assert_eq!(source.fetches.load(Ordering::Relaxed), 1);

    poller.stop();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.fetches.load(Ordering::Relaxed), 1);

    // Stopping twice is a quiet no-op.
    poller.stop();
}
