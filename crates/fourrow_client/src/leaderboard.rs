//! Leaderboard polling, decoupled from the session lifecycle.
//!
//! The poller runs whether or not a game is in progress and publishes a
//! read-only projection of the standings. A failed fetch keeps the prior
//! projection: stale-but-present beats empty.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, instrument, warn};

use fourrow_protocol::LeaderboardEntry;

use crate::error::ClientError;

/// Default polling period, matching the service's refresh cadence.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(10);

/// Source of ranked standings.
#[async_trait]
pub trait StandingsSource: Send + Sync + 'static {
    /// Fetches the current standings, best first.
    async fn fetch(&self) -> Result<Vec<LeaderboardEntry>, ClientError>;
}

/// Standings from the game service's REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpStandingsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStandingsSource {
    /// Creates a source for `GET {base_url}/leaderboard`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl StandingsSource for HttpStandingsSource {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let url = format!("{}/leaderboard", self.base_url);
        let entries = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(entries)
    }
}

/// Handle to the recurring poll task.
///
/// The hosting context stops it exactly once at teardown; dropping the
/// handle also ends the task, so no recurring work can dangle.
pub struct PollerHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl PollerHandle {
    /// Cancels the recurring poll. Idempotent.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            debug!("Stopping leaderboard poller");
            let _ = tx.send(());
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for PollerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerHandle")
            .field("stopped", &self.stop_tx.is_none())
            .finish()
    }
}

/// Periodic, connection-independent leaderboard poller.
pub struct LeaderboardPoller;

impl LeaderboardPoller {
    /// Spawns the poll task: one immediate fetch, then one per `period`.
    ///
    /// The watch receiver always holds the latest successful projection,
    /// starting empty. Failed fetches are logged and leave the projection
    /// untouched.
    #[instrument(skip(source))]
    pub fn spawn<S: StandingsSource>(
        source: S,
        period: Duration,
    ) -> (PollerHandle, watch::Receiver<Vec<LeaderboardEntry>>) {
        let (standings_tx, standings_rx) = watch::channel(Vec::new());
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticks = time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // Biased so a pending stop always wins over a due tick.
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => {
                        debug!("Leaderboard poller stopped");
                        break;
                    }
                    _ = ticks.tick() => match source.fetch().await {
                        Ok(entries) => {
                            debug!(count = entries.len(), "Leaderboard refreshed");
                            let _ = standings_tx.send(entries);
                        }
                        Err(e) => {
                            warn!(error = %e, "Leaderboard fetch failed, keeping previous standings");
                        }
                    },
                }
            }
        });

        (
            PollerHandle {
                stop_tx: Some(stop_tx),
                task: Some(task),
            },
            standings_rx,
        )
    }
}
