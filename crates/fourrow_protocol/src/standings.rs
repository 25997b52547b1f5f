//! Leaderboard rows returned by the service's REST endpoint.

use serde::{Deserialize, Serialize};

/// One ranked row of the leaderboard. Rank is positional in the sequence
/// the peer returns; ties keep the peer's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name.
    pub username: String,
    /// Total wins recorded by the service.
    pub wins: u64,
}
