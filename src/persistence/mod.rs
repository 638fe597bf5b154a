//! Score persistence
//!
//! The session talks to a [`ScoreStore`]: one numeric high score plus a
//! per-address leaderboard. [`StorageScoreStore`] keeps both as JSON in any
//! [`KeyValueStore`](crate::platform::KeyValueStore).
//!
//! Every operation is fallible and callers treat failures as best-effort.

pub mod store;

pub use store::{HIGH_SCORE_KEY, LEADERBOARD_KEY, StorageScoreStore};

use crate::highscores::LeaderboardEntry;

/// Persistence collaborator used at game over and session setup
pub trait ScoreStore {
    /// Stored high score (0 if none yet)
    fn get_high_score(&self) -> anyhow::Result<u64>;

    fn set_high_score(&mut self, score: u64) -> anyhow::Result<()>;

    /// Record `score` for `address`. Returns the resulting 1-indexed rank,
    /// or None if the entry did not make the board.
    fn submit_leaderboard_entry(&mut self, address: &str, score: u64)
    -> anyhow::Result<Option<usize>>;

    /// Best `limit` entries, best first
    fn get_leaderboard(&self, limit: usize) -> anyhow::Result<Vec<LeaderboardEntry>>;
}
