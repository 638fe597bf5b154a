//! Leaderboard
//!
//! One entry per player address, keeping that address's best score.
//! Sorted descending and capped at [`MAX_LEADERBOARD_ENTRIES`].

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 100;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player address as first submitted
    pub address: String,
    /// Best score for this address
    pub score: u64,
    /// Unix timestamp (ms) of the best score
    pub timestamp: f64,
}

/// Per-address best-score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position_of(&self, address: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.address.eq_ignore_ascii_case(address))
    }

    /// Record a score. An existing address only improves, never regresses.
    /// Returns the 1-indexed rank afterwards, or None if the entry fell off
    /// the board (or the address is empty).
    pub fn submit(&mut self, address: &str, score: u64, timestamp: f64) -> Option<usize> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        match self.position_of(address) {
            Some(i) if self.entries[i].score >= score => return Some(i + 1),
            Some(i) => {
                self.entries.remove(i);
            }
            None => {}
        }

        // Ties keep the earlier submission ahead
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            pos,
            LeaderboardEntry {
                address: address.to_string(),
                score,
                timestamp,
            },
        );
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);

        (pos < self.entries.len()).then_some(pos + 1)
    }

    /// First `limit` entries, best first
    pub fn top(&self, limit: usize) -> &[LeaderboardEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// 1-indexed rank of an address
    pub fn rank_of(&self, address: &str) -> Option<usize> {
        self.position_of(address).map(|i| i + 1)
    }

    pub fn score_of(&self, address: &str) -> Option<u64> {
        self.position_of(address).map(|i| self.entries[i].score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
