//! Key-value backed score store

use anyhow::Context;

use super::ScoreStore;
use crate::highscores::{Leaderboard, LeaderboardEntry};
use crate::platform::{KeyValueStore, now_ms};

/// Storage key for the high score
pub const HIGH_SCORE_KEY: &str = "base_runner_highscore";
/// Storage key for the leaderboard JSON
pub const LEADERBOARD_KEY: &str = "base_runner_leaderboard";

/// [`ScoreStore`] over a string key-value store
#[derive(Debug, Default)]
pub struct StorageScoreStore<S> {
    storage: S,
}

impl<S: KeyValueStore> StorageScoreStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn load_leaderboard(&self) -> anyhow::Result<Leaderboard> {
        match self.storage.get(LEADERBOARD_KEY)? {
            Some(json) => serde_json::from_str(&json).context("corrupt leaderboard entry"),
            None => Ok(Leaderboard::new()),
        }
    }
}

impl<S: KeyValueStore> ScoreStore for StorageScoreStore<S> {
    fn get_high_score(&self) -> anyhow::Result<u64> {
        let Some(raw) = self.storage.get(HIGH_SCORE_KEY)? else {
            return Ok(0);
        };
        raw.trim()
            .parse::<u64>()
            .with_context(|| format!("corrupt high score entry {:?}", raw))
    }

    fn set_high_score(&mut self, score: u64) -> anyhow::Result<()> {
        self.storage.set(HIGH_SCORE_KEY, &score.to_string())
    }

    fn submit_leaderboard_entry(
        &mut self,
        address: &str,
        score: u64,
    ) -> anyhow::Result<Option<usize>> {
        let mut board = self.load_leaderboard()?;
        let rank = board.submit(address, score, now_ms());
        let json = serde_json::to_string(&board)?;
        self.storage.set(LEADERBOARD_KEY, &json)?;
        log::debug!("Leaderboard saved ({} entries)", board.len());
        Ok(rank)
    }

    fn get_leaderboard(&self, limit: usize) -> anyhow::Result<Vec<LeaderboardEntry>> {
        Ok(self.load_leaderboard()?.top(limit).to_vec())
    }
}
