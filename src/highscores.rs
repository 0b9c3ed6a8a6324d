//! High score leaderboard
//!
//! Ranking only; where the table is stored and how it's drawn is up to the
//! host. Each difficulty keeps its own top 10. Higher scores rank first and
//! equal scores go to whoever needed fewer shots.

use std::cmp::{Ordering, Reverse};

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Entries kept per difficulty
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final round score
    pub score: u64,
    /// Shots taken in the round
    pub shots: u32,
    /// Tier the round was played on
    pub difficulty: Difficulty,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    /// Sort key, smallest ranks first
    fn rank_key(&self) -> (Reverse<u64>, u32) {
        (Reverse(self.score), self.shots)
    }

    /// Strictly better than `other`; a full tie is not enough
    fn outranks(&self, other: &HighScoreEntry) -> bool {
        self.rank_key().cmp(&other.rank_key()) == Ordering::Less
    }
}

/// High score leaderboard, one board per difficulty
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for one difficulty, best first
    pub fn board(&self, difficulty: Difficulty) -> impl Iterator<Item = &HighScoreEntry> + '_ {
        self.entries.iter().filter(move |e| e.difficulty == difficulty)
    }

    /// Record a finished round. Returns its 1-indexed rank on that
    /// difficulty's board, or `None` if it didn't make the cut.
    pub fn add_score(
        &mut self,
        score: u64,
        shots: u32,
        difficulty: Difficulty,
        timestamp: f64,
    ) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let entry = HighScoreEntry {
            score,
            shots,
            difficulty,
            timestamp,
        };

        // Earlier entries win full ties
        let rank = self.board(difficulty).filter(|e| !entry.outranks(e)).count();
        if rank >= MAX_HIGH_SCORES {
            return None;
        }

        let pos = self
            .entries
            .partition_point(|e| e.rank_key() <= entry.rank_key());
        self.entries.insert(pos, entry);

        // Drop whatever fell off the bottom of this board
        if let Some(cut) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.difficulty == difficulty)
            .nth(MAX_HIGH_SCORES)
            .map(|(i, _)| i)
        {
            self.entries.remove(cut);
        }

        log::info!(
            "High score {} ({} shots) entered at rank {} on {}",
            score,
            shots,
            rank + 1,
            difficulty.as_str()
        );
        Some(rank + 1)
    }
}
