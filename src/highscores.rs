//! High score leaderboard system
//!
//! Tracks the top 10 run records. The simulation only supplies the values;
//! storage goes through `persistence` and never blocks a run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence;
use crate::sim::Seed;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Values persisted when a run ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Best coherence reached during the run
    pub peak_coherence: f64,
    /// Levels fully survived (level reached minus one)
    pub levels_survived: u32,
    /// Seed of the run, for replays
    pub seed: Seed,
}

impl RunRecord {
    /// Ranking: peak coherence first, levels survived breaks ties
    fn beats(&self, other: &RunRecord) -> bool {
        match self.peak_coherence.partial_cmp(&other.peak_coherence) {
            Some(std::cmp::Ordering::Greater) => true,
            Some(std::cmp::Ordering::Equal) => self.levels_survived > other.levels_survived,
            _ => false,
        }
    }

    fn is_empty(&self) -> bool {
        self.peak_coherence <= 0.0 && self.levels_survived == 0
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    pub entries: Vec<RunRecord>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a record qualifies for the leaderboard
    pub fn qualifies(&self, record: &RunRecord) -> bool {
        if record.is_empty() {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if record beats the lowest entry
        self.entries.last().map(|e| record.beats(e)).unwrap_or(true)
    }

    /// Get the rank a record would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, record: &RunRecord) -> Option<usize> {
        if !self.qualifies(record) {
            return None;
        }
        let rank = self.entries.iter().position(|e| record.beats(e));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a record to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_record(&mut self, record: RunRecord) -> Option<usize> {
        let rank = self.potential_rank(&record)?;
        self.entries.insert(rank - 1, record);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the best record (if any)
    pub fn top(&self) -> Option<&RunRecord> {
        self.entries.first()
    }

    /// Parse a stored leaderboard; corrupt data yields an empty board
    pub fn from_json(json: &str) -> Self {
        let mut scores: HighScores = persistence::parse_or_default(json, "high scores");
        scores.normalize();
        scores
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load from disk; missing or corrupt files yield an empty board
    pub fn load(path: &Path) -> Self {
        let mut scores: HighScores = persistence::load_json(path, "high scores");
        scores.normalize();
        log::info!("{} high scores on the board", scores.entries.len());
        scores
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Drop unrankable entries and restore order after hand-edited data
    fn normalize(&mut self) {
        self.entries
            .retain(|e| e.peak_coherence.is_finite() && !e.is_empty());
        self.entries.sort_by(|a, b| {
            b.peak_coherence
                .partial_cmp(&a.peak_coherence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.levels_survived.cmp(&a.levels_survived))
        });
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}
