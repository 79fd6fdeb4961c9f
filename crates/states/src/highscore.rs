//! High score table with a top-10 cap.
//!
//! Kept in the shared data bag; optionally persisted as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScoreFileError;
use crate::types::MAX_HIGH_SCORES;

/// A single finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

impl ScoreEntry {
    pub fn new(score: u32, lines: u32, level: u32) -> Self {
        Self { score, lines, level }
    }
}

/// Entries sorted by descending score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a score would make it into the table.
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        self.entries.len() < MAX_HIGH_SCORES
            || self.entries.last().map_or(true, |lowest| score > lowest.score)
    }

    /// Insert an entry if it qualifies. Equal scores keep arrival order.
    pub fn add(&mut self, entry: ScoreEntry) -> bool {
        if !self.qualifies(entry.score) {
            return false;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        true
    }

    /// Load from `path`. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self, ScoreFileError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no high score file, starting fresh");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ScoreFileError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut scores: HighScores = serde_json::from_str(&text)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<(), ScoreFileError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ScoreFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = self.entries.len(), "saved high scores");
        Ok(())
    }
}
