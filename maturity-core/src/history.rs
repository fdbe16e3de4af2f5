//! Append-only history of past assessments.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Result;
use crate::scorecard::Scorecard;

/// Snapshot of one past assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the assessment ran.
    pub timestamp: DateTime<Utc>,
    /// Level achieved by that run.
    pub level_achieved: u8,
    /// Score of that run.
    pub score: u8,
}

impl HistoryEntry {
    /// Snapshot a scorecard.
    pub fn from_scorecard(scorecard: &Scorecard) -> Self {
        Self {
            timestamp: scorecard.generated_at,
            level_achieved: scorecard.maturity.level_achieved,
            score: scorecard.maturity.score,
        }
    }
}

/// JSON file holding history entries, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries. A missing or empty file is an empty history.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Append an entry after the existing ones and persist the result.
    ///
    /// The file is replaced through a rename so a crash never leaves a
    /// truncated history behind.
    pub fn append(&self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.load()?;
        entries.push(entry);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let staging = self.path.with_extension("tmp");
        std::fs::write(&staging, serde_json::to_string_pretty(&entries)?)?;
        std::fs::rename(&staging, &self.path)?;
        log::debug!(
            "history {} now holds {} entries",
            self.path.display(),
            entries.len()
        );
        Ok(entries)
    }
}
