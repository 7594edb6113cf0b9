//! Generation history as JSON lines.

use crate::error::{QuizError, QuizResult};
use crate::settings::VideoSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// Outcome of a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Video written
    Completed,
    /// Generation failed
    Failed,
}

/// One line of the history file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Record id
    pub id: Uuid,
    /// When the generation finished
    pub timestamp: DateTime<Utc>,
    /// Quiz title
    pub quiz_name: String,
    /// Number of questions
    pub question_count: usize,
    /// Settings used
    pub settings: VideoSettings,
    /// Outcome
    pub status: GenerationStatus,
    /// Output video when completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    /// Error message when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Shuffle seed, when questions or options were shuffled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl HistoryRecord {
    /// Record a successful generation
    #[must_use]
    pub fn completed(
        quiz_name: impl Into<String>,
        question_count: usize,
        settings: VideoSettings,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            quiz_name: quiz_name.into(),
            question_count,
            settings,
            status: GenerationStatus::Completed,
            output_file: Some(output_file.into()),
            error: None,
            seed: None,
        }
    }

    /// Record a failed generation
    #[must_use]
    pub fn failed(
        quiz_name: impl Into<String>,
        question_count: usize,
        settings: VideoSettings,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            quiz_name: quiz_name.into(),
            question_count,
            settings,
            status: GenerationStatus::Failed,
            output_file: None,
            error: Some(error.into()),
            seed: None,
        }
    }

    /// Attach the shuffle seed
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Append a record, creating the file and its directory as needed
pub fn append_history(path: &Path, record: &HistoryRecord) -> QuizResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut line = serde_json::to_string(record)
        .map_err(|e| QuizError::parse("json", format!("history record: {e}")))?;
    line.push('\n');

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Read the history, oldest first; `limit` keeps only the most recent records.
///
/// A missing file is an empty history. Corrupt lines are skipped with a
/// warning.
pub fn read_history(path: &Path, limit: Option<usize>) -> QuizResult<Vec<HistoryRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HistoryRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), line = n + 1, error = %e, "skipping history line"),
        }
    }
    if let Some(limit) = limit {
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
    }
    Ok(records)
}
