//! Quiz export to JSON or CSV.

use super::csv_rows::{CSV_OPTIONAL_COLUMNS, CSV_REQUIRED_COLUMNS};
use crate::error::{QuizError, QuizResult};
use crate::model::Quiz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Export target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Canonical JSON document
    #[default]
    Json,
    /// CSV, one question per row
    Csv,
}

impl FromStr for ExportFormat {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(QuizError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Serialise a quiz.
///
/// CSV holds at most four options per question and no metadata block.
pub fn export_quiz(quiz: &Quiz, format: ExportFormat) -> QuizResult<Vec<u8>> {
    match format {
        ExportFormat::Json => serde_json::to_vec_pretty(quiz).map_err(|e| QuizError::Export {
            format: "json".to_string(),
            message: e.to_string(),
        }),
        ExportFormat::Csv => export_csv(quiz),
    }
}

fn export_csv(quiz: &Quiz) -> QuizResult<Vec<u8>> {
    let csv_err = |message: String| QuizError::Export {
        format: "csv".to_string(),
        message,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header: Vec<&str> = CSV_REQUIRED_COLUMNS
        .iter()
        .chain(CSV_OPTIONAL_COLUMNS.iter())
        .copied()
        .collect();
    writer
        .write_record(&header)
        .map_err(|e| csv_err(e.to_string()))?;

    for (n, q) in quiz.questions.iter().enumerate() {
        if q.options.len() > 4 {
            return Err(csv_err(format!(
                "Question {} has {} options; CSV holds at most 4",
                n + 1,
                q.options.len()
            )));
        }
        let option = |i: usize| q.options.get(i).map_or("", String::as_str);
        let duration = q.duration.map(|d| d.to_string()).unwrap_or_default();
        let points = q.points.map(|p| p.to_string()).unwrap_or_default();
        let difficulty = q.difficulty.to_string();
        let kind = serde_json::to_value(q.kind)
            .ok()
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_default();

        writer
            .write_record([
                q.question.as_str(),
                option(0),
                option(1),
                option(2),
                option(3),
                q.correct_text().unwrap_or(""),
                q.explanation().unwrap_or(""),
                difficulty.as_str(),
                duration.as_str(),
                points.as_str(),
                kind.as_str(),
            ])
            .map_err(|e| csv_err(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv_err(e.to_string()))
}
