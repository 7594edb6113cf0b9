//! Quiz loading and export.
//!
//! ```text
//! quiz.json ─┐
//! quiz.csv  ─┼──→ QuizFormat::from_path ──→ parse_quiz ──→ Quiz (normalised)
//! quiz.xml  ─┘
//! ```

mod csv_rows;
mod export;
mod json;
mod xml;

pub use csv_rows::{parse_csv, CSV_OPTIONAL_COLUMNS, CSV_REQUIRED_COLUMNS};
pub use export::{export_quiz, ExportFormat};
pub use json::parse_json;
pub use xml::parse_xml;

use crate::error::{QuizError, QuizResult};
use crate::model::Quiz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Supported quiz source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizFormat {
    /// JSON document
    Json,
    /// CSV with one question per row
    Csv,
    /// XML document
    Xml,
}

impl QuizFormat {
    /// Extensions recognised as quiz files
    pub const EXTENSIONS: [&'static str; 3] = ["json", "csv", "xml"];

    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> QuizResult<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }

    /// Detect the format from an extension without the leading dot
    pub fn from_extension(ext: &str) -> QuizResult<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            other => Err(QuizError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for QuizFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Xml => write!(f, "xml"),
        }
    }
}

/// Load and normalise a quiz file.
///
/// A quiz without a title takes the file stem.
pub fn load_quiz(path: &Path) -> QuizResult<Quiz> {
    let format = QuizFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    debug!(path = %path.display(), %format, "loading quiz");
    parse_quiz(&text, format, &stem)
}

/// Parse an in-memory quiz document and normalise it.
pub fn parse_quiz(text: &str, format: QuizFormat, name_hint: &str) -> QuizResult<Quiz> {
    let mut quiz = match format {
        QuizFormat::Json => parse_json(text)?,
        QuizFormat::Csv => parse_csv(text)?,
        QuizFormat::Xml => parse_xml(text)?,
    };
    if quiz.metadata.title.trim().is_empty() && !name_hint.is_empty() {
        quiz.metadata.title = name_hint.to_string();
    }
    quiz.normalize();
    Ok(quiz)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            QuizFormat::from_path(Path::new("a/quiz.JSON")).unwrap(),
            QuizFormat::Json
        );
        assert_eq!(
            QuizFormat::from_path(Path::new("quiz.csv")).unwrap(),
            QuizFormat::Csv
        );
        assert_eq!(
            QuizFormat::from_path(Path::new("quiz.xml")).unwrap(),
            QuizFormat::Xml
        );
    }

    #[test]
    fn test_format_unsupported() {
        let err = QuizFormat::from_path(Path::new("quiz.txt")).unwrap_err();
        assert!(matches!(err, QuizError::UnsupportedFormat { ref extension } if extension == "txt"));
        assert!(QuizFormat::from_path(Path::new("quiz")).is_err());
    }

    #[test]
    fn test_load_quiz_takes_stem_as_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Geography_Week_3.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"[{{"question":"Capital of Peru?","options":["Lima","Quito"],"correct_answer":"Lima"}}]"#
        )
        .unwrap();

        let quiz = load_quiz(&path).unwrap();
        assert_eq!(quiz.title(), "Geography_Week_3");
        assert_eq!(quiz.questions[0].id, 1);
        assert_eq!(quiz.questions[0].correct_index(), Some(0));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_quiz(Path::new("/nonexistent/quiz.json")).unwrap_err();
        assert!(matches!(err, QuizError::Io(_)));
    }

    #[test]
    fn test_parse_quiz_keeps_document_title() {
        let quiz = parse_quiz(
            r#"{"title":"Kept","questions":[]}"#,
            QuizFormat::Json,
            "ignored",
        )
        .unwrap();
        assert_eq!(quiz.title(), "Kept");
    }
}
