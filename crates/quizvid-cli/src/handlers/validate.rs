//! Validate command handler

use super::{print_json, reporter};
use crate::commands::ValidateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use quizvid::{load_quiz, validate_quiz, ValidationReport};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Validation result for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileValidation {
    /// Quiz file
    pub file: PathBuf,
    /// Load failure, when the file could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    /// Findings, when the file loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
}

impl FileValidation {
    /// Load and validate one file
    #[must_use]
    pub fn check(file: &Path) -> Self {
        match load_quiz(file) {
            Ok(quiz) => Self {
                file: file.to_path_buf(),
                load_error: None,
                report: Some(validate_quiz(&quiz)),
            },
            Err(e) => Self {
                file: file.to_path_buf(),
                load_error: Some(e.to_string()),
                report: None,
            },
        }
    }

    /// Whether the file passes; `strict` also fails on warnings
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        self.report
            .as_ref()
            .is_some_and(|r| r.is_valid() && !(strict && r.warning_count() > 0))
    }
}

/// Execute the validate command
pub fn execute_validate(config: &CliConfig, args: &ValidateArgs) -> CliResult<()> {
    let files = args.all_files();
    if files.is_empty() {
        return Err(CliError::invalid_argument(
            "no quiz files given (pass files or --quiz-file)",
        ));
    }

    let results: Vec<FileValidation> = files.iter().map(|f| FileValidation::check(f)).collect();

    match args.format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Text => {
            let reporter = reporter(config);
            for result in &results {
                print!("{}", render_file_result(result));
                let name = result.file.display();
                if result.passes(args.strict) {
                    reporter.success(&format!("{name}: valid"));
                } else {
                    reporter.failure(&format!("{name}: invalid"));
                }
            }
        }
    }

    let failed = results.iter().filter(|r| !r.passes(args.strict)).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "{failed} of {} files did not pass",
            results.len()
        )))
    }
}

/// Findings for one file as indented text
#[must_use]
pub fn render_file_result(result: &FileValidation) -> String {
    let mut out = format!("{}\n", result.file.display());
    if let Some(error) = &result.load_error {
        out.push_str(&format!("  error: {error}\n"));
        return out;
    }
    if let Some(report) = &result.report {
        for issue in report.errors() {
            out.push_str(&format!("  error: {}\n", issue.message));
        }
        for issue in report.warnings() {
            out.push_str(&format!("  warning: {}\n", issue.message));
        }
        out.push_str(&format!("  {}\n", report.summary()));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "metadata": {"title": "Capitals"},
        "questions": [
            {"question": "Capital of France?", "type": "multiple_choice",
             "options": ["Berlin", "Paris", "Rome", "Madrid"], "correct_answer": 1}
        ]
    }"#;

    const UNTITLED: &str = r#"{
        "questions": [
            {"question": "2 + 2?", "type": "short_answer", "correct_answer": "4"}
        ]
    }"#;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_valid_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileValidation::check(&write(dir.path(), "ok.json", VALID));
        assert!(result.load_error.is_none());
        assert!(result.passes(false));
        assert!(render_file_result(&result).contains("validated successfully"));
    }

    #[test]
    fn test_unparseable_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileValidation::check(&write(dir.path(), "bad.json", "{not json"));
        assert!(result.load_error.is_some());
        assert!(!result.passes(false));
        assert!(render_file_result(&result).contains("  error: "));
    }

    #[test]
    fn test_unsupported_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileValidation::check(&write(dir.path(), "quiz.txt", VALID));
        assert!(result.load_error.unwrap().contains("Unsupported quiz format"));
    }

    #[test]
    fn test_empty_quiz_has_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileValidation::check(&write(
            dir.path(),
            "empty.json",
            r#"{"metadata": {"title": "Empty"}, "questions": []}"#,
        ));
        assert!(!result.passes(false));
        assert!(render_file_result(&result).contains("No questions provided"));
    }

    #[test]
    fn test_report_serializes() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileValidation::check(&write(dir.path(), "ok.json", VALID));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("report").is_some());
        assert!(json.get("load_error").is_none());
    }

    #[test]
    fn test_strict_counts_warnings() {
        let result = FileValidation {
            file: PathBuf::from("untitled.json"),
            load_error: None,
            report: Some(validate_quiz(
                &quizvid::parse_quiz(UNTITLED, quizvid::QuizFormat::Json, "").unwrap(),
            )),
        };
        let report = result.report.as_ref().unwrap();
        assert!(report.is_valid());
        assert!(report.warning_count() > 0);
        assert!(result.passes(false));
        assert!(!result.passes(true));
    }
}
