//! Create command handler

use super::reporter;
use crate::commands::CreateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use chrono::{DateTime, Local};
use quizvid::{export_quiz, load_quiz, validate_quiz, ExportFormat, Quiz};
use std::path::{Path, PathBuf};

/// Directory new quiz documents go to by default
pub const DEFAULT_QUIZ_DIR: &str = "quiz_data";

/// Execute the create command
pub fn execute_create(config: &CliConfig, args: &CreateArgs) -> CliResult<()> {
    let reporter = reporter(config);
    let now = Local::now();
    let quiz = build_quiz(args, now)?;

    let path = resolve_create_output(&quiz, args.output.as_deref(), now);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, export_quiz(&quiz, ExportFormat::Json)?)?;

    let report = validate_quiz(&quiz);
    for issue in report.errors().chain(report.warnings()) {
        reporter.warning(&issue.message);
    }
    reporter.success(&format!(
        "Created quiz '{}' with {} questions: {}",
        quiz.title(),
        quiz.question_count(),
        path.display()
    ));
    Ok(())
}

/// Assemble the quiz document from the arguments
pub fn build_quiz(args: &CreateArgs, now: DateTime<Local>) -> CliResult<Quiz> {
    let mut quiz = match (&args.input, &args.title) {
        (Some(input), _) => load_quiz(input)?,
        (None, Some(title)) => Quiz::new(title.clone()),
        (None, None) => {
            return Err(CliError::invalid_argument(
                "--title is required unless questions are imported with --input",
            ))
        }
    };

    if let Some(title) = &args.title {
        quiz.metadata.title.clone_from(title);
    }
    if let Some(description) = &args.description {
        quiz.metadata.description.clone_from(description);
    }
    if quiz.metadata.created_at.is_none() {
        quiz.metadata.created_at = Some(now.to_rfc3339());
    }
    Ok(quiz)
}

/// Where the new document is written.
///
/// `None` means `quiz_data/`; a directory gets `{Title}_{timestamp}.json`.
#[must_use]
pub fn resolve_create_output(quiz: &Quiz, output: Option<&Path>, now: DateTime<Local>) -> PathBuf {
    let file_name = format!("{}_{}.json", quiz.file_stem(), now.format("%Y%m%d_%H%M%S"));
    match output {
        None => Path::new(DEFAULT_QUIZ_DIR).join(file_name),
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path.to_path_buf(),
    }
}
