//! List command handler

use super::{print_json, reporter};
use crate::commands::ListArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::OutputFormat;
use quizvid::{discover, load_quiz, subtitles::option_label, Quiz};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One saved quiz document
#[derive(Debug, Serialize)]
pub struct SavedQuiz {
    /// Quiz file
    pub file: PathBuf,
    /// Parsed quiz, when the file loads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
    /// Load error otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SavedQuiz {
    fn load(file: &Path) -> Self {
        match load_quiz(file) {
            Ok(quiz) => Self {
                file: file.to_path_buf(),
                quiz: Some(quiz),
                error: None,
            },
            Err(e) => Self {
                file: file.to_path_buf(),
                quiz: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Execute the list command
pub fn execute_list(config: &CliConfig, args: &ListArgs) -> CliResult<()> {
    let files = if args.dir.is_dir() {
        discover(&args.dir, None)?
    } else {
        Vec::new()
    };
    if files.is_empty() {
        reporter(config).info(&format!("No saved quizzes in {}", args.dir.display()));
        return Ok(());
    }

    let saved: Vec<SavedQuiz> = files.iter().map(|f| SavedQuiz::load(f)).collect();
    match args.format {
        OutputFormat::Json => print_json(&saved),
        OutputFormat::Text => {
            for entry in &saved {
                print!("{}", render_saved(entry, args.questions));
            }
            Ok(())
        }
    }
}

/// Text block for one saved quiz
#[must_use]
pub fn render_saved(entry: &SavedQuiz, with_questions: bool) -> String {
    let name = entry
        .file
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().to_string());
    let Some(quiz) = &entry.quiz else {
        return format!(
            "{name}\n  error: {}\n",
            entry.error.as_deref().unwrap_or("unreadable")
        );
    };

    let mut out = format!("{} ({name})\n", quiz.title());
    if !quiz.metadata.description.trim().is_empty() {
        out.push_str(&format!("  Description: {}\n", quiz.metadata.description.trim()));
    }
    if let Some(created) = &quiz.metadata.created_at {
        out.push_str(&format!("  Created: {created}\n"));
    }
    out.push_str(&format!("  Questions: {}\n", quiz.question_count()));
    if with_questions {
        for (n, question) in quiz.questions.iter().enumerate() {
            out.push_str(&format!("  Q{}: {}\n", n + 1, question.question));
            for (i, option) in question.options.iter().enumerate() {
                out.push_str(&format!("    {}. {option}\n", option_label(i)));
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use quizvid::Question;

    fn saved(quiz: Quiz) -> SavedQuiz {
        SavedQuiz {
            file: PathBuf::from("quiz_data/capitals.json"),
            quiz: Some(quiz),
            error: None,
        }
    }

    #[test]
    fn test_render_summary() {
        let mut quiz = Quiz::new("World Capitals").with_description("Europe edition");
        quiz.metadata.created_at = Some("2024-03-09T14:05:07+00:00".to_string());
        quiz.push_question(Question::multiple_choice("Capital of France?", ["Berlin", "Paris"], 1));

        let text = render_saved(&saved(quiz), false);
        assert_eq!(
            text,
            "World Capitals (capitals.json)\n  Description: Europe edition\n  \
             Created: 2024-03-09T14:05:07+00:00\n  Questions: 1\n"
        );
    }

    #[test]
    fn test_render_with_questions() {
        let quiz = Quiz::new("Capitals")
            .with_question(Question::multiple_choice("Capital of France?", ["Berlin", "Paris"], 1));
        let text = render_saved(&saved(quiz), true);
        assert!(text.contains("  Q1: Capital of France?\n    A. Berlin\n    B. Paris\n"));
    }

    #[test]
    fn test_render_unreadable() {
        let entry = SavedQuiz {
            file: PathBuf::from("quiz_data/broken.json"),
            quiz: None,
            error: Some("Invalid JSON format".to_string()),
        };
        assert_eq!(render_saved(&entry, false), "broken.json\n  error: Invalid JSON format\n");
    }
}
