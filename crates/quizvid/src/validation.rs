//! Quiz validation.
//!
//! Errors block rendering; warnings are reported but do not.

use crate::error::QuizError;
use crate::model::{AnswerKey, Question, QuestionKind, Quiz};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Shortest on-screen time for a question, in seconds
pub const MIN_QUESTION_SECS: u32 = 3;
/// Longest on-screen time for a question, in seconds
pub const MAX_QUESTION_SECS: u32 = 30;
/// Option count above which the layout gets crowded
pub const CROWDED_OPTIONS: usize = 6;
/// Prompt length above which text wraps awkwardly
pub const LONG_PROMPT_CHARS: usize = 200;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks rendering
    Error,
    /// Reported only
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity
    pub severity: Severity,
    /// 1-based question number, when the issue concerns one question
    pub question: Option<usize>,
    /// Message, prefixed with the question number when there is one
    pub message: String,
}

impl ValidationIssue {
    fn error(question: Option<usize>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, question, message)
    }

    fn warning(question: Option<usize>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, question, message)
    }

    fn new(severity: Severity, question: Option<usize>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = match question {
            Some(n) => format!("Question {n}: {message}"),
            None => message,
        };
        Self {
            severity,
            question,
            message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of validating a quiz
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Findings in question order
    pub issues: Vec<ValidationIssue>,
    /// Number of questions inspected
    pub question_count: usize,
}

impl ValidationReport {
    /// True when there are no errors
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// Number of errors
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warnings
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Error issues
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    /// Warning issues
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_valid() {
            format!(
                "All {} questions validated successfully ({} warnings)",
                self.question_count,
                self.warning_count()
            )
        } else {
            format!(
                "{} errors, {} warnings in {} questions",
                self.error_count(),
                self.warning_count(),
                self.question_count
            )
        }
    }

    /// Convert into a `Result`, failing with every error message
    pub fn into_result(self) -> Result<Self, QuizError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(QuizError::Validation {
                issues: self.errors().map(|i| i.message.clone()).collect(),
            })
        }
    }
}

/// Validate a normalised quiz
#[must_use]
pub fn validate_quiz(quiz: &Quiz) -> ValidationReport {
    let mut issues = Vec::new();

    if quiz.metadata.title.trim().is_empty() {
        issues.push(ValidationIssue::warning(None, "Quiz has no title"));
    }
    if quiz.questions.is_empty() {
        issues.push(ValidationIssue::error(None, "No questions provided"));
    }

    let mut seen_ids = HashSet::new();
    for (idx, question) in quiz.questions.iter().enumerate() {
        let n = idx + 1;
        if !seen_ids.insert(question.id) {
            issues.push(ValidationIssue::error(
                Some(n),
                format!("Duplicate id {}", question.id),
            ));
        }
        check_question(n, question, &mut issues);
    }

    ValidationReport {
        issues,
        question_count: quiz.questions.len(),
    }
}

fn check_question(n: usize, q: &Question, issues: &mut Vec<ValidationIssue>) {
    let at = Some(n);

    if q.question.trim().is_empty() {
        issues.push(ValidationIssue::error(at, "Missing question text"));
    } else if q.question.chars().count() > LONG_PROMPT_CHARS {
        issues.push(ValidationIssue::warning(
            at,
            format!("Question text is longer than {LONG_PROMPT_CHARS} characters"),
        ));
    }

    if q.kind.has_options() {
        if q.options.len() < 2 {
            issues.push(ValidationIssue::error(at, "Need at least 2 options"));
        }
        if q.options.len() > CROWDED_OPTIONS {
            issues.push(ValidationIssue::warning(
                at,
                format!("{} options will crowd the frame", q.options.len()),
            ));
        }
        let mut seen = HashSet::new();
        for option in &q.options {
            if option.trim().is_empty() {
                issues.push(ValidationIssue::error(at, "Empty option"));
            } else if !seen.insert(option.trim()) {
                issues.push(ValidationIssue::error(
                    at,
                    format!("Duplicate option \"{}\"", option.trim()),
                ));
            }
        }
    }

    match &q.correct_answer {
        None => issues.push(ValidationIssue::error(at, "Missing correct answer")),
        Some(AnswerKey::Text(t)) if t.trim().is_empty() => {
            issues.push(ValidationIssue::error(at, "Missing correct answer"));
        }
        Some(_) if q.kind.has_options() && q.correct_index().is_none() => {
            issues.push(ValidationIssue::error(at, "Correct answer not in options"));
        }
        Some(AnswerKey::Index(_)) if q.kind == QuestionKind::ShortAnswer => {
            issues.push(ValidationIssue::error(
                at,
                "Short answer questions need the answer text, not an index",
            ));
        }
        Some(_) => {}
    }

    if let Some(secs) = q.duration {
        if !(MIN_QUESTION_SECS..=MAX_QUESTION_SECS).contains(&secs) {
            issues.push(ValidationIssue::error(
                at,
                format!(
                    "Duration {secs}s is outside {MIN_QUESTION_SECS}-{MAX_QUESTION_SECS}s"
                ),
            ));
        }
    }

    if q.points == Some(0) {
        issues.push(ValidationIssue::error(at, "Points must be greater than 0"));
    }
}
