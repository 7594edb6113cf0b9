//! Summary statistics for a quiz.

use crate::model::{Difficulty, QuestionKind, Quiz};
use crate::settings::VideoSettings;
use crate::timeline::Timeline;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Counts and estimates for one quiz
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizStats {
    /// Quiz title
    pub title: String,
    /// Number of questions
    pub question_count: usize,
    /// Questions per difficulty
    pub by_difficulty: BTreeMap<String, usize>,
    /// Questions per kind
    pub by_kind: BTreeMap<String, usize>,
    /// Sum of point values
    pub total_points: u32,
    /// Rendered length with the given settings, in seconds
    pub estimated_duration_secs: f64,
    /// Mean option count over questions that have options
    pub average_options: f64,
    /// Questions carrying an explanation
    pub with_explanations: usize,
}

impl QuizStats {
    /// Compute statistics; the duration estimate uses `settings`
    #[must_use]
    pub fn from_quiz(quiz: &Quiz, settings: &VideoSettings) -> Self {
        let mut by_difficulty: BTreeMap<String, usize> = Difficulty::ALL
            .iter()
            .map(|d| (d.to_string(), 0))
            .collect();
        let mut by_kind = BTreeMap::new();
        for question in &quiz.questions {
            *by_difficulty.entry(question.difficulty.to_string()).or_insert(0) += 1;
            *by_kind.entry(kind_key(question.kind).to_string()).or_insert(0) += 1;
        }

        let with_options: Vec<usize> = quiz
            .questions
            .iter()
            .filter(|q| !q.options.is_empty())
            .map(|q| q.options.len())
            .collect();
        let average_options = if with_options.is_empty() {
            0.0
        } else {
            with_options.iter().sum::<usize>() as f64 / with_options.len() as f64
        };

        Self {
            title: quiz.title().to_string(),
            question_count: quiz.question_count(),
            by_difficulty,
            by_kind,
            total_points: quiz.total_points(),
            estimated_duration_secs: Timeline::build(quiz, settings).total_duration(),
            average_options,
            with_explanations: quiz
                .questions
                .iter()
                .filter(|q| q.explanation().is_some())
                .count(),
        }
    }
}

const fn kind_key(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::MultipleChoice => "multiple_choice",
        QuestionKind::TrueFalse => "true_false",
        QuestionKind::ShortAnswer => "short_answer",
    }
}

fn format_duration(secs: f64) -> String {
    let total = secs.round() as u64;
    format!("{}m {:02}s", total / 60, total % 60)
}

impl fmt::Display for QuizStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quiz: {}", self.title)?;
        writeln!(f, "Questions: {}", self.question_count)?;
        writeln!(f, "Total points: {}", self.total_points)?;
        writeln!(
            f,
            "Estimated duration: {}",
            format_duration(self.estimated_duration_secs)
        )?;
        writeln!(f, "Average options: {:.1}", self.average_options)?;
        writeln!(f, "With explanations: {}", self.with_explanations)?;
        writeln!(f, "By difficulty:")?;
        for (name, count) in &self.by_difficulty {
            writeln!(f, "  {name}: {count}")?;
        }
        writeln!(f, "By type:")?;
        for (name, count) in &self.by_kind {
            writeln!(f, "  {name}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn quiz() -> Quiz {
        Quiz::new("Mixed")
            .with_question(
                Question::multiple_choice("a", ["1", "2", "3", "4"], 0)
                    .with_difficulty(Difficulty::Hard)
                    .with_points(20)
                    .with_explanation("why"),
            )
            .with_question(Question::true_false("b", false))
            .with_question(Question::short_answer("c", "x"))
    }

    #[test]
    fn test_counts() {
        let stats = QuizStats::from_quiz(&quiz(), &VideoSettings::default());
        assert_eq!(stats.question_count, 3);
        assert_eq!(stats.total_points, 40);
        assert_eq!(stats.by_difficulty["hard"], 1);
        assert_eq!(stats.by_difficulty["medium"], 2);
        assert_eq!(stats.by_difficulty["easy"], 0);
        assert_eq!(stats.by_kind["true_false"], 1);
        assert_eq!(stats.with_explanations, 1);
        assert!((stats.average_options - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duration_matches_timeline() {
        let settings = VideoSettings::default();
        let stats = QuizStats::from_quiz(&quiz(), &settings);
        let expected = Timeline::build(&quiz(), &settings).total_duration();
        assert!((stats.estimated_duration_secs - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_quiz() {
        let stats = QuizStats::from_quiz(&Quiz::new("none"), &VideoSettings::default());
        assert_eq!(stats.question_count, 0);
        assert!(stats.average_options.abs() < f64::EPSILON);
    }

    #[test]
    fn test_display() {
        let text = QuizStats::from_quiz(&quiz(), &VideoSettings::default()).to_string();
        assert!(text.contains("Questions: 3"));
        assert!(text.contains("  short_answer: 1"));
        assert!(text.contains("Estimated duration: 0m "));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(125.4), "2m 05s");
    }
}
