//! Quiz data model.
//!
//! A [`Quiz`] is loaded from JSON, CSV or XML, normalised once (ids assigned,
//! textual answers resolved to option indices) and then handed to validation
//! and rendering unchanged.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points awarded for a question that does not declare its own value
pub const DEFAULT_POINTS: u32 = 10;

/// Question difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Easy
    #[serde(alias = "Easy", alias = "EASY")]
    Easy,
    /// Medium (default)
    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    /// Hard
    #[serde(alias = "Hard", alias = "HARD")]
    Hard,
}

impl Difficulty {
    /// All difficulties, easiest first
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Parse a difficulty name, ignoring case and surrounding whitespace
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// Kind of question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Pick one of several options
    #[default]
    #[serde(alias = "Multiple Choice", alias = "multiple-choice", alias = "mcq")]
    MultipleChoice,
    /// True or false
    #[serde(alias = "True/False", alias = "true-false", alias = "boolean")]
    TrueFalse,
    /// Free text answer, revealed after the countdown
    #[serde(alias = "Short Answer", alias = "short-answer", alias = "text")]
    ShortAnswer,
}

impl QuestionKind {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MultipleChoice => "Multiple Choice",
            Self::TrueFalse => "True/False",
            Self::ShortAnswer => "Short Answer",
        }
    }

    /// Whether the question presents options to choose from
    #[must_use]
    pub const fn has_options(self) -> bool {
        !matches!(self, Self::ShortAnswer)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The correct answer of a question.
///
/// Input documents may give either an option index or the answer text;
/// [`Question::normalize`] resolves text to an index when it names an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    /// Zero-based index into `options`
    Index(usize),
    /// Answer text
    Text(String),
}

/// A single quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within the quiz (0 until assigned)
    #[serde(default)]
    pub id: u32,
    /// Prompt text
    #[serde(default, alias = "text", alias = "prompt")]
    pub question: String,
    /// Question kind
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    /// Answer options
    #[serde(default)]
    pub options: Vec<String>,
    /// Correct answer
    #[serde(default, alias = "answer")]
    pub correct_answer: Option<AnswerKey>,
    /// Explanation shown after the reveal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Seconds the prompt stays on screen (falls back to the video settings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Points awarded for a correct answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    /// Difficulty
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Question {
    /// Create a multiple choice question with the correct option at `correct`
    #[must_use]
    pub fn multiple_choice(
        question: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        correct: usize,
    ) -> Self {
        Self {
            id: 0,
            question: question.into(),
            kind: QuestionKind::MultipleChoice,
            options: options.into_iter().map(Into::into).collect(),
            correct_answer: Some(AnswerKey::Index(correct)),
            explanation: None,
            duration: None,
            points: None,
            difficulty: Difficulty::default(),
        }
    }

    /// Create a true/false question
    #[must_use]
    pub fn true_false(question: impl Into<String>, answer: bool) -> Self {
        Self {
            kind: QuestionKind::TrueFalse,
            ..Self::multiple_choice(question, ["True", "False"], usize::from(!answer))
        }
    }

    /// Create a short answer question
    #[must_use]
    pub fn short_answer(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::ShortAnswer,
            options: Vec::new(),
            correct_answer: Some(AnswerKey::Text(answer.into())),
            ..Self::multiple_choice(question, Vec::<String>::new(), 0)
        }
    }

    /// Set the explanation
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Set the on-screen duration in seconds
    #[must_use]
    pub const fn with_duration(mut self, secs: u32) -> Self {
        self.duration = Some(secs);
        self
    }

    /// Set the point value
    #[must_use]
    pub const fn with_points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    /// Set the difficulty
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Point value, defaulting to [`DEFAULT_POINTS`]
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_POINTS)
    }

    /// Non-empty explanation, if any
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Index of the correct option, when the answer names one
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        match self.correct_answer {
            Some(AnswerKey::Index(i)) if i < self.options.len() => Some(i),
            _ => None,
        }
    }

    /// Text of the correct answer
    #[must_use]
    pub fn correct_text(&self) -> Option<&str> {
        match self.correct_answer.as_ref()? {
            AnswerKey::Index(i) => self.options.get(*i).map(String::as_str),
            AnswerKey::Text(t) => Some(t.as_str()),
        }
    }

    /// Resolve textual answers to option indices and fill in true/false options.
    pub fn normalize(&mut self) {
        if self.kind == QuestionKind::TrueFalse && self.options.is_empty() {
            self.options = vec!["True".to_string(), "False".to_string()];
        }
        if !self.kind.has_options() {
            return;
        }
        if let Some(AnswerKey::Text(text)) = &self.correct_answer {
            if let Some(idx) = find_option(&self.options, text) {
                self.correct_answer = Some(AnswerKey::Index(idx));
            }
        }
    }
}

/// Exact match first, then a trimmed case-insensitive match.
fn find_option(options: &[String], text: &str) -> Option<usize> {
    options.iter().position(|o| o == text).or_else(|| {
        let wanted = text.trim().to_lowercase();
        options
            .iter()
            .position(|o| o.trim().to_lowercase() == wanted)
    })
}

/// Descriptive metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizMetadata {
    /// Quiz title
    #[serde(default)]
    pub title: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Overall difficulty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Creation timestamp (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// Presentation flags carried by the quiz document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Shuffle question order before rendering
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Shuffle option order within each choice question
    #[serde(default)]
    pub shuffle_options: bool,
    /// Highlight the correct answer after the countdown
    #[serde(default = "default_true", alias = "show_correct_answer")]
    pub show_feedback: bool,
    /// Show explanations after the reveal
    #[serde(default = "default_true")]
    pub show_explanations: bool,
    /// Seed for shuffling; a fixed seed makes renders reproducible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            shuffle_questions: false,
            shuffle_options: false,
            show_feedback: true,
            show_explanations: true,
            seed: None,
        }
    }
}

/// A complete quiz document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Metadata block
    #[serde(default)]
    pub metadata: QuizMetadata,
    /// Questions in presentation order
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Presentation flags
    #[serde(default)]
    pub settings: QuizSettings,
}

impl Quiz {
    /// Create an empty quiz with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            metadata: QuizMetadata {
                title: title.into(),
                ..QuizMetadata::default()
            },
            ..Self::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    /// Append a question, assigning the next free id when it has none
    pub fn push_question(&mut self, mut question: Question) {
        if question.id == 0 {
            question.id = self.next_id();
        }
        question.normalize();
        self.questions.push(question);
    }

    /// Builder form of [`Quiz::push_question`]
    #[must_use]
    pub fn with_question(mut self, question: Question) -> Self {
        self.push_question(question);
        self
    }

    fn next_id(&self) -> u32 {
        self.questions.iter().map(|q| q.id).max().unwrap_or(0) + 1
    }

    /// Title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Number of questions
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Sum of all question point values
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(Question::points).sum()
    }

    /// Assign missing ids (1-based, document order) and normalise answers.
    pub fn normalize(&mut self) {
        for (idx, q) in self.questions.iter_mut().enumerate() {
            if q.id == 0 {
                q.id = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            }
            q.normalize();
        }
    }

    /// File-name friendly form of the title: spaces become underscores and
    /// path separators are dropped.
    #[must_use]
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .metadata
            .title
            .trim()
            .chars()
            .filter_map(|c| match c {
                ' ' => Some('_'),
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => None,
                c => Some(c),
            })
            .collect();
        if stem.is_empty() {
            "quiz".to_string()
        } else {
            stem
        }
    }

    /// Apply the shuffle settings deterministically.
    ///
    /// The quiz's own `settings.seed` takes precedence over `seed`. Shuffled
    /// options keep pointing at the same correct text.
    #[must_use]
    pub fn arranged(&self, seed: u64) -> Self {
        let mut quiz = self.clone();
        let mut rng = StdRng::seed_from_u64(self.settings.seed.unwrap_or(seed));

        if quiz.settings.shuffle_questions {
            quiz.questions.shuffle(&mut rng);
        }
        if quiz.settings.shuffle_options {
            for q in &mut quiz.questions {
                if q.kind == QuestionKind::MultipleChoice && q.options.len() > 1 {
                    shuffle_options(q, &mut rng);
                }
            }
        }
        quiz
    }
}

fn shuffle_options(question: &mut Question, rng: &mut StdRng) {
    let mut order: Vec<usize> = (0..question.options.len()).collect();
    order.shuffle(rng);

    let correct = question.correct_index();
    question.options = order.iter().map(|&i| question.options[i].clone()).collect();
    if let Some(old) = correct {
        if let Some(new) = order.iter().position(|&i| i == old) {
            question.correct_answer = Some(AnswerKey::Index(new));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_quiz() -> Quiz {
        Quiz::new("Rust Basics")
            .with_description("Ownership and borrowing")
            .with_question(Question::multiple_choice(
                "Which keyword makes a binding mutable?",
                ["let", "mut", "ref", "move"],
                1,
            ))
            .with_question(Question::true_false("Rust has a garbage collector", false))
            .with_question(Question::short_answer("Name the borrow checker's unit", "lifetime"))
    }

    #[test]
    fn test_push_assigns_ids() {
        let quiz = sample_quiz();
        let ids: Vec<u32> = quiz.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_true_false_answer_index() {
        let q = Question::true_false("Sky is blue", true);
        assert_eq!(q.correct_text(), Some("True"));
        let q = Question::true_false("Sky is green", false);
        assert_eq!(q.correct_text(), Some("False"));
    }

    #[test]
    fn test_normalize_resolves_text_answer() {
        let mut q = Question::multiple_choice("Pick", ["Alpha", "Beta"], 0);
        q.correct_answer = Some(AnswerKey::Text(" beta ".to_string()));
        q.normalize();
        assert_eq!(q.correct_answer, Some(AnswerKey::Index(1)));
    }

    #[test]
    fn test_normalize_leaves_unknown_text() {
        let mut q = Question::multiple_choice("Pick", ["Alpha", "Beta"], 0);
        q.correct_answer = Some(AnswerKey::Text("Gamma".to_string()));
        q.normalize();
        assert_eq!(q.correct_answer, Some(AnswerKey::Text("Gamma".to_string())));
        assert_eq!(q.correct_index(), None);
    }

    #[test]
    fn test_normalize_fills_true_false_options() {
        let mut q = Question::true_false("x", true);
        q.options.clear();
        q.correct_answer = Some(AnswerKey::Text("false".to_string()));
        q.normalize();
        assert_eq!(q.options, vec!["True", "False"]);
        assert_eq!(q.correct_index(), Some(1));
    }

    #[test]
    fn test_short_answer_keeps_text() {
        let mut q = Question::short_answer("Capital of France?", "Paris");
        q.normalize();
        assert_eq!(q.correct_text(), Some("Paris"));
        assert!(q.options.is_empty());
    }

    #[test]
    fn test_points_default() {
        let q = Question::multiple_choice("q", ["a", "b"], 0);
        assert_eq!(q.points(), DEFAULT_POINTS);
        assert_eq!(q.with_points(25).points(), 25);
    }

    #[test]
    fn test_total_points() {
        let quiz = sample_quiz();
        assert_eq!(quiz.total_points(), 30);
    }

    #[test]
    fn test_blank_explanation_is_none() {
        let q = Question::multiple_choice("q", ["a", "b"], 0).with_explanation("   ");
        assert_eq!(q.explanation(), None);
    }

    #[test]
    fn test_file_stem() {
        let quiz = Quiz::new("Python Basics: Part 1/2");
        assert_eq!(quiz.file_stem(), "Python_Basics_Part_12");
        assert_eq!(Quiz::new("  ").file_stem(), "quiz");
    }

    #[test]
    fn test_kind_aliases_deserialize() {
        let q: Question =
            serde_json::from_str(r#"{"question":"q","type":"True/False","correct_answer":"True"}"#)
                .unwrap();
        assert_eq!(q.kind, QuestionKind::TrueFalse);
    }

    #[test]
    fn test_answer_key_untagged() {
        let q: Question = serde_json::from_str(
            r#"{"question":"q","options":["a","b"],"correct_answer":1}"#,
        )
        .unwrap();
        assert_eq!(q.correct_answer, Some(AnswerKey::Index(1)));
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"correct_answer\":1"));
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse(" HARD "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("extreme"), None);
    }

    #[test]
    fn test_arranged_without_shuffle_is_identity() {
        let quiz = sample_quiz();
        assert_eq!(quiz.arranged(42), quiz);
    }

    #[test]
    fn test_arranged_is_deterministic() {
        let mut quiz = sample_quiz();
        quiz.settings.shuffle_questions = true;
        quiz.settings.shuffle_options = true;
        assert_eq!(quiz.arranged(7), quiz.arranged(7));
    }

    #[test]
    fn test_arranged_prefers_document_seed() {
        let mut quiz = sample_quiz();
        quiz.settings.shuffle_questions = true;
        quiz.settings.seed = Some(99);
        assert_eq!(quiz.arranged(1), quiz.arranged(2));
    }

    #[test]
    fn test_true_false_options_never_shuffled() {
        let mut quiz = sample_quiz();
        quiz.settings.shuffle_options = true;
        for seed in 0..20 {
            let arranged = quiz.arranged(seed);
            assert_eq!(arranged.questions[1].options, vec!["True", "False"]);
        }
    }

    proptest! {
        #[test]
        fn prop_shuffled_options_keep_correct_text(
            options in prop::collection::hash_set("[a-z]{1,8}", 2..6),
            pick in 0usize..6,
            seed in any::<u64>(),
        ) {
            let options: Vec<String> = options.into_iter().collect();
            let correct = pick % options.len();
            let expected = options[correct].clone();
            let mut quiz = Quiz::new("p").with_question(
                Question::multiple_choice("q", options.clone(), correct),
            );
            quiz.settings.shuffle_options = true;

            let arranged = quiz.arranged(seed);
            let q = &arranged.questions[0];
            prop_assert_eq!(q.correct_text(), Some(expected.as_str()));
            let mut sorted = q.options.clone();
            sorted.sort();
            let mut original = options;
            original.sort();
            prop_assert_eq!(sorted, original);
        }
    }
}
