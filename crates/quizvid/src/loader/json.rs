//! JSON quiz documents.
//!
//! Three layouts are accepted: the canonical `{metadata, questions, settings}`
//! document, the flat layout saved by older editors (`title`, `description`,
//! `created_at` next to `questions`), and a bare array of questions.

use crate::error::{QuizError, QuizResult};
use crate::model::{Question, Quiz, QuizMetadata, QuizSettings};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct FlatQuiz {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    questions: Vec<Question>,
    #[serde(default)]
    settings: QuizSettings,
}

impl From<FlatQuiz> for Quiz {
    fn from(flat: FlatQuiz) -> Self {
        Self {
            metadata: QuizMetadata {
                title: flat.title,
                description: flat.description,
                author: flat.author,
                category: flat.category,
                difficulty: None,
                created_at: flat.created_at,
            },
            questions: flat.questions,
            settings: flat.settings,
        }
    }
}

fn invalid(e: impl std::fmt::Display) -> QuizError {
    QuizError::parse("json", e.to_string())
}

/// Parse a JSON quiz document (not yet normalised).
pub fn parse_json(text: &str) -> QuizResult<Quiz> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| invalid(format!("Invalid JSON format: {e}")))?;

    match Layout::of(&value) {
        Some(Layout::Bare) => {
            let questions: Vec<Question> = serde_json::from_value(value).map_err(invalid)?;
            Ok(Quiz {
                questions,
                ..Quiz::default()
            })
        }
        Some(Layout::Canonical) => serde_json::from_value(value).map_err(invalid),
        Some(Layout::Flat) => {
            let flat: FlatQuiz = serde_json::from_value(value).map_err(invalid)?;
            Ok(flat.into())
        }
        None => Err(invalid(
            "JSON must contain a quiz object with questions or a list of questions",
        )),
    }
}

enum Layout {
    Canonical,
    Flat,
    Bare,
}

impl Layout {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Array(_) => Some(Self::Bare),
            Value::Object(map) if map.contains_key("metadata") => Some(Self::Canonical),
            Value::Object(map) if map.contains_key("questions") => Some(Self::Flat),
            _ => None,
        }
    }
}
