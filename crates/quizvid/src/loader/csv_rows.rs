//! CSV quiz import: one question per row.

use crate::error::{QuizError, QuizResult};
use crate::model::{AnswerKey, Difficulty, Question, QuestionKind, Quiz};
use std::collections::HashMap;
use tracing::warn;

/// Columns every CSV quiz must have, in the order they are reported when missing
pub const CSV_REQUIRED_COLUMNS: [&str; 6] = [
    "question",
    "option_a",
    "option_b",
    "option_c",
    "option_d",
    "correct_answer",
];

/// Columns read when present
pub const CSV_OPTIONAL_COLUMNS: [&str; 5] = ["explanation", "difficulty", "duration", "points", "type"];

const OPTION_COLUMNS: [&str; 4] = ["option_a", "option_b", "option_c", "option_d"];

struct Row<'a> {
    record: &'a csv::StringRecord,
    columns: &'a HashMap<String, usize>,
    line: u64,
}

impl Row<'_> {
    fn get(&self, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .unwrap_or("")
    }

    fn number(&self, column: &str) -> QuizResult<Option<u32>> {
        let raw = self.get(column);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(|_| {
            QuizError::parse(
                "csv",
                format!("line {}: {column} must be a whole number, got '{raw}'", self.line),
            )
        })
    }
}

/// Parse a CSV quiz (not yet normalised).
pub fn parse_csv(text: &str) -> QuizResult<Quiz> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| QuizError::parse("csv", e.to_string()))?
        .clone();
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_ascii_lowercase(), i))
        .collect();

    let missing: Vec<String> = CSV_REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(**c))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(QuizError::MissingColumns { columns: missing });
    }

    let mut quiz = Quiz::default();
    for record in reader.records() {
        let record = record.map_err(|e| QuizError::parse("csv", e.to_string()))?;
        let row = Row {
            record: &record,
            columns: &columns,
            line: record.position().map_or(0, csv::Position::line),
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        quiz.questions.push(row_to_question(&row)?);
    }
    Ok(quiz)
}

fn row_to_question(row: &Row<'_>) -> QuizResult<Question> {
    let cells = OPTION_COLUMNS.map(|c| row.get(c));
    let options: Vec<String> = cells
        .iter()
        .filter(|o| !o.is_empty())
        .map(ToString::to_string)
        .collect();

    let kind = match row.get("type") {
        "" => {
            if options.is_empty() {
                QuestionKind::ShortAnswer
            } else {
                QuestionKind::MultipleChoice
            }
        }
        raw => serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|_| {
            QuizError::parse("csv", format!("line {}: unknown question type '{raw}'", row.line))
        })?,
    };

    let difficulty = match row.get("difficulty") {
        "" => Difficulty::default(),
        raw => Difficulty::parse(raw).unwrap_or_else(|| {
            warn!(line = row.line, value = raw, "unknown difficulty, using medium");
            Difficulty::default()
        }),
    };

    let answer = row.get("correct_answer");
    let correct_answer = if answer.is_empty() {
        None
    } else {
        answer_key(answer, &cells)
    };

    let explanation = Some(row.get("explanation"))
        .filter(|e| !e.is_empty())
        .map(ToString::to_string);

    Ok(Question {
        id: 0,
        question: row.get("question").to_string(),
        kind,
        options,
        correct_answer,
        explanation,
        duration: row.number("duration")?,
        points: row.number("points")?,
        difficulty,
    })
}

/// A lone letter A-D names the text in that option column unless some
/// option's text is literally that letter. A letter pointing at an empty
/// cell leaves the answer unset.
fn answer_key(answer: &str, cells: &[&str; 4]) -> Option<AnswerKey> {
    let mut chars = answer.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        let upper = letter.to_ascii_uppercase();
        if ('A'..='D').contains(&upper) && !cells.iter().any(|o| *o == answer) {
            let cell = cells[(upper as u8 - b'A') as usize];
            return (!cell.is_empty()).then(|| AnswerKey::Text(cell.to_string()));
        }
    }
    Some(AnswerKey::Text(answer.to_string()))
}
