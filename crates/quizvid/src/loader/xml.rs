//! XML quiz documents.
//!
//! ```xml
//! <quiz title="Space" description="Planets">
//!   <settings shuffle_questions="true"/>
//!   <question id="1" duration="12" points="20" difficulty="hard">
//!     <text>Largest planet?</text>
//!     <option>Mars</option>
//!     <option correct="true">Jupiter</option>
//!     <explanation>By mass and volume</explanation>
//!   </question>
//! </quiz>
//! ```
//!
//! An `<answer>` element may name the correct text instead of the `correct`
//! attribute.

use crate::error::{QuizError, QuizResult};
use crate::model::{AnswerKey, Difficulty, Question, QuestionKind, Quiz};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

fn invalid(e: impl std::fmt::Display) -> QuizError {
    QuizError::parse("xml", e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    None,
    Title,
    Description,
    Author,
    Category,
    Prompt,
    Option { correct: bool },
    Explanation,
    Answer,
}

fn attributes(element: &BytesStart<'_>) -> QuizResult<Vec<(String, String)>> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(invalid)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            let value = attr.unescape_value().map_err(invalid)?.trim().to_string();
            Ok((key, value))
        })
        .collect()
}

fn parse_flag(key: &str, value: &str) -> QuizResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(format!("attribute {key} must be true or false, got '{value}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> QuizResult<T> {
    value
        .parse()
        .map_err(|_| invalid(format!("attribute {key} must be a number, got '{value}'")))
}

fn apply_quiz_attributes(quiz: &mut Quiz, element: &BytesStart<'_>) -> QuizResult<()> {
    for (key, value) in attributes(element)? {
        match key.as_str() {
            "title" => quiz.metadata.title = value,
            "description" => quiz.metadata.description = value,
            "author" => quiz.metadata.author = Some(value),
            "category" => quiz.metadata.category = Some(value),
            "difficulty" => quiz.metadata.difficulty = Difficulty::parse(&value),
            "created_at" => quiz.metadata.created_at = Some(value),
            _ => {}
        }
    }
    Ok(())
}

fn apply_settings(quiz: &mut Quiz, element: &BytesStart<'_>) -> QuizResult<()> {
    let settings = &mut quiz.settings;
    for (key, value) in attributes(element)? {
        match key.as_str() {
            "shuffle_questions" => settings.shuffle_questions = parse_flag(&key, &value)?,
            "shuffle_options" => settings.shuffle_options = parse_flag(&key, &value)?,
            "show_feedback" => settings.show_feedback = parse_flag(&key, &value)?,
            "show_explanations" => settings.show_explanations = parse_flag(&key, &value)?,
            "seed" => settings.seed = Some(parse_number(&key, &value)?),
            _ => {}
        }
    }
    Ok(())
}

fn start_question(element: &BytesStart<'_>) -> QuizResult<Question> {
    let mut question = Question::multiple_choice("", Vec::<String>::new(), 0);
    question.correct_answer = None;
    for (key, value) in attributes(element)? {
        match key.as_str() {
            "id" => question.id = parse_number(&key, &value)?,
            "duration" => question.duration = Some(parse_number(&key, &value)?),
            "points" => question.points = Some(parse_number(&key, &value)?),
            "difficulty" => {
                question.difficulty = Difficulty::parse(&value)
                    .ok_or_else(|| invalid(format!("unknown difficulty '{value}'")))?;
            }
            "type" => {
                question.kind = serde_json::from_value(serde_json::Value::String(value.clone()))
                    .map_err(|_| invalid(format!("unknown question type '{value}'")))?;
            }
            _ => {}
        }
    }
    Ok(question)
}

/// Parse an XML quiz document (not yet normalised).
pub fn parse_xml(text: &str) -> QuizResult<Quiz> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut quiz = Quiz::default();
    let mut current: Option<Question> = None;
    let mut target = Target::None;
    let mut buffer = String::new();
    let mut saw_root = false;

    loop {
        match reader.read_event().map_err(invalid)? {
            Event::Start(e) => {
                buffer.clear();
                match e.name().as_ref() {
                    b"quiz" => {
                        saw_root = true;
                        apply_quiz_attributes(&mut quiz, &e)?;
                    }
                    b"settings" => apply_settings(&mut quiz, &e)?,
                    b"question" => current = Some(start_question(&e)?),
                    b"title" => target = Target::Title,
                    b"description" => target = Target::Description,
                    b"author" => target = Target::Author,
                    b"category" => target = Target::Category,
                    b"text" | b"prompt" => target = Target::Prompt,
                    b"option" => {
                        let correct = attributes(&e)?
                            .iter()
                            .find(|(k, _)| k == "correct")
                            .map(|(k, v)| parse_flag(k, v))
                            .transpose()?
                            .unwrap_or(false);
                        target = Target::Option { correct };
                    }
                    b"explanation" => target = Target::Explanation,
                    b"answer" => target = Target::Answer,
                    _ => target = Target::None,
                }
            }
            Event::Empty(e) => match e.name().as_ref() {
                b"quiz" => {
                    saw_root = true;
                    apply_quiz_attributes(&mut quiz, &e)?;
                }
                b"settings" => apply_settings(&mut quiz, &e)?,
                _ => {}
            },
            Event::Text(t) => {
                if target != Target::None {
                    buffer.push_str(&t.unescape().map_err(invalid)?);
                }
            }
            Event::CData(c) => {
                if target != Target::None {
                    buffer.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"question" {
                    if let Some(question) = current.take() {
                        quiz.questions.push(question);
                    }
                } else {
                    finish_target(&mut quiz, current.as_mut(), target, buffer.trim());
                }
                target = Target::None;
                buffer.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(invalid("missing <quiz> root element"));
    }
    Ok(quiz)
}

fn finish_target(quiz: &mut Quiz, question: Option<&mut Question>, target: Target, text: &str) {
    let text = text.to_string();
    match (target, question) {
        (Target::Title, None) => quiz.metadata.title = text,
        (Target::Description, None) => quiz.metadata.description = text,
        (Target::Author, None) => quiz.metadata.author = Some(text),
        (Target::Category, None) => quiz.metadata.category = Some(text),
        (Target::Prompt, Some(q)) => q.question = text,
        (Target::Option { correct }, Some(q)) => {
            if correct {
                q.correct_answer = Some(AnswerKey::Index(q.options.len()));
            }
            q.options.push(text);
        }
        (Target::Explanation, Some(q)) => q.explanation = Some(text),
        (Target::Answer, Some(q)) => {
            q.correct_answer = Some(AnswerKey::Text(text));
            if q.options.is_empty() && q.kind == QuestionKind::MultipleChoice {
                q.kind = QuestionKind::ShortAnswer;
            }
        }
        _ => {}
    }
}
