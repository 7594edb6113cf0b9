//! SRT subtitles following the video timeline.

use crate::model::Quiz;
use crate::timeline::{PhaseKind, SegmentKind, Timeline};
use std::fmt::Write as _;
use std::path::Path;

/// Letter label for an option position (A, B, C, ...)
#[must_use]
pub fn option_label(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

/// `HH:MM:SS,mmm`
#[must_use]
pub fn srt_timestamp(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60,
        ms
    )
}

struct Cue {
    start: f64,
    end: f64,
    text: String,
}

fn cues(quiz: &Quiz, timeline: &Timeline) -> Vec<Cue> {
    let mut cues = Vec::new();
    for segment in &timeline.segments {
        match segment.kind {
            SegmentKind::Intro => {
                let mut text = quiz.title().to_string();
                if !quiz.metadata.description.trim().is_empty() {
                    text.push('\n');
                    text.push_str(quiz.metadata.description.trim());
                }
                cues.push(Cue {
                    start: segment.start,
                    end: segment.end(),
                    text,
                });
            }
            SegmentKind::Question { index } => {
                let Some(question) = quiz.questions.get(index) else {
                    continue;
                };
                for phase in &segment.phases {
                    let text = match phase.kind {
                        PhaseKind::Prompt => {
                            let mut text = format!("Q{}. {}", index + 1, question.question);
                            if !question.options.is_empty() {
                                let options: Vec<String> = question
                                    .options
                                    .iter()
                                    .enumerate()
                                    .map(|(i, o)| format!("{}) {o}", option_label(i)))
                                    .collect();
                                text.push('\n');
                                text.push_str(&options.join("   "));
                            }
                            text
                        }
                        PhaseKind::Reveal => match question.correct_index() {
                            Some(i) => format!(
                                "Answer: {}) {}",
                                option_label(i),
                                question.options[i]
                            ),
                            None => format!("Answer: {}", question.correct_text().unwrap_or("")),
                        },
                        PhaseKind::Explanation => question.explanation().unwrap_or("").to_string(),
                    };
                    cues.push(Cue {
                        start: segment.start + phase.start,
                        end: segment.start + phase.end,
                        text,
                    });
                }
            }
        }
    }
    cues
}

/// Render the subtitle track as SRT
#[must_use]
pub fn render_srt(quiz: &Quiz, timeline: &Timeline) -> String {
    let mut out = String::new();
    for (n, cue) in cues(quiz, timeline).iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            n + 1,
            srt_timestamp(cue.start),
            srt_timestamp(cue.end),
            cue.text
        );
    }
    out
}

/// Write the SRT track to `path`
pub fn write_srt(quiz: &Quiz, timeline: &Timeline, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, render_srt(quiz, timeline))
}
