//! Text-to-speech via an external engine.
//!
//! The engine is invoked once per question as
//! `<command> -v <voice> -s <wpm> -w <out.wav> <text>` (espeak / espeak-ng
//! conventions). Each clip is placed at the start of its question's prompt.

use crate::error::{QuizError, QuizResult};
use crate::model::{Question, Quiz};
use crate::subtitles::option_label;
use crate::timeline::Timeline;
use crate::tools::find_executable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Text-to-speech engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Engine executable name or path
    pub command: String,
    /// Voice identifier
    pub voice: String,
    /// Speaking rate
    pub words_per_minute: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            command: "espeak-ng".to_string(),
            voice: "en".to_string(),
            words_per_minute: 160,
        }
    }
}

/// A synthesised clip and where it plays
#[derive(Debug, Clone, PartialEq)]
pub struct TtsClip {
    /// WAV file
    pub path: PathBuf,
    /// Absolute start on the video timeline, seconds
    pub start: f64,
}

/// Build the engine arguments for one utterance.
///
/// The text follows `--` so prompts starting with `-` are not read as flags.
#[must_use]
pub fn build_tts_args(config: &TtsConfig, text: &str, output: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        config.voice.clone(),
        "-s".to_string(),
        config.words_per_minute.to_string(),
        "-w".to_string(),
        output.to_string_lossy().to_string(),
        "--".to_string(),
        text.to_string(),
    ]
}

/// What gets read aloud for a question
#[must_use]
pub fn spoken_text(question: &Question) -> String {
    let mut text = question.question.trim().to_string();
    for (i, option) in question.options.iter().enumerate() {
        text.push_str(&format!(". {}: {}", option_label(i), option.trim()));
    }
    text
}

/// A located TTS engine
#[derive(Debug, Clone)]
pub struct TtsEngine {
    binary: PathBuf,
    config: TtsConfig,
}

impl TtsEngine {
    /// Locate the configured engine; `None` when it is not installed
    #[must_use]
    pub fn locate(config: &TtsConfig) -> Option<Self> {
        find_executable(&config.command, None).map(|binary| Self {
            binary,
            config: config.clone(),
        })
    }

    /// Engine executable
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Synthesise `text` into a WAV file
    pub fn synthesize(&self, text: &str, output: &Path) -> QuizResult<()> {
        let args = build_tts_args(&self.config, text, output);
        let result = std::process::Command::new(&self.binary)
            .args(&args)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .output()
            .map_err(|e| QuizError::Tts {
                message: format!("Failed to execute {}: {e}", self.binary.display()),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(QuizError::Tts {
                message: format!("{} exited with {}: {stderr}", self.config.command, result.status),
            });
        }
        Ok(())
    }

    /// Synthesise every question prompt into `work_dir`
    pub fn speak_quiz(
        &self,
        quiz: &Quiz,
        timeline: &Timeline,
        work_dir: &Path,
    ) -> QuizResult<Vec<TtsClip>> {
        let mut clips = Vec::new();
        for (index, segment) in timeline.question_segments() {
            let Some(question) = quiz.questions.get(index) else {
                continue;
            };
            let path = work_dir.join(format!("tts_{:03}.wav", index + 1));
            debug!(question = index + 1, path = %path.display(), "synthesising prompt");
            self.synthesize(&spoken_text(question), &path)?;
            clips.push(TtsClip {
                path,
                start: segment.start,
            });
        }
        Ok(clips)
    }
}
