//! High-level quiz-to-video pipeline.
//!
//! ```text
//! load → validate → template → arrange → timeline → narration / subtitles
//!      → ffmpeg → history (→ verify)
//! ```

use super::plan::{build_ffmpeg_args, RenderPlan};
use super::runner::{locate_binary, render_video};
use crate::config::AppConfig;
use crate::error::{QuizError, QuizResult};
use crate::history::{append_history, HistoryRecord};
use crate::loader::load_quiz;
use crate::model::Quiz;
use crate::settings::{OutputFormat, VideoSettings};
use crate::subtitles::write_srt;
use crate::template::{Template, TemplateRegistry, DEFAULT_TEMPLATE};
use crate::tts::TtsEngine;
use crate::validation::validate_quiz;
use crate::verify::{probe_video, verify_output, VerificationReport, VideoExpectations};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Result of a successful generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    /// Rendered video
    pub output: PathBuf,
    /// Video length in seconds
    pub duration: f64,
    /// Questions rendered
    pub question_count: usize,
    /// Sidecar subtitle file
    pub subtitles: Option<PathBuf>,
    /// What the file should probe as
    pub expectations: VideoExpectations,
    /// Shuffle seed, when the quiz shuffles questions or options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// FFmpeg command for a dry run and the directory holding the files it reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryRun {
    /// Program followed by its arguments
    pub command: Vec<String>,
    /// Text overlays and subtitle track referenced by `command`
    pub work_dir: PathBuf,
}

/// Default output file name: `{Title}_{YYYYmmdd_HHMMSS}.{ext}`
#[must_use]
pub fn default_output_name(quiz: &Quiz, format: OutputFormat, now: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        quiz.file_stem(),
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// `name` with `_{n}` inserted before the extension
fn numbered(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{n}.{ext}"),
        None => format!("{name}_{n}"),
    }
}

/// Turns quizzes into videos with a fixed configuration
#[derive(Debug, Clone)]
pub struct QuizVideoGenerator {
    config: AppConfig,
    templates: TemplateRegistry,
    seed: Option<u64>,
    record_history: bool,
    claimed: Arc<Mutex<HashSet<PathBuf>>>,
}

impl QuizVideoGenerator {
    /// Create a generator, loading custom templates and checking the
    /// configured template exists
    pub fn new(config: AppConfig) -> QuizResult<Self> {
        config.validate()?;
        let templates = TemplateRegistry::load(config.templates_dir.as_deref())?;
        if let Some(name) = &config.template {
            templates.get(name)?;
        }
        Ok(Self {
            config,
            templates,
            seed: None,
            record_history: true,
            claimed: Arc::default(),
        })
    }

    /// Fix the shuffle seed, overriding the quiz document's own seed
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable history records
    #[must_use]
    pub const fn with_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    /// Effective configuration
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Available templates
    #[must_use]
    pub const fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Load a quiz file
    pub fn load(&self, path: &Path) -> QuizResult<Quiz> {
        load_quiz(path)
    }

    /// Output path and container for a quiz.
    ///
    /// `None` or an existing directory gets the default file name; a path
    /// with a known video extension selects that container. A default name
    /// never repeats an existing file or a name this generator (or a clone
    /// of it) already handed out: `_2`, `_3`, ... is appended instead.
    #[must_use]
    pub fn resolve_output(&self, quiz: &Quiz, output: Option<&Path>) -> (PathBuf, OutputFormat) {
        match output {
            None => {
                let format = self.config.format;
                (self.claim_default(&self.config.output_dir, quiz, format), format)
            }
            Some(dir) if dir.is_dir() => {
                let format = self.config.format;
                (self.claim_default(dir, quiz, format), format)
            }
            Some(path) => match OutputFormat::from_path(path) {
                Some(format) => (path.to_path_buf(), format),
                None => {
                    let format = self.config.format;
                    let mut path = path.to_path_buf().into_os_string();
                    path.push(".");
                    path.push(format.extension());
                    (PathBuf::from(path), format)
                }
            },
        }
    }

    fn claim_default(&self, dir: &Path, quiz: &Quiz, format: OutputFormat) -> PathBuf {
        self.claim(dir, &default_output_name(quiz, format, Local::now()))
    }

    fn claim(&self, dir: &Path, name: &str) -> PathBuf {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = dir.join(name);
        let mut n = 1;
        while candidate.exists() || claimed.contains(&candidate) {
            n += 1;
            candidate = dir.join(numbered(name, n));
        }
        claimed.insert(candidate.clone());
        candidate
    }

    /// Configured template and the video settings it styles
    fn style(&self) -> QuizResult<(Template, VideoSettings)> {
        let mut settings = self.config.video.clone();
        let template = match &self.config.template {
            Some(name) => {
                let template = self.templates.get(name)?.clone();
                template.apply(&mut settings);
                template
            }
            // Video settings keep their own colors and font; the default
            // template only supplies accent and highlight colors.
            None => self.templates.get(DEFAULT_TEMPLATE)?.clone(),
        };
        Ok((template, settings))
    }

    /// Validate, style and arrange a quiz into a plan without audio.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Validation`] listing every error in the quiz.
    pub fn plan(&self, quiz: &Quiz, output: Option<&Path>, work_dir: &Path) -> QuizResult<RenderPlan> {
        validate_quiz(quiz).into_result()?;

        let (template, settings) = self.style()?;
        settings.validate()?;

        let mut source = quiz.clone();
        let seed = self
            .seed
            .or(quiz.settings.seed)
            .unwrap_or_else(rand::random);
        source.settings.seed = Some(seed);
        let arranged = source.arranged(seed);

        let (output, format) = self.resolve_output(quiz, output);
        Ok(RenderPlan::new(
            arranged,
            settings,
            template,
            format,
            self.config.quality,
            work_dir,
            output,
        ))
    }

    fn music(&self, plan: &RenderPlan) -> Option<PathBuf> {
        if !plan.settings.background_music {
            return None;
        }
        let path = self.config.background_music.as_ref()?;
        if path.is_file() {
            Some(path.clone())
        } else {
            warn!(path = %path.display(), "background music not found; rendering without it");
            None
        }
    }

    /// FFmpeg command line (program first) that `generate` would run.
    ///
    /// The text overlays and subtitle track the command reads are written to
    /// a work directory that is kept, so the command can be run by hand.
    /// Narration is left out since it needs the TTS engine to run.
    pub fn dry_run(&self, quiz: &Quiz, output: Option<&Path>) -> QuizResult<DryRun> {
        let work_dir = std::env::temp_dir()
            .join("quizvid-dry-run")
            .join(quiz.file_stem());
        let mut plan = self.plan(quiz, output, &work_dir)?;
        plan.write_text_files()?;
        if let Some(music) = self.music(&plan) {
            plan = plan.with_music(music);
        }
        if plan.settings.subtitles {
            let track = work_dir.join("subtitles.srt");
            write_srt(&plan.quiz, &plan.timeline, &track)?;
            plan = plan.with_subtitles(track);
        }

        let program = locate_binary("ffmpeg", self.config.ffmpeg_path.as_deref()).map_or_else(
            |_| {
                self.config
                    .ffmpeg_path
                    .as_ref()
                    .map_or_else(|| "ffmpeg".to_string(), |p| p.display().to_string())
            },
            |p| p.display().to_string(),
        );
        let mut command = vec![program];
        command.extend(build_ffmpeg_args(&plan));
        Ok(DryRun { command, work_dir })
    }

    /// Render a quiz
    pub fn generate(&self, quiz: &Quiz, output: Option<&Path>) -> QuizResult<GenerationOutcome> {
        self.generate_with_progress(quiz, output, &mut |_| {})
    }

    /// Render a quiz, reporting encoder progress in `0.0..=1.0`
    pub fn generate_with_progress(
        &self,
        quiz: &Quiz,
        output: Option<&Path>,
        on_progress: &mut dyn FnMut(f64),
    ) -> QuizResult<GenerationOutcome> {
        let result = self.render(quiz, output, on_progress);
        if self.record_history {
            self.record(quiz, &result);
        }
        result
    }

    fn render(
        &self,
        quiz: &Quiz,
        output: Option<&Path>,
        on_progress: &mut dyn FnMut(f64),
    ) -> QuizResult<GenerationOutcome> {
        let ffmpeg = locate_binary("ffmpeg", self.config.ffmpeg_path.as_deref())?;
        let work = tempfile::Builder::new().prefix("quizvid-").tempdir()?;
        let mut plan = self.plan(quiz, output, work.path())?;
        info!(
            quiz = %quiz.title(),
            questions = plan.quiz.question_count(),
            output = %plan.output.display(),
            "generating video"
        );

        if plan.settings.text_to_speech {
            match TtsEngine::locate(&self.config.tts) {
                Some(engine) => {
                    let clips = engine.speak_quiz(&plan.quiz, &plan.timeline, work.path())?;
                    plan = plan.with_tts_clips(clips);
                }
                None => warn!(
                    command = %self.config.tts.command,
                    "text-to-speech engine not found; rendering without narration"
                ),
            }
        }
        if let Some(music) = self.music(&plan) {
            plan = plan.with_music(music);
        }

        let sidecar = if plan.settings.subtitles {
            let track = work.path().join("subtitles.srt");
            write_srt(&plan.quiz, &plan.timeline, &track)?;
            plan = plan.with_subtitles(&track);
            Some(plan.output.with_extension("srt"))
        } else {
            None
        };

        render_video(&ffmpeg, &plan, on_progress)?;

        if let (Some(sidecar), Some(track)) = (&sidecar, &plan.subtitles) {
            std::fs::copy(track, sidecar)?;
        }

        let (width, height) = plan.settings.resolution.dimensions();
        let expectations = VideoExpectations::new(
            width,
            height,
            f64::from(plan.settings.fps),
            plan.total_duration(),
            plan.format.probe_codec(),
        )
        .with_audio(plan.has_audio())
        .with_subtitles(plan.subtitles.is_some());

        let shuffled = quiz.settings.shuffle_questions || quiz.settings.shuffle_options;
        Ok(GenerationOutcome {
            output: plan.output.clone(),
            duration: plan.total_duration(),
            question_count: plan.quiz.question_count(),
            subtitles: sidecar,
            expectations,
            seed: plan.quiz.settings.seed.filter(|_| shuffled),
        })
    }

    fn record(&self, quiz: &Quiz, result: &QuizResult<GenerationOutcome>) {
        let record = match result {
            Ok(outcome) => HistoryRecord::completed(
                quiz.title(),
                outcome.question_count,
                self.config.video.clone(),
                &outcome.output,
            )
            .with_seed(outcome.seed),
            Err(e) => HistoryRecord::failed(
                quiz.title(),
                quiz.question_count(),
                self.config.video.clone(),
                e.to_string(),
            ),
        };
        let path = self.config.history_path();
        if let Err(e) = append_history(&path, &record) {
            warn!(path = %path.display(), error = %e, "could not write history");
        }
    }

    /// Probe a rendered video and compare it with the outcome's expectations
    pub fn verify(&self, outcome: &GenerationOutcome) -> QuizResult<VerificationReport> {
        let ffprobe = locate_binary("ffprobe", self.config.ffprobe_path.as_deref())?;
        let probe = probe_video(&ffprobe, &outcome.output)?;
        let report = verify_output(&probe, &outcome.expectations, &outcome.output.to_string_lossy());
        if !report.passed() {
            let failed: Vec<String> = report
                .failures()
                .map(|c| format!("{} (expected {}, got {})", c.name, c.expected, c.actual))
                .collect();
            warn!(output = %outcome.output.display(), failed = %failed.join(", "), "verification failed");
        }
        Ok(report)
    }
}

impl TryFrom<AppConfig> for QuizVideoGenerator {
    type Error = QuizError;

    fn try_from(config: AppConfig) -> QuizResult<Self> {
        Self::new(config)
    }
}
