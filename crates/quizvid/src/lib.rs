//! quizvid: Quiz Video Generator
//!
//! Loads quiz documents (JSON, CSV, XML), validates them, lays them out on a
//! timeline and renders them to video with FFmpeg.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────────┐
//! │ loader       │──►│ validation │──►│ timeline   │──►│ render       │
//! │ json/csv/xml │   │            │   │ + subtitles│   │ ffmpeg args  │
//! └──────────────┘   └────────────┘   │ + tts      │   │ + progress   │
//!        ▲                            └────────────┘   └──────┬───────┘
//!        │            ┌────────────┐                          ▼
//!   batch (pool) ────►│ generator  │──► history.jsonl    verify (ffprobe)
//!                     └────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use quizvid::{AppConfig, Question, Quiz, QuizVideoGenerator};
//!
//! let quiz = Quiz::new("Capitals")
//!     .with_question(Question::multiple_choice("Capital of France?", ["Berlin", "Paris"], 1));
//! let generator = QuizVideoGenerator::new(AppConfig::default())?;
//! let outcome = generator.generate(&quiz, None)?;
//! println!("{} ({:.0}s)", outcome.output.display(), outcome.duration);
//! # Ok::<(), quizvid::QuizError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod analytics;
pub mod batch;
pub mod config;
mod error;
pub mod history;
pub mod loader;
mod model;
pub mod render;
pub mod settings;
pub mod subtitles;
pub mod template;
pub mod timeline;
mod tools;
pub mod tts;
pub mod validation;
pub mod verify;

pub use analytics::QuizStats;
pub use batch::{discover, BatchProcessor, BatchReport, JobResult, JobStatus};
pub use config::AppConfig;
pub use error::{QuizError, QuizResult};
pub use history::{append_history, read_history, GenerationStatus, HistoryRecord};
pub use loader::{export_quiz, load_quiz, parse_quiz, ExportFormat, QuizFormat};
pub use model::{
    AnswerKey, Difficulty, Question, QuestionKind, Quiz, QuizMetadata, QuizSettings,
    DEFAULT_POINTS,
};
pub use render::{DryRun, GenerationOutcome, QuizVideoGenerator, RenderPlan};
pub use settings::{OutputFormat, Quality, RenderConfig, Resolution, Transition, VideoSettings};
pub use template::{Template, TemplateRegistry, DEFAULT_TEMPLATE};
pub use timeline::Timeline;
pub use tools::find_executable;
pub use tts::{TtsConfig, TtsEngine};
pub use validation::{validate_quiz, Severity, ValidationIssue, ValidationReport};
pub use verify::{VerificationReport, VideoExpectations, VideoProbe};
