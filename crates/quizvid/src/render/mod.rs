//! Video rendering through FFmpeg.
//!
//! FFmpeg does all compositing and encoding. This module turns a timeline
//! into a filter graph, runs the binary and follows its progress.

mod filter;
mod generator;
mod plan;
mod runner;

pub use filter::{escape_filter_value, ffmpeg_color};
pub use generator::{default_output_name, DryRun, GenerationOutcome, QuizVideoGenerator};
pub use plan::{build_ffmpeg_args, RenderPlan};
pub use runner::{locate_binary, parse_progress_line, render_video, ProgressEvent};
