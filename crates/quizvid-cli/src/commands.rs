//! CLI command definitions using clap

use crate::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use quizvid::{ExportFormat, Quality, Resolution, Transition};
use std::path::PathBuf;

/// quizvid: render quiz files to video with FFmpeg
#[derive(Parser, Debug)]
#[command(name = "quizvid")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Configuration file (YAML); defaults to $QUIZVID_CONFIG or ./quizvid.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new quiz document, optionally importing questions
    Create(CreateArgs),

    /// List saved quiz documents
    List(ListArgs),

    /// Render a quiz file to video
    Generate(GenerateArgs),

    /// Render every quiz file in a directory
    Batch(BatchArgs),

    /// List or show styling templates
    Templates(TemplatesArgs),

    /// Validate quiz files
    Validate(ValidateArgs),

    /// Convert a quiz to JSON or CSV
    Export(ExportArgs),

    /// Print quiz statistics
    Stats(StatsArgs),

    /// Show generation history
    History(HistoryArgs),

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Check that ffmpeg, ffprobe and the speech engine are available
    Doctor,
}

/// Arguments for the create command
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Quiz title (defaults to the imported quiz's title)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Quiz description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Import questions from a JSON, CSV or XML file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file or directory [default: quiz_data/{Title}_{timestamp}.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateArgs {
    /// Quiz file (JSON, CSV or XML)
    #[arg(short = 'i', long, visible_alias = "input")]
    pub quiz_file: PathBuf,

    /// Output video file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory (overrides the configured one)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Encoding quality (low, medium, high)
    #[arg(long)]
    pub quality: Option<Quality>,

    /// Output container (mp4, webm, mkv)
    #[arg(short, long)]
    pub format: Option<quizvid::OutputFormat>,

    /// Styling template
    #[arg(short, long)]
    pub template: Option<String>,

    /// Resolution (720p, 1080p, 1440p, 4K)
    #[arg(long)]
    pub resolution: Option<Resolution>,

    /// Frames per second (24-60)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Default seconds per question (3-30)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Transition between cards (fade, slide, zoom, wipe, dissolve)
    #[arg(long)]
    pub transition: Option<Transition>,

    /// Background music file
    #[arg(long)]
    pub music: Option<PathBuf>,

    /// Disable narration
    #[arg(long)]
    pub no_tts: bool,

    /// Disable subtitles
    #[arg(long)]
    pub no_subtitles: bool,

    /// Hide explanations
    #[arg(long)]
    pub no_explanations: bool,

    /// Hide the countdown
    #[arg(long)]
    pub no_countdown: bool,

    /// Shuffle seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the FFmpeg command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Probe the rendered file with ffprobe and check it
    #[arg(long)]
    pub verify: bool,
}

/// Arguments for the batch command
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Directory of quiz files
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Output directory (overrides the configured one)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Glob pattern relative to the input directory [default: *.json, *.csv, *.xml]
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Worker threads
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Retry failed renders (true or false)
    #[arg(long)]
    pub retry_failed: Option<bool>,

    /// Extra attempts per failed render
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Encoding quality
    #[arg(long)]
    pub quality: Option<Quality>,

    /// Output container
    #[arg(short, long)]
    pub format: Option<quizvid::OutputFormat>,

    /// Styling template
    #[arg(short, long)]
    pub template: Option<String>,

    /// List the quizzes that would be rendered
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the templates command
#[derive(Parser, Debug)]
pub struct TemplatesArgs {
    /// Templates action
    #[command(subcommand)]
    pub action: TemplatesAction,

    /// Output format
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,
}

/// Templates subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TemplatesAction {
    /// List available templates
    List,
    /// Show one template
    Show {
        /// Template name
        name: String,
    },
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Quiz files to validate
    pub files: Vec<PathBuf>,

    /// Quiz file (same as a positional file)
    #[arg(short = 'i', long)]
    pub quiz_file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

impl ValidateArgs {
    /// Every file named positionally or with `--quiz-file`
    #[must_use]
    pub fn all_files(&self) -> Vec<PathBuf> {
        let mut files = self.files.clone();
        files.extend(self.quiz_file.iter().cloned());
        files
    }
}

/// Arguments for the export command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Quiz file
    #[arg(short = 'i', long)]
    pub quiz_file: PathBuf,

    /// Target format (json, csv)
    #[arg(long, default_value = "json")]
    pub to: ExportFormat,

    /// Output file [default: stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Quiz file
    #[arg(short = 'i', long)]
    pub quiz_file: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directory holding quiz documents
    #[arg(short, long, default_value = "quiz_data")]
    pub dir: PathBuf,

    /// Also print each question with its options
    #[arg(long)]
    pub questions: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the history command
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Show at most this many recent records
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Show built-in defaults instead of the effective configuration
    #[arg(long)]
    pub defaults: bool,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
