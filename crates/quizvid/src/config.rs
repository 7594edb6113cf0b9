//! Application configuration.
//!
//! Resolution order, later wins: built-in defaults, a YAML file, environment
//! variables, then command-line flags (applied by the caller).

use crate::error::{QuizError, QuizResult};
use crate::settings::{OutputFormat, Quality, VideoSettings};
use crate::template::DEFAULT_TEMPLATE;
use crate::tts::TtsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "QUIZVID_CONFIG";
/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "quizvid.yaml";
/// History file name inside the output directory
pub const HISTORY_FILE_NAME: &str = "history.jsonl";

/// Effective settings for generation and batch runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where videos are written
    pub output_dir: PathBuf,
    /// Encoding quality
    pub quality: Quality,
    /// Output container
    pub format: OutputFormat,
    /// Template name; when unset the `video` colors and font are used as given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Explicit ffmpeg binary
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe binary
    pub ffprobe_path: Option<PathBuf>,
    /// Directory with custom templates
    pub templates_dir: Option<PathBuf>,
    /// Batch worker threads
    pub max_workers: usize,
    /// Retry failed batch jobs
    pub retry_failed: bool,
    /// Extra attempts per failed job
    pub max_retries: u32,
    /// Generation history (defaults to `<output_dir>/history.jsonl`)
    pub history_file: Option<PathBuf>,
    /// Text-to-speech engine
    pub tts: TtsConfig,
    /// Background music file
    pub background_music: Option<PathBuf>,
    /// Video settings
    pub video: VideoSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            quality: Quality::Medium,
            format: OutputFormat::Mp4,
            template: None,
            ffmpeg_path: None,
            ffprobe_path: None,
            templates_dir: None,
            max_workers: 4,
            retry_failed: true,
            max_retries: 2,
            history_file: None,
            tts: TtsConfig::default(),
            background_music: None,
            video: VideoSettings::default(),
        }
    }
}

impl AppConfig {
    /// Parse YAML
    pub fn from_yaml_str(yaml: &str) -> QuizResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| QuizError::config(format!("invalid YAML: {e}")))
    }

    /// Read a YAML config file
    pub fn from_file(path: &Path) -> QuizResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            QuizError::config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
            .map_err(|e| QuizError::config(format!("{}: {e}", path.display())))
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> QuizResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| QuizError::config(e.to_string()))
    }

    /// Which config file applies, if any
    #[must_use]
    pub fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.is_file().then_some(local)
    }

    /// Defaults, overlaid with the config file and the process environment
    pub fn load(explicit: Option<&Path>) -> QuizResult<Self> {
        let mut config = match Self::config_file(explicit) {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> QuizResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let invalid =
            |key: &str, value: &str| QuizError::config(format!("{key}: invalid value '{value}'"));

        if let Some(value) = get("VIDEO_QUALITY") {
            self.quality = value
                .parse()
                .map_err(|_| invalid("VIDEO_QUALITY", &value))?;
        }
        if let Some(value) = get("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(value);
        }
        if let Some(value) = get("FFMPEG_PATH") {
            self.ffmpeg_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get("FFPROBE_PATH") {
            self.ffprobe_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get("TEMPLATES_DIR") {
            self.templates_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get("MAX_WORKERS") {
            self.max_workers = value
                .trim()
                .parse()
                .map_err(|_| invalid("MAX_WORKERS", &value))?;
        }
        if let Some(value) = get("TTS_COMMAND") {
            self.tts.command = value;
        }
        if let Some(value) = get("BACKGROUND_MUSIC") {
            self.background_music = Some(PathBuf::from(value));
        }
        Ok(())
    }

    /// Check bounded values
    pub fn validate(&self) -> QuizResult<()> {
        if self.max_workers == 0 {
            return Err(QuizError::config("max_workers must be at least 1"));
        }
        if matches!(&self.template, Some(name) if name.trim().is_empty()) {
            return Err(QuizError::config("template must not be empty"));
        }
        self.video.validate()
    }

    /// Template in effect, the built-in default when none is set
    #[must_use]
    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Resolved history file
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join(HISTORY_FILE_NAME))
    }
}
