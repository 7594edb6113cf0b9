//! Video settings and the render configuration derived from them.

use crate::error::{QuizError, QuizResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Seconds between the end of the countdown and the end of the reveal
pub const ANSWER_REVEAL_DELAY_SECS: f64 = 3.0;
/// Length of the transition between two segments
pub const TRANSITION_SECS: f64 = 1.0;
/// Background music gain
pub const MUSIC_VOLUME: f64 = 0.3;

/// Output resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    /// 1280×720
    #[serde(rename = "720p")]
    Hd,
    /// 1920×1080
    #[default]
    #[serde(rename = "1080p")]
    FullHd,
    /// 2560×1440
    #[serde(rename = "1440p")]
    Qhd,
    /// 3840×2160
    #[serde(rename = "4K", alias = "4k", alias = "2160p")]
    Uhd,
}

impl Resolution {
    /// Width and height in pixels
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd => (1280, 720),
            Self::FullHd => (1920, 1080),
            Self::Qhd => (2560, 1440),
            Self::Uhd => (3840, 2160),
        }
    }

    /// Scale factor relative to 1080p, used to size text
    #[must_use]
    pub fn scale(self) -> f64 {
        f64::from(self.dimensions().1) / 1080.0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hd => "720p",
            Self::FullHd => "1080p",
            Self::Qhd => "1440p",
            Self::Uhd => "4K",
        };
        f.write_str(name)
    }
}

impl FromStr for Resolution {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "720p" | "hd" => Ok(Self::Hd),
            "1080p" | "fullhd" => Ok(Self::FullHd),
            "1440p" | "qhd" => Ok(Self::Qhd),
            "4k" | "2160p" | "uhd" => Ok(Self::Uhd),
            other => Err(QuizError::config(format!(
                "unknown resolution '{other}' (expected 720p, 1080p, 1440p or 4K)"
            ))),
        }
    }
}

/// Transition between segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Cross fade
    #[default]
    Fade,
    /// Slide left
    Slide,
    /// Zoom in
    Zoom,
    /// Wipe left
    Wipe,
    /// Dissolve
    Dissolve,
}

impl Transition {
    /// Name of the matching FFmpeg `xfade` transition
    #[must_use]
    pub const fn xfade_name(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Slide => "slideleft",
            Self::Zoom => "zoomin",
            Self::Wipe => "wipeleft",
            Self::Dissolve => "dissolve",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fade => "fade",
            Self::Slide => "slide",
            Self::Zoom => "zoom",
            Self::Wipe => "wipe",
            Self::Dissolve => "dissolve",
        };
        f.write_str(name)
    }
}

impl FromStr for Transition {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fade" => Ok(Self::Fade),
            "slide" => Ok(Self::Slide),
            "zoom" => Ok(Self::Zoom),
            "wipe" => Ok(Self::Wipe),
            "dissolve" => Ok(Self::Dissolve),
            other => Err(QuizError::config(format!(
                "unknown transition '{other}' (expected fade, slide, zoom, wipe or dissolve)"
            ))),
        }
    }
}

/// Encoding quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Fast, small files
    Low,
    /// Balanced
    #[default]
    Medium,
    /// Slow, near-transparent
    High,
}

impl Quality {
    /// Constant rate factor
    #[must_use]
    pub const fn crf(self) -> u8 {
        match self {
            Self::Low => 28,
            Self::Medium => 23,
            Self::High => 18,
        }
    }

    /// x264 speed preset
    #[must_use]
    pub const fn x264_preset(self) -> &'static str {
        match self {
            Self::Low => "veryfast",
            Self::Medium => "medium",
            Self::High => "slow",
        }
    }

    /// libvpx-vp9 `-cpu-used` value
    #[must_use]
    pub const fn vp9_cpu_used(self) -> u8 {
        match self {
            Self::Low => 5,
            Self::Medium => 2,
            Self::High => 1,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for Quality {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(QuizError::config(format!(
                "unknown quality '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Output container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MP4 (H.264 + AAC)
    #[default]
    Mp4,
    /// WebM (VP9 + Opus)
    Webm,
    /// Matroska (H.264 + AAC)
    Mkv,
}

impl OutputFormat {
    /// File extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mkv => "mkv",
        }
    }

    /// FFmpeg video encoder
    #[must_use]
    pub const fn video_codec(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mkv => "libx264",
            Self::Webm => "libvpx-vp9",
        }
    }

    /// Codec name as reported by ffprobe
    #[must_use]
    pub const fn probe_codec(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mkv => "h264",
            Self::Webm => "vp9",
        }
    }

    /// FFmpeg audio encoder
    #[must_use]
    pub const fn audio_codec(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mkv => "aac",
            Self::Webm => "libopus",
        }
    }

    /// FFmpeg subtitle encoder for a soft subtitle track
    #[must_use]
    pub const fn subtitle_codec(self) -> &'static str {
        match self {
            Self::Mp4 => "mov_text",
            Self::Webm => "webvtt",
            Self::Mkv => "srt",
        }
    }

    /// Detect from a path's extension
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            "mkv" => Ok(Self::Mkv),
            other => Err(QuizError::config(format!(
                "unknown output format '{other}' (expected mp4, webm or mkv)"
            ))),
        }
    }
}

#[allow(clippy::expect_used)]
fn hex_color() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("static pattern compiles"))
}

/// Whether `color` is a `#rrggbb` hex color
#[must_use]
pub fn is_hex_color(color: &str) -> bool {
    hex_color().is_match(color)
}

/// User-facing video settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Output resolution
    pub resolution: Resolution,
    /// Frames per second (24-60)
    pub fps: u32,
    /// Default seconds per question (3-30)
    pub duration_per_question: u32,
    /// Mix background music when a music file is configured
    pub background_music: bool,
    /// Write and mux subtitles
    pub subtitles: bool,
    /// Transition between segments
    pub transitions: Transition,
    /// Font family
    pub text_font: String,
    /// Base font size at 1080p (16-48)
    pub font_size: u32,
    /// Background color (#rrggbb)
    pub background_color: String,
    /// Text color (#rrggbb)
    pub text_color: String,
    /// Speak each prompt
    pub text_to_speech: bool,
    /// Show explanations after the reveal
    pub include_explanations: bool,
    /// Show a countdown before the reveal
    pub countdown: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::FullHd,
            fps: 30,
            duration_per_question: 10,
            background_music: true,
            subtitles: true,
            transitions: Transition::Fade,
            text_font: "Arial".to_string(),
            font_size: 24,
            background_color: "#1a1a1a".to_string(),
            text_color: "#ffffff".to_string(),
            text_to_speech: true,
            include_explanations: true,
            countdown: true,
        }
    }
}

impl VideoSettings {
    /// Check every bounded field
    pub fn validate(&self) -> QuizResult<()> {
        let mut problems = Vec::new();
        if !(24..=60).contains(&self.fps) {
            problems.push(format!("fps must be 24-60, got {}", self.fps));
        }
        if !(3..=30).contains(&self.duration_per_question) {
            problems.push(format!(
                "duration_per_question must be 3-30 seconds, got {}",
                self.duration_per_question
            ));
        }
        if !(16..=48).contains(&self.font_size) {
            problems.push(format!("font_size must be 16-48, got {}", self.font_size));
        }
        for (name, color) in [
            ("background_color", &self.background_color),
            ("text_color", &self.text_color),
        ] {
            if !is_hex_color(color) {
                problems.push(format!("{name} must be #rrggbb, got '{color}'"));
            }
        }
        if self.text_font.trim().is_empty() {
            problems.push("text_font must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(QuizError::config(problems.join("; ")))
        }
    }
}

/// Video block of the render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSection {
    /// Resolution name
    pub resolution: Resolution,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: u32,
    /// Codec as reported by ffprobe
    pub codec: String,
}

/// Timing block of the render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSection {
    /// Default seconds per question
    pub question_duration: u32,
    /// Seconds the answer stays highlighted
    pub answer_reveal_delay: f64,
    /// Seconds of overlap between segments
    pub transition_duration: f64,
}

/// Styling block of the render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylingSection {
    /// Background color
    pub background_color: String,
    /// Text color
    pub text_color: String,
    /// Font family
    pub font_family: String,
    /// Base font size
    pub font_size: u32,
    /// Subtitles enabled
    pub use_subtitles: bool,
    /// Transition effect
    pub transition_effect: Transition,
}

/// Audio block of the render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSection {
    /// Background music enabled
    pub background_music: bool,
    /// Text-to-speech enabled
    pub text_to_speech: bool,
    /// Music gain
    pub music_volume: f64,
}

/// Fully derived configuration handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Video block
    pub video: VideoSection,
    /// Timing block
    pub timing: TimingSection,
    /// Styling block
    pub styling: StylingSection,
    /// Audio block
    pub audio: AudioSection,
}

impl RenderConfig {
    /// Derive the render configuration for a container format
    #[must_use]
    pub fn from_settings(settings: &VideoSettings, format: OutputFormat) -> Self {
        let (width, height) = settings.resolution.dimensions();
        Self {
            video: VideoSection {
                resolution: settings.resolution,
                width,
                height,
                fps: settings.fps,
                codec: format.probe_codec().to_string(),
            },
            timing: TimingSection {
                question_duration: settings.duration_per_question,
                answer_reveal_delay: ANSWER_REVEAL_DELAY_SECS,
                transition_duration: TRANSITION_SECS,
            },
            styling: StylingSection {
                background_color: settings.background_color.clone(),
                text_color: settings.text_color.clone(),
                font_family: settings.text_font.clone(),
                font_size: settings.font_size,
                use_subtitles: settings.subtitles,
                transition_effect: settings.transitions,
            },
            audio: AudioSection {
                background_music: settings.background_music,
                text_to_speech: settings.text_to_speech,
                music_volume: MUSIC_VOLUME,
            },
        }
    }
}
