//! Checking rendered videos with ffprobe.

use crate::error::{QuizError, QuizResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stream properties reported by ffprobe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProbe {
    /// Video codec name ("h264", "vp9")
    pub codec: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate
    pub fps: f64,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Audio codec, if there is an audio stream
    pub audio_codec: Option<String>,
    /// Whether a subtitle stream is present
    pub has_subtitles: bool,
}

/// What the rendered file should look like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoExpectations {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate
    pub fps: f64,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Video codec as ffprobe names it
    pub codec: String,
    /// Audio stream expected
    pub audio: bool,
    /// Subtitle stream expected
    pub subtitles: bool,
    /// Allowed fps deviation
    pub fps_tolerance: f64,
    /// Allowed duration deviation in seconds
    pub duration_tolerance: f64,
}

impl VideoExpectations {
    /// Expectations with the default tolerances (0.01 fps, 1 s)
    #[must_use]
    pub fn new(width: u32, height: u32, fps: f64, duration_secs: f64, codec: impl Into<String>) -> Self {
        Self {
            width,
            height,
            fps,
            duration_secs,
            codec: codec.into(),
            audio: false,
            subtitles: false,
            fps_tolerance: 0.01,
            duration_tolerance: 1.0,
        }
    }

    /// Expect an audio stream
    #[must_use]
    pub const fn with_audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }

    /// Expect a subtitle stream
    #[must_use]
    pub const fn with_subtitles(mut self, subtitles: bool) -> Self {
        self.subtitles = subtitles;
        self
    }
}

/// One comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationCheck {
    /// Property name
    pub name: String,
    /// Expected value
    pub expected: String,
    /// Observed value
    pub actual: String,
    /// Whether it matched
    pub passed: bool,
}

/// All comparisons for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Probed file
    pub source: String,
    /// Probe result
    pub probe: VideoProbe,
    /// Comparisons in a fixed order
    pub checks: Vec<VerificationCheck>,
}

impl VerificationReport {
    /// Whether every check passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Checks that failed
    pub fn failures(&self) -> impl Iterator<Item = &VerificationCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// ffprobe arguments for JSON output
#[must_use]
pub fn build_ffprobe_args(video_path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        video_path.to_string_lossy().to_string(),
    ]
}

/// Run ffprobe on a file.
///
/// # Errors
///
/// Returns [`QuizError::Probe`] if ffprobe cannot be run, fails, or prints
/// something other than the expected JSON.
pub fn probe_video(ffprobe: &Path, video_path: &Path) -> QuizResult<VideoProbe> {
    let args = build_ffprobe_args(video_path);

    let output = std::process::Command::new(ffprobe)
        .args(&args)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .output()
        .map_err(|e| QuizError::Probe {
            message: format!("Failed to execute {}: {e}", ffprobe.display()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(QuizError::Probe {
            message: format!("ffprobe exited with {}: {stderr}", output.status),
        });
    }

    parse_ffprobe_json(&String::from_utf8_lossy(&output.stdout))
}

/// Parse ffprobe's JSON output
pub fn parse_ffprobe_json(json: &str) -> QuizResult<VideoProbe> {
    let probe_err = |message: String| QuizError::Probe { message };
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| probe_err(format!("Failed to parse ffprobe JSON: {e}")))?;

    let streams = parsed
        .get("streams")
        .and_then(|s| s.as_array())
        .ok_or_else(|| probe_err("ffprobe output missing 'streams' array".to_string()))?;

    let of_type = |kind: &str| {
        streams
            .iter()
            .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some(kind))
    };
    let video = of_type("video").ok_or_else(|| probe_err("No video stream found".to_string()))?;

    let text = |value: Option<&serde_json::Value>| value.and_then(|v| v.as_str()).map(str::to_string);
    let dimension = |key: &str| {
        video
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    };

    let duration_secs = text(video.get("duration"))
        .or_else(|| text(parsed.get("format").and_then(|f| f.get("duration"))))
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoProbe {
        codec: text(video.get("codec_name")).unwrap_or_else(|| "unknown".to_string()),
        width: dimension("width"),
        height: dimension("height"),
        fps: parse_fps_fraction(&text(video.get("r_frame_rate")).unwrap_or_default()),
        duration_secs,
        audio_codec: of_type("audio").and_then(|a| text(a.get("codec_name"))),
        has_subtitles: of_type("subtitle").is_some(),
    })
}

/// "30/1" or "30000/1001" as a float; 0.0 when unparseable
fn parse_fps_fraction(fraction: &str) -> f64 {
    if let Some((num, den)) = fraction.split_once('/') {
        let num: f64 = num.parse().unwrap_or(0.0);
        let den: f64 = den.parse().unwrap_or(0.0);
        return if den > 0.0 { num / den } else { 0.0 };
    }
    fraction.parse().unwrap_or(0.0)
}

fn yes_no(value: bool) -> String {
    (if value { "yes" } else { "no" }).to_string()
}

/// Compare a probe against expectations
#[must_use]
pub fn verify_output(probe: &VideoProbe, expectations: &VideoExpectations, source: &str) -> VerificationReport {
    let mut checks = vec![
        VerificationCheck {
            name: "resolution".to_string(),
            expected: format!("{}x{}", expectations.width, expectations.height),
            actual: format!("{}x{}", probe.width, probe.height),
            passed: probe.width == expectations.width && probe.height == expectations.height,
        },
        VerificationCheck {
            name: "fps".to_string(),
            expected: format!("{:.2}", expectations.fps),
            actual: format!("{:.2}", probe.fps),
            passed: (probe.fps - expectations.fps).abs() <= expectations.fps_tolerance,
        },
        VerificationCheck {
            name: "duration".to_string(),
            expected: format!("{:.1}s", expectations.duration_secs),
            actual: format!("{:.1}s", probe.duration_secs),
            passed: (probe.duration_secs - expectations.duration_secs).abs()
                <= expectations.duration_tolerance,
        },
        VerificationCheck {
            name: "codec".to_string(),
            expected: expectations.codec.clone(),
            actual: probe.codec.clone(),
            passed: probe.codec == expectations.codec,
        },
    ];

    if expectations.audio {
        checks.push(VerificationCheck {
            name: "audio".to_string(),
            expected: yes_no(true),
            actual: yes_no(probe.audio_codec.is_some()),
            passed: probe.audio_codec.is_some(),
        });
    }
    if expectations.subtitles {
        checks.push(VerificationCheck {
            name: "subtitles".to_string(),
            expected: yes_no(true),
            actual: yes_no(probe.has_subtitles),
            passed: probe.has_subtitles,
        });
    }

    VerificationReport {
        source: source.to_string(),
        probe: probe.clone(),
        checks,
    }
}
