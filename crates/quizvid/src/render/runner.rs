//! Running FFmpeg and following its progress.

use super::plan::{build_ffmpeg_args, RenderPlan};
use crate::error::{QuizError, QuizResult};
use crate::tools::find_executable;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Lines of FFmpeg stderr kept for error messages
const STDERR_TAIL_LINES: usize = 20;

/// Resolve an FFmpeg binary (`ffmpeg` or `ffprobe`).
///
/// # Errors
///
/// Returns [`QuizError::FfmpegNotFound`] when neither the override nor `PATH`
/// yields an executable.
pub fn locate_binary(name: &str, override_path: Option<&Path>) -> QuizResult<PathBuf> {
    find_executable(name, override_path).ok_or_else(|| QuizError::FfmpegNotFound {
        binary: override_path.map_or_else(|| name.to_string(), |p| p.display().to_string()),
    })
}

/// One interesting line of `-progress` output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// Encoded up to this many seconds
    OutTime(f64),
    /// Encoding finished
    End,
}

/// Parse a `key=value` line written by `-progress`.
///
/// `out_time_ms` is in microseconds despite its name, same as `out_time_us`.
#[must_use]
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" | "out_time_ms" => value
            .parse::<i64>()
            .ok()
            .map(|us| ProgressEvent::OutTime(us.max(0) as f64 / 1_000_000.0)),
        "progress" if value == "end" => Some(ProgressEvent::End),
        _ => None,
    }
}

fn spawn_stderr_collector(
    stderr: impl Read + Send + 'static,
) -> std::thread::JoinHandle<VecDeque<String>> {
    std::thread::spawn(move || {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
        tail
    })
}

/// Render a plan with FFmpeg.
///
/// Writes the plan's text files, runs `ffmpeg` and reports progress as a
/// fraction in `0.0..=1.0`.
///
/// # Errors
///
/// Returns [`QuizError::Ffmpeg`] when FFmpeg cannot be started or exits with
/// a failure status; the message carries the tail of its stderr.
pub fn render_video(
    ffmpeg: &Path,
    plan: &RenderPlan,
    on_progress: &mut dyn FnMut(f64),
) -> QuizResult<()> {
    plan.write_text_files()?;
    if let Some(parent) = plan.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let args = build_ffmpeg_args(plan);
    debug!(binary = %ffmpeg.display(), args = args.len(), "spawning ffmpeg");

    let mut child = Command::new(ffmpeg)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| QuizError::ffmpeg(format!("Failed to execute {}: {e}", ffmpeg.display())))?;

    let stderr_tail = child.stderr.take().map(spawn_stderr_collector);

    let total = plan.total_duration().max(f64::EPSILON);
    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            match parse_progress_line(&line) {
                Some(ProgressEvent::OutTime(secs)) => on_progress((secs / total).clamp(0.0, 1.0)),
                Some(ProgressEvent::End) => on_progress(1.0),
                None => {}
            }
        }
    }

    let status = child
        .wait()
        .map_err(|e| QuizError::ffmpeg(format!("Failed to wait for ffmpeg: {e}")))?;
    let tail = stderr_tail
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    if !status.success() {
        let tail: Vec<String> = tail.into_iter().collect();
        return Err(QuizError::ffmpeg(format!(
            "ffmpeg exited with {status}: {}",
            tail.join("\n")
        )));
    }

    info!(output = %plan.output.display(), "rendered video");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_out_time() {
        assert_eq!(
            parse_progress_line("out_time_us=2500000"),
            Some(ProgressEvent::OutTime(2.5))
        );
        assert_eq!(
            parse_progress_line("out_time_ms=1000000\n"),
            Some(ProgressEvent::OutTime(1.0))
        );
    }

    #[test]
    fn test_parse_negative_out_time_clamped() {
        assert_eq!(
            parse_progress_line("out_time_us=-9223372036854775807"),
            Some(ProgressEvent::OutTime(0.0))
        );
    }

    #[test]
    fn test_parse_end() {
        assert_eq!(parse_progress_line("progress=end"), Some(ProgressEvent::End));
        assert_eq!(parse_progress_line("progress=continue"), None);
    }

    #[test]
    fn test_parse_ignores_other_keys() {
        assert_eq!(parse_progress_line("frame=120"), None);
        assert_eq!(parse_progress_line("out_time_us=N/A"), None);
        assert_eq!(parse_progress_line("garbage"), None);
    }

    #[test]
    fn test_locate_binary_missing_override() {
        let err = locate_binary("ffmpeg", Some(Path::new("/nonexistent/ffmpeg"))).unwrap_err();
        assert!(matches!(err, QuizError::FfmpegNotFound { ref binary } if binary == "/nonexistent/ffmpeg"));
    }

    #[test]
    fn test_locate_binary_unknown_name() {
        let err = locate_binary("ffmpeg-that-does-not-exist-4711", None).unwrap_err();
        assert!(err.to_string().contains("ffmpeg-that-does-not-exist-4711 not found"));
    }
}
