//! Doctor command handler

use super::{load_app_config, reporter};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use quizvid::{find_executable, TemplateRegistry, TtsEngine};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Execute the doctor command.
///
/// Missing ffmpeg or ffprobe fails the command; a missing speech engine or
/// music file only warns since rendering works without them.
pub fn execute_doctor(config: &CliConfig) -> CliResult<()> {
    let app = load_app_config(config)?;
    let reporter = reporter(config);
    let mut missing = Vec::new();

    reporter.header("External tools");
    for (name, explicit) in [
        ("ffmpeg", app.ffmpeg_path.as_deref()),
        ("ffprobe", app.ffprobe_path.as_deref()),
    ] {
        match find_executable(name, explicit) {
            Some(path) => reporter.success(&format!(
                "{name}: {} ({})",
                path.display(),
                tool_version(&path).unwrap_or_else(|| "version unknown".to_string())
            )),
            None => {
                reporter.failure(&format!("{name}: not found"));
                missing.push(name);
            }
        }
    }
    match TtsEngine::locate(&app.tts) {
        Some(engine) => reporter.success(&format!(
            "{}: {}",
            app.tts.command,
            engine.binary().display()
        )),
        None => reporter.warning(&format!(
            "{}: not found; videos will have no narration",
            app.tts.command
        )),
    }

    reporter.header("Resources");
    match TemplateRegistry::load(app.templates_dir.as_deref()) {
        Ok(registry) => reporter.success(&format!("{} templates available", registry.len())),
        Err(e) => reporter.failure(&format!("templates: {e}")),
    }
    if let Some(music) = &app.background_music {
        if music.is_file() {
            reporter.success(&format!("background music: {}", music.display()));
        } else {
            reporter.warning(&format!("background music not found: {}", music.display()));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::config(format!(
            "{} not found. Install FFmpeg or set FFMPEG_PATH / FFPROBE_PATH",
            missing.join(" and ")
        )))
    }
}

/// First line of `<tool> -version`
fn tool_version(path: &Path) -> Option<String> {
    let output = Command::new(path)
        .arg("-version")
        .output()
        .map_err(|e| debug!(path = %path.display(), error = %e, "version probe failed"))
        .ok()?;
    if !output.status.success() {
        return None;
    }
    first_line(&String::from_utf8_lossy(&output.stdout))
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let text = "\nffmpeg version 6.1.1 Copyright (c) 2000-2023\nbuilt with gcc\n";
        assert_eq!(
            first_line(text).as_deref(),
            Some("ffmpeg version 6.1.1 Copyright (c) 2000-2023")
        );
        assert_eq!(first_line("  \n"), None);
    }
}
