//! Generate command handler

use super::{load_app_config, print_json, reporter};
use crate::commands::GenerateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use quizvid::{AppConfig, QuizVideoGenerator};
use tracing::debug;

/// Execute the generate command
pub fn execute_generate(config: &CliConfig, args: &GenerateArgs) -> CliResult<()> {
    let mut app = load_app_config(config)?;
    apply_generate_overrides(&mut app, args);

    let generator = QuizVideoGenerator::new(app)?.with_seed(args.seed);
    let quiz = generator.load(&args.quiz_file)?;
    debug!(
        file = %args.quiz_file.display(),
        questions = quiz.question_count(),
        template = %generator.config().template_name(),
        "quiz loaded"
    );

    if args.dry_run {
        let dry = generator.dry_run(&quiz, args.output.as_deref())?;
        println!("{}", shell_join(&dry.command));
        reporter(config).info(&format!(
            "Text overlays and subtitles written to {}",
            dry.work_dir.display()
        ));
        return Ok(());
    }

    let mut reporter = reporter(config);
    reporter.start_render(&format!("Rendering '{}'", quiz.title()));
    let result = generator.generate_with_progress(&quiz, args.output.as_deref(), &mut |fraction| {
        reporter.set_fraction(fraction);
    });
    let outcome = match result {
        Ok(outcome) => {
            reporter.finish();
            outcome
        }
        Err(e) => {
            reporter.abandon();
            return Err(e.into());
        }
    };

    reporter.success(&format!(
        "Video generated: {} ({} questions, {:.1}s)",
        outcome.output.display(),
        outcome.question_count,
        outcome.duration
    ));
    if let Some(subtitles) = &outcome.subtitles {
        reporter.info(&format!("Subtitles: {}", subtitles.display()));
    }

    if args.verify {
        let report = generator.verify(&outcome)?;
        if config.verbosity.is_verbose() {
            print_json(&report)?;
        }
        for check in &report.checks {
            let line = format!(
                "{}: expected {}, got {}",
                check.name, check.expected, check.actual
            );
            if check.passed {
                reporter.success(&line);
            } else {
                reporter.failure(&line);
            }
        }
        if !report.passed() {
            return Err(CliError::render(format!(
                "{} does not match the requested settings",
                outcome.output.display()
            )));
        }
    }
    Ok(())
}

/// Fold command-line overrides into the application config
pub fn apply_generate_overrides(app: &mut AppConfig, args: &GenerateArgs) {
    if let Some(dir) = &args.output_dir {
        app.output_dir.clone_from(dir);
    }
    if let Some(quality) = args.quality {
        app.quality = quality;
    }
    if let Some(format) = args.format {
        app.format = format;
    }
    if let Some(template) = &args.template {
        app.template = Some(template.clone());
    }
    if let Some(resolution) = args.resolution {
        app.video.resolution = resolution;
    }
    if let Some(fps) = args.fps {
        app.video.fps = fps;
    }
    if let Some(duration) = args.duration {
        app.video.duration_per_question = duration;
    }
    if let Some(transition) = args.transition {
        app.video.transitions = transition;
    }
    if let Some(music) = &args.music {
        app.background_music = Some(music.clone());
        app.video.background_music = true;
    }
    if args.no_tts {
        app.video.text_to_speech = false;
    }
    if args.no_subtitles {
        app.video.subtitles = false;
    }
    if args.no_explanations {
        app.video.include_explanations = false;
    }
    if args.no_countdown {
        app.video.countdown = false;
    }
}

/// Render a command line for copy-pasting into a POSIX shell
#[must_use]
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_quote(a))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
