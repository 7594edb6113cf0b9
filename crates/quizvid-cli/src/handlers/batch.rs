//! Batch command handler

use super::{load_app_config, reporter};
use crate::commands::BatchArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use quizvid::{discover, AppConfig, BatchProcessor, JobResult, JobStatus, QuizVideoGenerator};

/// Execute the batch command
pub fn execute_batch(config: &CliConfig, args: &BatchArgs) -> CliResult<()> {
    let mut app = load_app_config(config)?;
    apply_batch_overrides(&mut app, args);

    let files = discover(&args.input_dir, args.pattern.as_deref())?;
    let mut reporter = reporter(config);
    if files.is_empty() {
        reporter.warning(&format!(
            "No quiz files found in {}",
            args.input_dir.display()
        ));
        return Ok(());
    }

    let generator = QuizVideoGenerator::new(app)?;

    if args.dry_run {
        let mut unreadable = 0;
        for file in &files {
            match generator.load(file) {
                Ok(quiz) => {
                    let (output, _) = generator.resolve_output(&quiz, None);
                    println!("{} -> {}", file.display(), output.display());
                }
                Err(e) => {
                    unreadable += 1;
                    reporter.failure(&format!("{}: {e}", file.display()));
                }
            }
        }
        reporter.info(&format!(
            "{} quizzes would be rendered",
            files.len() - unreadable
        ));
        return Ok(());
    }

    let processor = BatchProcessor::from(generator.config());
    reporter.header(&format!(
        "Rendering {} quizzes with {} workers",
        files.len(),
        processor.max_workers.min(files.len())
    ));
    reporter.start_progress(files.len() as u64, "rendering");

    let report = processor.run(
        &files,
        |path| {
            let quiz = generator.load(path)?;
            generator.generate(&quiz, None).map(|outcome| outcome.output)
        },
        |result| {
            reporter.println(&job_line(result));
            reporter.increment(1);
        },
    );
    reporter.finish();
    let report = report?;
    reporter.summary(report.succeeded(), report.failed(), report.elapsed);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::render(format!(
            "{} of {} quizzes failed",
            report.failed(),
            report.total()
        )))
    }
}

/// Fold command-line overrides into the application config
pub fn apply_batch_overrides(app: &mut AppConfig, args: &BatchArgs) {
    if let Some(dir) = &args.output_dir {
        app.output_dir.clone_from(dir);
    }
    if let Some(workers) = args.workers {
        app.max_workers = workers;
    }
    if let Some(retry) = args.retry_failed {
        app.retry_failed = retry;
    }
    if let Some(retries) = args.max_retries {
        app.max_retries = retries;
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
}

/// One line per finished job
#[must_use]
pub fn job_line(result: &JobResult) -> String {
    let retries = if result.attempts > 1 {
        format!(" after {} attempts", result.attempts)
    } else {
        String::new()
    };
    match result.status {
        JobStatus::Completed => format!(
            "done    {} -> {}{retries}",
            result.input.display(),
            result
                .output
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string())
        ),
        JobStatus::Failed => format!(
            "failed  {}{retries}: {}",
            result.input.display(),
            result.error.as_deref().unwrap_or("unknown error")
        ),
    }
}
