//! Stats command handler

use super::{load_app_config, print_json};
use crate::commands::StatsArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::OutputFormat;
use quizvid::{load_quiz, QuizStats};

/// Execute the stats command.
///
/// The duration estimate uses the configured video settings.
pub fn execute_stats(config: &CliConfig, args: &StatsArgs) -> CliResult<()> {
    let app = load_app_config(config)?;
    let quiz = load_quiz(&args.quiz_file)?;
    let stats = QuizStats::from_quiz(&quiz, &app.video);

    match args.format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Text => {
            print!("{stats}");
            Ok(())
        }
    }
}
