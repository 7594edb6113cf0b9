//! History command handler

use super::{load_app_config, print_json, reporter};
use crate::commands::HistoryArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::OutputFormat;
use quizvid::{read_history, GenerationStatus, HistoryRecord};

/// Execute the history command
pub fn execute_history(config: &CliConfig, args: &HistoryArgs) -> CliResult<()> {
    let app = load_app_config(config)?;
    let path = app.history_path();
    let records = read_history(&path, Some(args.limit))?;

    match args.format {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Text if records.is_empty() => {
            reporter(config).info(&format!("No generation history in {}", path.display()));
        }
        OutputFormat::Text => {
            for record in &records {
                println!("{}", history_line(record));
            }
        }
    }
    Ok(())
}

/// One line per record, oldest first
#[must_use]
pub fn history_line(record: &HistoryRecord) -> String {
    let when = record.timestamp.format("%Y-%m-%d %H:%M:%S");
    let detail = match record.status {
        GenerationStatus::Completed => record
            .output_file
            .as_ref()
            .map_or_else(String::new, |p| format!(" -> {}", p.display())),
        GenerationStatus::Failed => record
            .error
            .as_ref()
            .map_or_else(String::new, |e| format!(": {e}")),
    };
    let status = match record.status {
        GenerationStatus::Completed => "completed",
        GenerationStatus::Failed => "failed",
    };
    format!(
        "{when}  {status:<9}  {} ({} questions){detail}",
        record.quiz_name, record.question_count
    )
}
