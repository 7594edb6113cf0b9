//! Export command handler

use super::reporter;
use crate::commands::ExportArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use quizvid::{export_quiz, load_quiz};
use std::io::Write;

/// Execute the export command
pub fn execute_export(config: &CliConfig, args: &ExportArgs) -> CliResult<()> {
    let quiz = load_quiz(&args.quiz_file)?;
    let bytes = export_quiz(&quiz, args.to)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &bytes)?;
            reporter(config).success(&format!(
                "Exported {} questions as {} to {}",
                quiz.question_count(),
                args.to,
                path.display()
            ));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            if !bytes.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
