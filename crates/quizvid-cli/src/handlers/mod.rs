//! Command handlers, one module per subcommand
//!
//! Each handler takes the presentation config and its parsed arguments,
//! loads the application config when it needs one, and returns a
//! [`CliResult`]. Pure helpers live next to the handler that uses them.

pub mod batch;
pub mod config;
pub mod create;
pub mod doctor;
pub mod export;
pub mod generate;
pub mod history;
pub mod list;
pub mod stats;
pub mod templates;
pub mod validate;

pub use batch::execute_batch;
pub use config::execute_config;
pub use create::execute_create;
pub use doctor::execute_doctor;
pub use export::execute_export;
pub use generate::execute_generate;
pub use history::execute_history;
pub use list::execute_list;
pub use stats::execute_stats;
pub use templates::execute_templates;
pub use validate::execute_validate;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use quizvid::AppConfig;
use serde::Serialize;

/// Application config from `--config`, `$QUIZVID_CONFIG` or `./quizvid.yaml`,
/// overlaid with the environment
pub fn load_app_config(config: &CliConfig) -> CliResult<AppConfig> {
    Ok(AppConfig::load(config.config_file.as_deref())?)
}

/// Reporter honouring the color and quiet settings
#[must_use]
pub fn reporter(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.use_color(), config.verbosity.is_quiet())
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
