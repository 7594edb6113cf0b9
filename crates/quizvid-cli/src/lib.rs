//! quizvid CLI library
//!
//! Argument parsing, console output and one handler per subcommand for the
//! `quizvid` binary. Rendering itself lives in the `quizvid` crate.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    BatchArgs, Cli, ColorArg, Commands, ConfigArgs, CreateArgs, ExportArgs, GenerateArgs,
    HistoryArgs, ListArgs, LogFormatArg, StatsArgs, TemplatesAction, TemplatesArgs, ValidateArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::{OutputFormat, ProgressReporter};
