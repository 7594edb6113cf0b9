//! quizvid: render quiz files to video
//!
//! ## Usage
//!
//! ```bash
//! quizvid create --title "World Capitals"          # New quiz document
//! quizvid list --questions                          # Saved quizzes
//! quizvid validate quiz_data/capitals.json         # Check a quiz
//! quizvid generate -i capitals.json --quality high # Render to video
//! quizvid batch --input-dir quiz_data -j 4         # Render a directory
//! ```

use clap::Parser;
use quizvid_cli::{
    handlers, init_logging, Cli, CliConfig, CliResult, ColorChoice, Commands, LogFormat,
    Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    init_logging(&config, cli.verbose);

    match &cli.command {
        Commands::Create(args) => handlers::execute_create(&config, args),
        Commands::List(args) => handlers::execute_list(&config, args),
        Commands::Generate(args) => handlers::execute_generate(&config, args),
        Commands::Batch(args) => handlers::execute_batch(&config, args),
        Commands::Templates(args) => handlers::execute_templates(&config, args),
        Commands::Validate(args) => handlers::execute_validate(&config, args),
        Commands::Export(args) => handlers::execute_export(&config, args),
        Commands::Stats(args) => handlers::execute_stats(&config, args),
        Commands::History(args) => handlers::execute_history(&config, args),
        Commands::Config(args) => handlers::execute_config(&config, args),
        Commands::Doctor => handlers::execute_doctor(&config),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(ColorChoice::from(cli.color))
        .with_log_format(LogFormat::from(cli.log_format))
        .with_config_file(cli.config.clone())
}
