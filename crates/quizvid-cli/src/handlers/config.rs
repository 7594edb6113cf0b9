//! Config command handler

use super::load_app_config;
use crate::commands::ConfigArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use quizvid::AppConfig;

/// Execute the config command.
///
/// Showing is the only action, so `--show` may be omitted. The YAML printed
/// can be saved as `quizvid.yaml`.
pub fn execute_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    let (app, source) = if args.defaults {
        (AppConfig::default(), "built-in defaults".to_string())
    } else {
        let source = AppConfig::config_file(config.config_file.as_deref()).map_or_else(
            || "defaults and environment".to_string(),
            |path| format!("{} and environment", path.display()),
        );
        (load_app_config(config)?, source)
    };

    print!("{}", render_config(&app, &source)?);
    Ok(())
}

/// YAML document headed by a comment naming its source
pub fn render_config(app: &AppConfig, source: &str) -> CliResult<String> {
    Ok(format!("# quizvid configuration: {source}\n{}", app.to_yaml()?))
}
