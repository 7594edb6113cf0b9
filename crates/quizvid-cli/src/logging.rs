//! Log subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for command output. `QUIZVID_LOG`
//! takes an `EnvFilter` directive and overrides the verbosity flags.

use crate::config::{CliConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter directive
pub const LOG_ENV: &str = "QUIZVID_LOG";

/// Filter for the given verbosity, unless `QUIZVID_LOG` is set
#[must_use]
pub fn env_filter(config: &CliConfig, verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_level(verbose)))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(config: &CliConfig, verbose: u8) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(config, verbose))
        .with_target(false);

    let _ = match config.log_format {
        LogFormat::Text => builder.with_ansi(config.use_color()).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    #[test]
    fn test_filter_follows_verbosity() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        let config = CliConfig::new().with_verbosity(Verbosity::Verbose);
        assert_eq!(env_filter(&config, 1).to_string(), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = CliConfig::new().with_color(ColorChoice::Never);
        init_logging(&config, 0);
        init_logging(&config.with_log_format(LogFormat::Json), 0);
    }
}
