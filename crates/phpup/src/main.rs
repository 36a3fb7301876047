//! phpup CLI.
//!
//! Resolves a comma-separated list of PHP development tools into
//! concrete download URLs and prints an installation script for the
//! executor helpers to run. The engine only decides *what* to fetch
//! from *where*; it installs nothing itself.

// The binary's whole purpose is writing the script to stdout.
#![allow(clippy::print_stdout)]

use clap::Parser;
use phpup_core::tools::Os;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level options for the CLI.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Resolve PHP dev tools and emit an installation script.
#[derive(Debug, Parser)]
#[command(name = "phpup", version, about)]
struct Cli {
    /// Comma-separated tools to set up, each `name` or `name:version`
    #[arg(long, env = "PHPUP_TOOLS")]
    tools: String,

    /// PHP version the environment targets, e.g. 8.3
    #[arg(long, env = "PHPUP_PHP_VERSION")]
    php_version: String,

    /// Target operating system the script runs on
    #[arg(long, default_value_t = Os::current())]
    os: Os,

    /// Log verbosity
    #[arg(long, short = 'l', value_enum, default_value_t = LogLevel::Warn)]
    level: LogLevel,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --level when both are present.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::from(cli.level).to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let script = phpup_script::synthesize(&cli.tools, &cli.php_version, cli.os)
        .await
        .map_err(miette::Report::new)?;
    println!("{script}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_tools_and_os() {
        let cli = Cli::parse_from([
            "phpup",
            "--tools",
            "phpunit,phpstan:1.10.0",
            "--php-version",
            "8.3",
            "--os",
            "darwin",
        ]);
        assert_eq!(cli.tools, "phpunit,phpstan:1.10.0");
        assert_eq!(cli.php_version, "8.3");
        assert_eq!(cli.os, Os::Darwin);
    }

    #[test]
    fn test_cli_defaults_to_current_os() {
        let cli = Cli::parse_from(["phpup", "--tools", "none", "--php-version", "8.3"]);
        assert_eq!(cli.os, Os::current());
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
    }
}
