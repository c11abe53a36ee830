mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    commands::run(&cli).await
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) -> Result<(), CliError> {
    let default = if verbose { "homeval_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| CliError::Logging(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_logging_init_is_reported() {
        let _ = init_logging(false);

        let error = init_logging(true).expect_err("subscriber already installed");
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().starts_with("failed to install tracing subscriber"));
    }
}
