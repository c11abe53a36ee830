use std::process::ExitCode;
use std::sync::Arc;

use homeval_core::{
    AttemptRecord, CacheStore, LookupFailure, LookupService, Normalizer, PropertyAddress,
    ReqwestHttpClient, StrategyRegistry, UpstreamClient, UpstreamSettings,
};
use serde::Serialize;

use crate::cli::{Cli, Command, LookupArgs};
use crate::error::CliError;
use crate::output;

/// Exit status when every strategy failed.
const UPSTREAM_FAILURE: u8 = 3;

#[derive(Debug, Serialize)]
struct FailureReport<'a> {
    error: String,
    code: &'static str,
    attempts: &'a [AttemptRecord],
}

impl<'a> From<&'a LookupFailure> for FailureReport<'a> {
    fn from(failure: &'a LookupFailure) -> Self {
        Self {
            error: failure.to_string(),
            code: failure.kind.code(),
            attempts: &failure.attempts,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Lookup(args) => lookup(cli, args).await,
        Command::Strategies => strategies(cli),
    }
}

async fn lookup(cli: &Cli, args: &LookupArgs) -> Result<ExitCode, CliError> {
    let mut address = PropertyAddress::new(&args.street, &args.city, &args.state)?;
    if let Some(zip) = args.zip.as_deref().filter(|zip| !zip.trim().is_empty()) {
        address = address.with_zip(zip);
    }
    let config = UpstreamSettings::from_env().resolve()?;

    let upstream = UpstreamClient::new(Arc::new(ReqwestHttpClient::new()), StrategyRegistry::default())
        .with_timeout_ms(cli.timeout_ms);
    let service = LookupService::new(CacheStore::disabled(), upstream, Normalizer::default());

    match service.lookup(&address, &config).await {
        Ok(result) => {
            output::render(&result, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            output::render(&FailureReport::from(&failure), cli.pretty)?;
            Ok(ExitCode::from(UPSTREAM_FAILURE))
        }
    }
}

fn strategies(cli: &Cli) -> Result<ExitCode, CliError> {
    let registry = StrategyRegistry::default();
    output::render(&registry.strategies(), cli.pretty)?;
    Ok(ExitCode::SUCCESS)
}
