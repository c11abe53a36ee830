mod cli;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use homeval_core::{
    CacheStore, LookupService, Normalizer, ReqwestHttpClient, StrategyRegistry, UpstreamClient,
    UpstreamSettings,
};
use homeval_web::telemetry::{self, TelemetryError};
use homeval_web::{create_router, AppState};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::cli::Cli;

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    const fn exit_code(&self) -> u8 {
        match self {
            Self::Telemetry(_) => 2,
            Self::Io(_) => 10,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_format)?;

    let settings = UpstreamSettings::from_env();
    if let Err(error) = settings.resolve() {
        tracing::warn!(code = error.code(), "{error}; lookups will fail until configured");
    }

    let upstream = UpstreamClient::new(Arc::new(ReqwestHttpClient::new()), StrategyRegistry::default())
        .with_timeout_ms(cli.timeout_ms);
    let service = LookupService::new(
        CacheStore::new(Duration::from_secs(cli.cache_ttl_secs)),
        upstream,
        Normalizer::default(),
    );
    let app = create_router(AppState::new(service, settings));

    let addr = cli.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, cache_ttl_secs = cli.cache_ttl_secs, "homeval server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("homeval server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
}
