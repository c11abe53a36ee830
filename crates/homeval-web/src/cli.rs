use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use homeval_core::DEFAULT_TIMEOUT_MS;
use homeval_web::telemetry::LogFormat;

/// Lead capture valuation service.
///
/// Upstream endpoint and credential are read from the environment only
/// (`HOMEVAL_ENDPOINT_URL`, `HOMEVAL_API_KEY`).
#[derive(Debug, Parser)]
#[command(name = "homeval-server", version, about)]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "HOMEVAL_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Lifetime of cached lookups; 0 disables caching.
    #[arg(long, env = "HOMEVAL_CACHE_TTL_SECS", default_value_t = 86_400)]
    pub cache_ttl_secs: u64,

    /// Per-attempt upstream timeout.
    #[arg(long, env = "HOMEVAL_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    #[arg(long, env = "HOMEVAL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
