//! CLI argument definitions for homeval.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lookup` | Run one valuation lookup against the configured provider |
//! | `strategies` | List request strategies in the order they are tried |
//!
//! The provider endpoint and credential come from the environment
//! (`HOMEVAL_ENDPOINT_URL`, `HOMEVAL_API_KEY`), never from flags.
//!
//! # Examples
//!
//! ```bash
//! homeval lookup --street "1 Main St" --city Springfield --state IL --pretty
//! homeval strategies
//! ```

use clap::{Args, Parser, Subcommand};
use homeval_core::DEFAULT_TIMEOUT_MS;

#[derive(Debug, Parser)]
#[command(
    name = "homeval",
    author,
    version,
    about = "Probe a property valuation provider from the command line"
)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-attempt upstream timeout in milliseconds.
    #[arg(long, global = true, env = "HOMEVAL_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Log attempt-level detail to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up one address, printing the result or the full attempt trail.
    Lookup(LookupArgs),
    /// List request strategies in probe order.
    Strategies,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    #[arg(long)]
    pub street: String,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,

    #[arg(long)]
    pub zip: Option<String>,
}
