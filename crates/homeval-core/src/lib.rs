//! # Homeval Core
//!
//! Cached, multi-strategy property valuation lookups.
//!
//! ## Overview
//!
//! The valuation provider's contract (auth scheme, HTTP method, response shape)
//! is not reliably known when the service is deployed. This crate treats it as
//! something to probe at runtime:
//!
//! - **TTL cache** of completed lookups keyed by normalized address
//! - **Strategy registry**: ordered hypotheses about how to call the provider
//! - **Upstream client** that tries them in order and keeps a full attempt trail
//! - **Normalizer** that pulls estimates out of unknown JSON via candidate paths
//! - **Lookup service** composing the above
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`address`] | Property address and normalized cache key |
//! | [`cache`] | In-memory TTL cache with lazy expiry |
//! | [`config`] | Upstream endpoint and credential |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`lookup`] | Cache-first lookup orchestration |
//! | [`normalize`] | Candidate-path extraction from JSON payloads |
//! | [`strategy`] | Request strategies and their registry |
//! | [`testing`] | Scripted in-memory HTTP client |
//! | [`upstream`] | Strategy-probing upstream client |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use homeval_core::{CacheStore, LookupService, PropertyAddress, ReqwestHttpClient, UpstreamSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = LookupService::with_defaults(
//!         CacheStore::with_default_ttl(),
//!         Arc::new(ReqwestHttpClient::new()),
//!     );
//!
//!     let config = UpstreamSettings::from_env().resolve()?;
//!     let address = PropertyAddress::new("1 Main St", "Springfield", "IL")?;
//!     let result = service.lookup(&address, &config).await?;
//!
//!     println!("{}: {:?}", result.address, result.estimated_value);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Lookup Service  │────▶│  TTL Cache       │
//! └────────┬────────┘     └──────────────────┘
//!          │ miss
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Upstream Client │────▶│ Strategy Registry│
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ HTTP Client     │
//! │ (reqwest/test)  │
//! └────────┬────────┘
//!          │ first 2xx + JSON
//!          ▼
//! ┌─────────────────┐
//! │ Normalizer      │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Strategy failures are recovered into attempt records. Only total exhaustion
//! surfaces, classified for the caller:
//!
//! ```rust
//! use homeval_core::{FailureKind, LookupFailure};
//!
//! fn handle(failure: LookupFailure) {
//!     match failure.kind {
//!         FailureKind::RateLimited => {
//!             // Wait and retry
//!         }
//!         FailureKind::UpstreamRejected => {
//!             // Inspect failure.attempts for the auth/method the provider expects
//!         }
//!         FailureKind::TransportUnreachable => {
//!             // Provider or network outage
//!         }
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The credential is read from environment variables only and never logged
//! - `Debug` output of credentials and auth headers is redacted

pub mod address;
pub mod cache;
pub mod config;
pub mod error;
pub mod http_client;
pub mod lookup;
pub mod normalize;
pub mod strategy;
pub mod testing;
pub mod upstream;

// Address model
pub use address::{AddressKey, PropertyAddress};

// Caching
pub use cache::{CacheStore, DEFAULT_TTL};

// Configuration
pub use config::{Credential, UpstreamConfig, UpstreamSettings};

// Error types
pub use error::{ConfigError, LookupError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    DEFAULT_TIMEOUT_MS,
};

// Orchestration
pub use lookup::{LookupResult, LookupService};

// Normalization
pub use normalize::{extract, FieldCandidates, FieldPath, Normalizer};

// Strategies
pub use strategy::{AuthScheme, PayloadEncoding, RequestStrategy, StrategyRegistry};

// Upstream probing
pub use upstream::{
    AttemptOutcome, AttemptRecord, Diagnosis, FailureKind, LookupFailure, UpstreamClient,
    UpstreamSuccess,
};
