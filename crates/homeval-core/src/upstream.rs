//! Strategy-probing upstream client.
//!
//! [`UpstreamClient::lookup`] walks the [`StrategyRegistry`] in order and
//! returns the first response that is both 2xx and valid JSON. Every other
//! outcome is recovered locally into an [`AttemptRecord`]; only exhausting the
//! registry surfaces as a [`LookupFailure`], which carries the whole trail so an
//! operator can see which auth/method combination the upstream expects.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::http_client::{HttpClient, DEFAULT_TIMEOUT_MS};
use crate::strategy::{RequestStrategy, StrategyRegistry};
use crate::{PropertyAddress, UpstreamConfig};

/// What a single strategy produced at the transport level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttemptOutcome {
    #[serde(rename = "status")]
    Status(u16),
    #[serde(rename = "transportErrorMessage")]
    TransportError(String),
}

impl AttemptOutcome {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status(status) => Some(*status),
            Self::TransportError(_) => None,
        }
    }
}

/// Operator-facing classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    /// 429: wait before retrying.
    RateLimited,
    /// 401/403: the credential or auth scheme is wrong.
    AuthRejected,
    /// Any other 4xx.
    ClientError,
    /// 5xx and any other non-2xx status.
    UpstreamError,
    /// 2xx whose body is not JSON.
    UnparsableBody,
    /// No response at all (network, DNS, timeout).
    TransportError,
}

impl Diagnosis {
    fn classify(outcome: &AttemptOutcome) -> Self {
        match outcome {
            AttemptOutcome::TransportError(_) => Self::TransportError,
            AttemptOutcome::Status(429) => Self::RateLimited,
            AttemptOutcome::Status(401 | 403) => Self::AuthRejected,
            AttemptOutcome::Status(status) if (200..300).contains(status) => Self::UnparsableBody,
            AttemptOutcome::Status(status) if (400..500).contains(status) => Self::ClientError,
            AttemptOutcome::Status(_) => Self::UpstreamError,
        }
    }
}

/// Outcome of one strategy that did not yield a usable payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub strategy_name: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
    #[serde(skip)]
    pub parsed_body: Option<Value>,
    pub diagnosis: Diagnosis,
}

impl AttemptRecord {
    pub fn transport_error(strategy_name: impl Into<String>, message: impl Into<String>) -> Self {
        let outcome = AttemptOutcome::TransportError(message.into());
        Self {
            strategy_name: strategy_name.into(),
            diagnosis: Diagnosis::classify(&outcome),
            outcome,
            raw_body: None,
            parsed_body: None,
        }
    }

    pub fn response(
        strategy_name: impl Into<String>,
        status: u16,
        raw_body: String,
        parsed_body: Option<Value>,
    ) -> Self {
        let outcome = AttemptOutcome::Status(status);
        Self {
            strategy_name: strategy_name.into(),
            diagnosis: Diagnosis::classify(&outcome),
            outcome,
            raw_body: Some(raw_body),
            parsed_body,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        self.outcome.status()
    }
}

/// Failure classification, mapped to the caller-visible status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The last strategy that got an HTTP response was rate-limited.
    RateLimited,
    /// Strategies were answered, but with non-2xx statuses or unusable bodies.
    UpstreamRejected,
    /// No strategy reached the upstream.
    TransportUnreachable,
}

impl FailureKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::RateLimited => "upstream.rate_limited",
            Self::UpstreamRejected => "upstream.rejected",
            Self::TransportUnreachable => "upstream.unreachable",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::RateLimited => "valuation provider rate limit reached",
            Self::UpstreamRejected => "valuation provider rejected every request strategy",
            Self::TransportUnreachable => "valuation provider unreachable",
        }
    }

    fn from_attempts(attempts: &[AttemptRecord]) -> Self {
        match attempts.iter().rev().find_map(AttemptRecord::status) {
            Some(429) => Self::RateLimited,
            Some(_) => Self::UpstreamRejected,
            None => Self::TransportUnreachable,
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Every strategy was tried and none produced a usable payload.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} after {} attempt(s)", .attempts.len())]
pub struct LookupFailure {
    pub kind: FailureKind,
    /// One record per strategy, in registry order.
    pub attempts: Vec<AttemptRecord>,
}

impl LookupFailure {
    pub fn new(attempts: Vec<AttemptRecord>) -> Self {
        Self {
            kind: FailureKind::from_attempts(&attempts),
            attempts,
        }
    }
}

/// Parsed payload from the first strategy that worked.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamSuccess {
    pub payload: Value,
    pub strategy_name: String,
    /// Strategies that failed before the winning one, in registry order.
    pub failed_attempts: Vec<AttemptRecord>,
}

/// Runs registry strategies against the transport, strictly in sequence.
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: Arc<dyn HttpClient>,
    registry: StrategyRegistry,
    timeout_ms: u64,
}

impl UpstreamClient {
    pub fn new(http_client: Arc<dyn HttpClient>, registry: StrategyRegistry) -> Self {
        Self {
            http_client,
            registry,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub async fn lookup(
        &self,
        address: &PropertyAddress,
        config: &UpstreamConfig,
    ) -> Result<UpstreamSuccess, LookupFailure> {
        let mut attempts = Vec::with_capacity(self.registry.len());

        for strategy in self.registry.strategies() {
            match self.attempt(strategy, address, config).await {
                Ok(payload) => {
                    if !attempts.is_empty() {
                        tracing::warn!(
                            strategy = strategy.name(),
                            failed = attempts.len(),
                            "upstream fallback succeeded after failed attempt(s)"
                        );
                    }

                    return Ok(UpstreamSuccess {
                        payload,
                        strategy_name: strategy.name().to_owned(),
                        failed_attempts: attempts,
                    });
                }
                Err(record) => attempts.push(record),
            }
        }

        let failure = LookupFailure::new(attempts);
        tracing::warn!(
            kind = failure.kind.code(),
            attempts = failure.attempts.len(),
            "all upstream strategies failed"
        );
        Err(failure)
    }

    async fn attempt(
        &self,
        strategy: &RequestStrategy,
        address: &PropertyAddress,
        config: &UpstreamConfig,
    ) -> Result<Value, AttemptRecord> {
        let request = strategy
            .build(config, address)
            .with_timeout_ms(self.timeout_ms);

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(
                    strategy = strategy.name(),
                    error = error.message(),
                    "upstream transport error"
                );
                return Err(AttemptRecord::transport_error(
                    strategy.name(),
                    error.message(),
                ));
            }
        };

        let parsed = serde_json::from_str::<Value>(&response.body).ok();
        tracing::debug!(
            strategy = strategy.name(),
            status = response.status,
            json = parsed.is_some(),
            "upstream responded"
        );

        match parsed {
            Some(payload) if response.is_success() => Ok(payload),
            parsed => Err(AttemptRecord::response(
                strategy.name(),
                response.status,
                response.body,
                parsed,
            )),
        }
    }
}
