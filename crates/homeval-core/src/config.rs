//! Upstream configuration.
//!
//! The endpoint and credential are read from the environment only. Missing
//! values are not an error at startup: [`UpstreamSettings::resolve`] reports
//! them per lookup, before any strategy is attempted.
//!
//! | Setting | Primary Env Var | Fallback Env Var |
//! |---------|-----------------|------------------|
//! | Endpoint | `HOMEVAL_ENDPOINT_URL` | `VALUATION_API_URL` |
//! | Credential | `HOMEVAL_API_KEY` | `ATTOM_API_KEY` |

use std::env;
use std::fmt::{Debug, Formatter};

use reqwest::Url;

use crate::ConfigError;

/// Secret credential for the upstream provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Raw, possibly incomplete upstream settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub endpoint_url: Option<String>,
    pub credential: Option<Credential>,
}

impl UpstreamSettings {
    pub fn new(endpoint_url: Option<String>, credential: Option<String>) -> Self {
        Self {
            endpoint_url: non_blank(endpoint_url),
            credential: non_blank(credential).map(Credential::new),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            read_env("HOMEVAL_ENDPOINT_URL", "VALUATION_API_URL"),
            read_env("HOMEVAL_API_KEY", "ATTOM_API_KEY"),
        )
    }

    pub fn is_complete(&self) -> bool {
        self.resolve().is_ok()
    }

    /// Validates the settings into a usable [`UpstreamConfig`].
    pub fn resolve(&self) -> Result<UpstreamConfig, ConfigError> {
        let endpoint = self
            .endpoint_url
            .as_deref()
            .ok_or(ConfigError::MissingEndpoint)?;
        let credential = self
            .credential
            .clone()
            .ok_or(ConfigError::MissingCredential)?;

        UpstreamConfig::new(endpoint, credential)
    }
}

/// Complete upstream configuration: where to call and with what credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    endpoint: Url,
    credential: Credential,
}

impl UpstreamConfig {
    pub fn new(endpoint: &str, credential: Credential) -> Result<Self, ConfigError> {
        let endpoint = endpoint.trim();
        let url = Url::parse(endpoint).map_err(|error| ConfigError::InvalidEndpoint {
            value: endpoint.to_owned(),
            reason: error.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidEndpoint {
                value: endpoint.to_owned(),
                reason: String::from("scheme must be http or https with a host"),
            });
        }

        if credential.expose().trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }

        Ok(Self {
            endpoint: url,
            credential,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or_default()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

fn read_env(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary).or_else(|_| env::var(fallback)).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
