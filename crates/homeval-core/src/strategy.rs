//! Request strategies for an upstream whose calling convention is not known
//! up front.
//!
//! Each [`RequestStrategy`] is one hypothesis about the upstream contract: an
//! HTTP method, an auth scheme and an address encoding. The
//! [`StrategyRegistry`] orders them most-likely-correct first.
//!
//! | # | Name | Method | Auth | Encoding |
//! |---|------|--------|------|----------|
//! | 1 | `get_apikey_split_query` | GET | `apikey` header | `address1` / `address2` query |
//! | 2 | `get_bearer_query` | GET | bearer token | address query |
//! | 3 | `post_bearer_json` | POST | bearer token | JSON body |
//! | 4 | `get_rapidapi_query` | GET | RapidAPI key + host | address query |
//! | 5 | `post_rapidapi_json` | POST | RapidAPI key + host | JSON body |

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::Serialize;

use crate::http_client::{HttpAuth, HttpMethod, HttpRequest};
use crate::{PropertyAddress, UpstreamConfig, ValidationError};

/// How the credential is presented to the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <credential>`.
    Bearer,
    /// Credential sent verbatim in the named header.
    ApiKeyHeader { name: String },
    /// `x-rapidapi-key` plus `x-rapidapi-host` set to the endpoint host.
    RapidApi,
}

impl AuthScheme {
    pub fn api_key_header(name: impl Into<String>) -> Self {
        Self::ApiKeyHeader { name: name.into() }
    }

    fn auth_headers(&self, config: &UpstreamConfig) -> Vec<HttpAuth> {
        let credential = config.credential().expose().to_owned();
        match self {
            Self::Bearer => vec![HttpAuth::BearerToken(credential)],
            Self::ApiKeyHeader { name } => vec![HttpAuth::Header {
                name: name.clone(),
                value: credential,
            }],
            Self::RapidApi => vec![
                HttpAuth::Header {
                    name: String::from("x-rapidapi-key"),
                    value: credential,
                },
                HttpAuth::Header {
                    name: String::from("x-rapidapi-host"),
                    value: config.host().to_owned(),
                },
            ],
        }
    }
}

impl Display for AuthScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer => f.write_str("bearer"),
            Self::ApiKeyHeader { name } => write!(f, "header:{name}"),
            Self::RapidApi => f.write_str("rapidapi"),
        }
    }
}

/// Where the address goes in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// `address`, `street`, `city`, `state` (and `zip`) query parameters.
    Query,
    /// The same fields as a JSON object body.
    JsonBody,
    /// `address1=<street>` and `address2=<city>, <state>` query parameters.
    SplitAddressQuery,
}

impl Display for PayloadEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::JsonBody => "json_body",
            Self::SplitAddressQuery => "split_address_query",
        })
    }
}

/// One hypothesis about the upstream calling convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStrategy {
    name: String,
    method: HttpMethod,
    auth: AuthScheme,
    encoding: PayloadEncoding,
}

impl RequestStrategy {
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        auth: AuthScheme,
        encoding: PayloadEncoding,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            auth,
            encoding,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn auth(&self) -> &AuthScheme {
        &self.auth
    }

    pub const fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }

    /// Builds the request descriptor for `address` against the configured endpoint.
    pub fn build(&self, config: &UpstreamConfig, address: &PropertyAddress) -> HttpRequest {
        let mut request = HttpRequest::new(self.method, config.endpoint())
            .with_header("accept", "application/json");

        for auth in self.auth.auth_headers(config) {
            request = request.with_auth(&auth);
        }

        let display = address.display();
        match self.encoding {
            PayloadEncoding::Query => request.with_query(&address_fields(address, &display)),
            PayloadEncoding::SplitAddressQuery => {
                let locality = address.locality();
                request.with_query(&[("address1", address.street()), ("address2", &locality)])
            }
            PayloadEncoding::JsonBody => {
                let body = address_fields(address, &display)
                    .into_iter()
                    .map(|(name, value)| (name.to_owned(), serde_json::Value::from(value)))
                    .collect::<serde_json::Map<_, _>>();
                request
                    .with_header("content-type", "application/json")
                    .with_body(serde_json::Value::Object(body).to_string())
            }
        }
    }
}

fn address_fields<'a>(address: &'a PropertyAddress, display: &'a str) -> Vec<(&'static str, &'a str)> {
    let mut fields = vec![
        ("address", display),
        ("street", address.street()),
        ("city", address.city()),
        ("state", address.state()),
    ];
    if let Some(zip) = address.zip() {
        fields.push(("zip", zip));
    }
    fields
}

/// Ordered, immutable list of strategies, shared cheaply across requests.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: Arc<[RequestStrategy]>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self {
            strategies: Arc::from(default_strategies()),
        }
    }
}

impl StrategyRegistry {
    /// Creates a registry in the given priority order. Names must be unique.
    pub fn new(strategies: Vec<RequestStrategy>) -> Result<Self, ValidationError> {
        if strategies.is_empty() {
            return Err(ValidationError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for strategy in &strategies {
            if !seen.insert(strategy.name()) {
                return Err(ValidationError::DuplicateStrategy {
                    name: strategy.name.clone(),
                });
            }
        }

        Ok(Self {
            strategies: Arc::from(strategies),
        })
    }

    pub fn strategies(&self) -> &[RequestStrategy] {
        &self.strategies
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(RequestStrategy::name).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

fn default_strategies() -> Vec<RequestStrategy> {
    vec![
        RequestStrategy::new(
            "get_apikey_split_query",
            HttpMethod::Get,
            AuthScheme::api_key_header("apikey"),
            PayloadEncoding::SplitAddressQuery,
        ),
        RequestStrategy::new(
            "get_bearer_query",
            HttpMethod::Get,
            AuthScheme::Bearer,
            PayloadEncoding::Query,
        ),
        RequestStrategy::new(
            "post_bearer_json",
            HttpMethod::Post,
            AuthScheme::Bearer,
            PayloadEncoding::JsonBody,
        ),
        RequestStrategy::new(
            "get_rapidapi_query",
            HttpMethod::Get,
            AuthScheme::RapidApi,
            PayloadEncoding::Query,
        ),
        RequestStrategy::new(
            "post_rapidapi_json",
            HttpMethod::Post,
            AuthScheme::RapidApi,
            PayloadEncoding::JsonBody,
        ),
    ]
}
