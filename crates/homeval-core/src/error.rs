use thiserror::Error;

use crate::upstream::LookupFailure;

/// Validation errors for caller-supplied input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("address field '{field}' cannot be empty")]
    EmptyAddressField { field: &'static str },

    #[error("field path cannot be empty")]
    EmptyFieldPath,
    #[error("field path '{path}' is malformed at byte {index}")]
    MalformedFieldPath { path: String, index: usize },

    #[error("strategy registry must contain at least one strategy")]
    EmptyRegistry,
    #[error("strategy name '{name}' is registered more than once")]
    DuplicateStrategy { name: String },
}

/// Configuration problems detected before any upstream call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("upstream endpoint url is not configured")]
    MissingEndpoint,
    #[error("upstream credential is not configured")]
    MissingCredential,
    #[error("upstream endpoint '{value}' is not a valid http(s) url: {reason}")]
    InvalidEndpoint { value: String, reason: String },
}

impl ConfigError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingEndpoint => "config.missing_endpoint",
            Self::MissingCredential => "config.missing_credential",
            Self::InvalidEndpoint { .. } => "config.invalid_endpoint",
        }
    }
}

/// Terminal outcome of an orchestrated lookup that produced no result.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] LookupFailure),
}

impl LookupError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(error) => error.code(),
            Self::Upstream(failure) => failure.kind.code(),
        }
    }
}
