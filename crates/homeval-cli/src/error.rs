use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] homeval_core::ValidationError),

    #[error(transparent)]
    Config(#[from] homeval_core::ConfigError),

    #[error("failed to install tracing subscriber: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Logging(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_problems_share_the_usage_exit_code() {
        let error = CliError::from(homeval_core::ConfigError::MissingEndpoint);
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "upstream endpoint url is not configured");
    }
}
