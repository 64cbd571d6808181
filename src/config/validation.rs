//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (connection limit > 0, length bound fits a signed length)
//! - Check the bind address and log level are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResplenConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ResplenConfig;

/// Smallest header limit that can still hold a request line.
const MIN_HEADER_LIMIT: usize = 64;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    ZeroConnections,

    #[error("response.max_length {0} exceeds {max}", max = i64::MAX)]
    MaxLengthOverflow(u64),

    #[error("request.header_limit {0} is below {min}", min = MIN_HEADER_LIMIT)]
    HeaderLimitTooSmall(usize),

    #[error("request.max_headers must be greater than zero")]
    ZeroHeaders,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ResplenConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }
    if let Some(max) = config.response.max_length {
        if i64::try_from(max).is_err() {
            errors.push(ValidationError::MaxLengthOverflow(max));
        }
    }
    if config.request.header_limit < MIN_HEADER_LIMIT {
        errors.push(ValidationError::HeaderLimitTooSmall(
            config.request.header_limit,
        ));
    }
    if config.request.max_headers == 0 {
        errors.push(ValidationError::ZeroHeaders);
    }
    if config
        .observability
        .log_level
        .parse::<tracing::Level>()
        .is_err()
    {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ResplenConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ResplenConfig::default();
        config.listener.bind_address = "localhost".into();
        config.listener.max_connections = 0;
        config.response.max_length = Some(u64::MAX);
        config.request.header_limit = 10;
        config.request.max_headers = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("localhost".into()),
                ValidationError::ZeroConnections,
                ValidationError::MaxLengthOverflow(u64::MAX),
                ValidationError::HeaderLimitTooSmall(10),
                ValidationError::ZeroHeaders,
                ValidationError::LogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn unbounded_length_is_valid() {
        let mut config = ResplenConfig::default();
        config.response.max_length = None;
        assert!(validate_config(&config).is_ok());
    }
}
