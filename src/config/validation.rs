//! Configuration validation.
//!
//! Serde handles the syntax; this checks values that parse but cannot work
//! (unparsable URLs, zero timeouts, contradictory gas bounds). Every problem
//! is reported, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{ClientConfig, GasPolicyKind};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.keystore.dir.trim().is_empty() {
        errors.push(ValidationError::new("keystore.dir", "must not be empty"));
    }

    if let Err(e) = config.chain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("invalid URL '{}': {}", config.chain.rpc_url, e),
        ));
    }
    for (i, failover) in config.chain.failover_urls.iter().enumerate() {
        if let Err(e) = failover.parse::<url::Url>() {
            errors.push(ValidationError::new(
                format!("chain.failover_urls[{}]", i),
                format!("invalid URL '{}': {}", failover, e),
            ));
        }
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }

    let gas = &config.gas;
    if gas.policy == GasPolicyKind::Fixed {
        if gas.fixed_price_gwei == 0 {
            errors.push(ValidationError::new("gas.fixed_price_gwei", "must be greater than 0"));
        }
        if gas.fixed_price_gwei > gas.max_price_gwei {
            errors.push(ValidationError::new(
                "gas.fixed_price_gwei",
                format!("exceeds gas.max_price_gwei ({})", gas.max_price_gwei),
            ));
        }
    }
    if gas.call_gas_limit == 0 {
        errors.push(ValidationError::new("gas.call_gas_limit", "must be greater than 0"));
    }

    if let Some(index) = &config.contracts.index_path {
        if index.trim().is_empty() {
            errors.push(ValidationError::new("contracts.index_path", "must not be empty when set"));
        }
    } else if config.contracts.watch {
        errors.push(ValidationError::new("contracts.watch", "requires contracts.index_path"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
