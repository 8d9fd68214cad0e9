use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Alert threshold must be greater than zero, got {0}")]
    NonPositiveThreshold(Decimal),

    #[error("Network backoff {network:?} must be at least twice the rate-limit backoff {rate_limit:?}")]
    BackoffTooShort {
        network: Duration,
        rate_limit: Duration,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub fn validate_api_key(api_key: &str) -> Result<(), ValidationError> {
    if api_key.trim().is_empty() {
        return Err(ValidationError::MissingParameter("ETHERSCAN_API_KEY".to_string()));
    }

    if api_key.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidParameter(
            "API key must not contain whitespace".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_threshold(threshold: Decimal) -> Result<(), ValidationError> {
    if threshold <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveThreshold(threshold));
    }
    Ok(())
}

pub fn validate_backoff(rate_limit: Duration, network: Duration) -> Result<(), ValidationError> {
    if network < rate_limit * 2 {
        return Err(ValidationError::BackoffTooShort { network, rate_limit });
    }
    Ok(())
}

/// Hide all but the edges of a secret before it reaches a log line.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
