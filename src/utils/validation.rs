use crate::utils::error::{PaymentsError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PaymentsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PaymentsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PaymentsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(PaymentsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Presence check for credentials; the value itself is never echoed back.
pub fn validate_secret(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PaymentsError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PaymentsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("PAYPAL_API_ENDPOINT", "https://api-3t.paypal.com/nvp").is_ok());
        assert!(validate_url("PAYPAL_API_ENDPOINT", "http://localhost:8080/nvp").is_ok());
        assert!(validate_url("PAYPAL_API_ENDPOINT", "").is_err());
        assert!(validate_url("PAYPAL_API_ENDPOINT", "invalid-url").is_err());
        assert!(validate_url("PAYPAL_API_ENDPOINT", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("PAYPAL_TIMEOUT_SECONDS", 30, 1).is_ok());
        assert!(validate_positive_number("PAYPAL_TIMEOUT_SECONDS", 0, 1).is_err());
    }

    #[test]
    fn test_validate_secret_does_not_leak_value() {
        assert!(validate_secret("PAYPAL_API_PWD", "hunter2").is_ok());

        let err = validate_secret("PAYPAL_API_PWD", "   ").unwrap_err();
        assert!(matches!(err, PaymentsError::MissingConfigError { ref field } if field == "PAYPAL_API_PWD"));
    }
}
