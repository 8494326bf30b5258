use thiserror::Error;

/// A single `L_*n` error entry reported by the NVP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GatewayErrorDetail {
    pub code: String,
    pub short_message: String,
    pub long_message: String,
    pub severity: String,
}

#[derive(Error, Debug)]
pub enum PaymentsError {
    #[error("Payments configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Payments validation error: {message}")]
    PaymentsValidationError { message: String },

    #[error("Transaction validation error on {field}: {message}")]
    TransactionValidationError { field: String, message: String },

    #[error("Gateway {method} call failed with ACK={ack}: {}", summarize(.errors))]
    GatewayError {
        method: String,
        ack: String,
        correlation_id: Option<String>,
        errors: Vec<GatewayErrorDetail>,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Gateway endpoint returned HTTP {status} for {method}")]
    HttpStatusError { method: String, status: u16 },

    #[error("Malformed gateway response to {method}: {message}")]
    ProtocolError { method: String, message: String },

    #[error("Unsupported operation: {message}")]
    UnsupportedError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn summarize(errors: &[GatewayErrorDetail]) -> String {
    if errors.is_empty() {
        return "no error details returned".to_string();
    }
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.long_message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Gateway,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PaymentsError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn transaction(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransactionValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn protocol(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProtocolError {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::PaymentsValidationError { .. }
            | Self::TransactionValidationError { .. }
            | Self::UnsupportedError { .. } => ErrorCategory::Validation,
            Self::GatewayError { .. } | Self::ProtocolError { .. } => ErrorCategory::Gateway,
            Self::HttpError(_) | Self::HttpStatusError { .. } => ErrorCategory::Network,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Validation | ErrorCategory::Gateway => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ConfigurationError { message } => {
                format!("Payments are not configured correctly: {}", message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting {} is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Setting {} is required", field),
            Self::PaymentsValidationError { message } => {
                format!("The payment result was rejected: {}", message)
            }
            Self::TransactionValidationError { field, message } => {
                format!("The transaction is invalid ({}): {}", field, message)
            }
            Self::GatewayError { errors, .. } => match errors.first() {
                Some(first) => format!("PayPal declined the request: {}", first.long_message),
                None => "PayPal declined the request".to_string(),
            },
            Self::HttpError(_) | Self::HttpStatusError { .. } => {
                "Could not reach the payment gateway".to_string()
            }
            Self::ProtocolError { .. } => {
                "The payment gateway sent a response that could not be understood".to_string()
            }
            Self::UnsupportedError { message } => format!("Not supported: {}", message),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(e) => format!("Could not encode output: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check PAYMENT_API and the PAYPAL_API_* settings in your config file or environment"
                    .to_string()
            }
            ErrorCategory::Validation => {
                "Check the amount, currency and return/cancel URLs of the transaction".to_string()
            }
            ErrorCategory::Gateway => match self {
                Self::GatewayError {
                    correlation_id: Some(id),
                    ..
                } => format!(
                    "Look up the error code in the PayPal NVP reference (correlation id {})",
                    id
                ),
                _ => "Look up the error code in the PayPal NVP reference".to_string(),
            },
            ErrorCategory::Network => {
                "Check network connectivity and PAYPAL_API_ENDPOINT, then try again".to_string()
            }
            ErrorCategory::System => "Check file permissions and available disk space".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentsError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(code: &str, long: &str) -> GatewayErrorDetail {
        GatewayErrorDetail {
            code: code.to_string(),
            short_message: "Short".to_string(),
            long_message: long.to_string(),
            severity: "Error".to_string(),
        }
    }

    #[test]
    fn test_gateway_error_display_lists_codes() {
        let err = PaymentsError::GatewayError {
            method: "SetExpressCheckout".to_string(),
            ack: "Failure".to_string(),
            correlation_id: Some("abc123".to_string()),
            errors: vec![
                detail("10002", "Security header is not valid"),
                detail("10004", "Invalid amount"),
            ],
        };

        let text = err.to_string();
        assert!(text.contains("ACK=Failure"));
        assert!(text.contains("[10002] Security header is not valid"));
        assert!(text.contains("[10004] Invalid amount"));
        assert!(err.recovery_suggestion().contains("abc123"));
    }

    #[test]
    fn test_category_and_severity() {
        let err = PaymentsError::config("PAYMENT_API not set");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = PaymentsError::HttpStatusError {
            method: "DoExpressCheckoutPayment".to_string(),
            status: 503,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = PaymentsError::transaction("amount", "must be positive");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.user_friendly_message().contains("amount"));
    }
}
