#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{PaymentsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_secret, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SANDBOX_API_ENDPOINT: &str = "https://api-3t.sandbox.paypal.com/nvp";
pub const SANDBOX_API_URL: &str = "https://www.sandbox.paypal.com/cgi-bin/webscr?cmd=_express-checkout&token=";
pub const LIVE_API_ENDPOINT: &str = "https://api-3t.paypal.com/nvp";
pub const LIVE_API_URL: &str = "https://www.paypal.com/cgi-bin/webscr?cmd=_express-checkout&token=";
pub const DEFAULT_API_VERSION: &str = "98.0";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Settings consumed by `Payments` and the gateways it binds.
///
/// Field names on the wire (TOML keys, environment variables) are the
/// upper-case setting names, e.g. `PAYPAL_API_USER`.
#[derive(Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(rename = "PAYMENT_API", default = "default_payment_api")]
    pub payment_api: String,

    #[serde(rename = "TESTING", default)]
    pub testing: bool,

    #[serde(rename = "PAYPAL_API_USER", default)]
    pub paypal_api_user: String,

    #[serde(rename = "PAYPAL_API_PWD", default)]
    pub paypal_api_pwd: String,

    #[serde(rename = "PAYPAL_API_SIGNATURE", default)]
    pub paypal_api_signature: String,

    #[serde(rename = "PAYPAL_API_ENDPOINT", default)]
    pub paypal_api_endpoint: Option<String>,

    #[serde(rename = "PAYPAL_API_URL", default)]
    pub paypal_api_url: Option<String>,

    #[serde(rename = "PAYPAL_API_VERSION", default)]
    pub paypal_api_version: Option<String>,

    #[serde(rename = "PAYPAL_TIMEOUT_SECONDS", default)]
    pub paypal_timeout_seconds: Option<u64>,
}

fn default_payment_api() -> String {
    "PayPal".to_string()
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            payment_api: default_payment_api(),
            testing: false,
            paypal_api_user: String::new(),
            paypal_api_pwd: String::new(),
            paypal_api_signature: String::new(),
            paypal_api_endpoint: None,
            paypal_api_url: None,
            paypal_api_version: None,
            paypal_timeout_seconds: None,
        }
    }
}

// Credentials must never end up in logs.
impl fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("payment_api", &self.payment_api)
            .field("testing", &self.testing)
            .field("paypal_api_user", &self.paypal_api_user)
            .field("paypal_api_pwd", &"<redacted>")
            .field("paypal_api_signature", &"<redacted>")
            .field("paypal_api_endpoint", &self.api_endpoint())
            .field("paypal_api_url", &self.express_checkout_url())
            .field("paypal_api_version", &self.api_version())
            .field("paypal_timeout_seconds", &self.timeout_seconds())
            .finish()
    }
}

impl PaymentsConfig {
    /// Read the same keys from the process environment.
    pub fn from_env() -> Result<Self> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let testing = match var("TESTING") {
            Some(value) => parse_flag("TESTING", &value)?,
            None => false,
        };

        let paypal_timeout_seconds = match var("PAYPAL_TIMEOUT_SECONDS") {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|e| {
                PaymentsError::InvalidConfigValueError {
                    field: "PAYPAL_TIMEOUT_SECONDS".to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            payment_api: var("PAYMENT_API").unwrap_or_else(default_payment_api),
            testing,
            paypal_api_user: var("PAYPAL_API_USER").unwrap_or_default(),
            paypal_api_pwd: var("PAYPAL_API_PWD").unwrap_or_default(),
            paypal_api_signature: var("PAYPAL_API_SIGNATURE").unwrap_or_default(),
            paypal_api_endpoint: var("PAYPAL_API_ENDPOINT"),
            paypal_api_url: var("PAYPAL_API_URL"),
            paypal_api_version: var("PAYPAL_API_VERSION"),
            paypal_timeout_seconds,
        })
    }

    /// NVP endpoint; sandbox when `TESTING` is set and no endpoint is given.
    pub fn api_endpoint(&self) -> &str {
        match &self.paypal_api_endpoint {
            Some(endpoint) => endpoint,
            None if self.testing => SANDBOX_API_ENDPOINT,
            None => LIVE_API_ENDPOINT,
        }
    }

    /// Prefix the express checkout token is appended to.
    pub fn express_checkout_url(&self) -> &str {
        match &self.paypal_api_url {
            Some(url) => url,
            None if self.testing => SANDBOX_API_URL,
            None => LIVE_API_URL,
        }
    }

    pub fn api_version(&self) -> &str {
        self.paypal_api_version
            .as_deref()
            .unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.paypal_timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("PAYMENT_API", &self.payment_api)?;
        if self.payment_api.trim().eq_ignore_ascii_case("PayPal") {
            validate_secret("PAYPAL_API_USER", &self.paypal_api_user)?;
            validate_secret("PAYPAL_API_PWD", &self.paypal_api_pwd)?;
            validate_secret("PAYPAL_API_SIGNATURE", &self.paypal_api_signature)?;
        }
        validate_url("PAYPAL_API_ENDPOINT", self.api_endpoint())?;
        validate_url("PAYPAL_API_URL", self.express_checkout_url())?;
        validate_non_empty_string("PAYPAL_API_VERSION", self.api_version())?;
        validate_positive_number("PAYPAL_TIMEOUT_SECONDS", self.timeout_seconds(), 1)?;
        Ok(())
    }
}

impl Validate for PaymentsConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PaymentsError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
