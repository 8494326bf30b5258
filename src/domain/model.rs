use crate::utils::error::{PaymentsError, Result};
use crate::utils::validation::validate_url;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Customer is redirected to the gateway to approve the payment.
    Express,
    /// Card details are supplied directly by the merchant.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentAction {
    #[default]
    Sale,
    Authorization,
    Order,
}

impl PaymentAction {
    pub fn as_nvp(&self) -> &'static str {
        match self {
            PaymentAction::Sale => "Sale",
            PaymentAction::Authorization => "Authorization",
            PaymentAction::Order => "Order",
        }
    }
}

impl fmt::Display for PaymentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_nvp())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerDetails {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country_code: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    pub description: Option<String>,
    pub invoice: Option<String>,
    pub custom: Option<String>,
    pub payment_action: PaymentAction,

    // Filled in by the gateway as the checkout progresses.
    pub express_token: Option<String>,
    pub redirect_url: Option<String>,
    pub payer_id: Option<String>,
    pub payer: Option<PayerDetails>,
}

impl Transaction {
    pub fn new(kind: TransactionType, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            currency: currency.into(),
            return_url: None,
            cancel_url: None,
            description: None,
            invoice: None,
            custom: None,
            payment_action: PaymentAction::default(),
            express_token: None,
            redirect_url: None,
            payer_id: None,
            payer: None,
        }
    }

    pub fn express(amount: Decimal, currency: impl Into<String>) -> Self {
        Self::new(TransactionType::Express, amount, currency)
    }

    pub fn direct(amount: Decimal, currency: impl Into<String>) -> Self {
        Self::new(TransactionType::Direct, amount, currency)
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    pub fn with_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_invoice(mut self, invoice: impl Into<String>) -> Self {
        self.invoice = Some(invoice.into());
        self
    }

    pub fn with_custom(mut self, custom: impl Into<String>) -> Self {
        self.custom = Some(custom.into());
        self
    }

    pub fn with_payment_action(mut self, action: PaymentAction) -> Self {
        self.payment_action = action;
        self
    }

    /// Resume a checkout after the customer came back from the gateway.
    pub fn with_express_token(mut self, token: impl Into<String>) -> Self {
        self.express_token = Some(token.into());
        self
    }

    pub fn with_payer_id(mut self, payer_id: impl Into<String>) -> Self {
        self.payer_id = Some(payer_id.into());
        self
    }

    /// Return and cancel URLs, both required to be http(s) URLs.
    pub fn redirect_urls(&self) -> Result<(&str, &str)> {
        let check = |field: &str, value: &Option<String>| -> Result<()> {
            let url = value
                .as_deref()
                .ok_or_else(|| PaymentsError::transaction(field, "required for express checkout"))?;
            validate_url(field, url).map_err(|e| PaymentsError::transaction(field, e.to_string()))
        };
        check("return_url", &self.return_url)?;
        check("cancel_url", &self.cancel_url)?;

        Ok((
            self.return_url.as_deref().unwrap_or_default(),
            self.cancel_url.as_deref().unwrap_or_default(),
        ))
    }

    /// Amount as sent on the wire: always two decimal places.
    pub fn formatted_amount(&self) -> String {
        format_amount(self.amount)
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(PaymentsError::transaction(
                "amount",
                format!("must be positive, got {}", self.amount),
            ));
        }
        if self.amount.normalize().scale() > 2 {
            return Err(PaymentsError::transaction(
                "amount",
                format!("at most two decimal places are allowed, got {}", self.amount),
            ));
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(PaymentsError::transaction(
                "currency",
                format!("expected a three letter ISO code, got {:?}", self.currency),
            ));
        }

        // Once the gateway has issued a token the URLs are already registered.
        if self.kind == TransactionType::Express && self.express_token.is_none() {
            self.redirect_urls()?;
        }

        Ok(())
    }
}

pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorisation {
    pub status: bool,
    pub transaction_id: Option<String>,
    pub payment_status: Option<String>,
    pub pending_reason: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub correlation_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Authorisation {
    pub fn validate(&self) -> Result<()> {
        if self.status && self.transaction_id.as_deref().map_or(true, str::is_empty) {
            return Err(PaymentsError::PaymentsValidationError {
                message: "successful authorisation carries no transaction id".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.payment_status.as_deref() == Some("Pending")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn express() -> Transaction {
        Transaction::express(dec!(9.95), "USD")
            .with_return_url("http://www.example.com/pay/")
            .with_cancel_url("http://www.example.com/cancel/")
    }

    #[test]
    fn test_valid_express_transaction() {
        assert!(express().validate().is_ok());
    }

    #[test]
    fn test_amount_must_be_positive() {
        let mut trans = express();
        trans.amount = dec!(0);
        assert!(trans.validate().is_err());

        trans.amount = dec!(-1.00);
        assert!(trans.validate().is_err());
    }

    #[test]
    fn test_amount_precision() {
        let mut trans = express();
        trans.amount = dec!(1.999);
        assert!(trans.validate().is_err());

        // trailing zeros do not count against the scale
        trans.amount = dec!(1.5000);
        assert!(trans.validate().is_ok());
        assert_eq!(trans.formatted_amount(), "1.50");
    }

    #[test]
    fn test_currency_code() {
        let trans = Transaction {
            currency: "how?".to_string(),
            ..express()
        };
        let err = trans.validate().unwrap_err();
        assert!(matches!(err, PaymentsError::TransactionValidationError { ref field, .. } if field == "currency"));

        let trans = Transaction {
            currency: "usd".to_string(),
            ..express()
        };
        assert!(trans.validate().is_err());
    }

    #[test]
    fn test_express_requires_urls() {
        let trans = Transaction::express(dec!(100), "USD");
        let err = trans.validate().unwrap_err();
        assert!(matches!(err, PaymentsError::TransactionValidationError { ref field, .. } if field == "return_url"));

        let trans = express().with_cancel_url("not a url");
        assert!(trans.validate().is_err());

        let resumed = Transaction::express(dec!(100), "USD").with_express_token("EC-1");
        assert!(resumed.validate().is_ok());
        assert!(resumed.redirect_urls().is_err());
        assert_eq!(
            express().redirect_urls().unwrap(),
            ("http://www.example.com/pay/", "http://www.example.com/cancel/")
        );

        // direct payments have no redirect
        assert!(Transaction::direct(dec!(100), "USD").validate().is_ok());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(100)), "100.00");
        assert_eq!(format_amount(dec!(9.95)), "9.95");
        assert_eq!(format_amount(dec!(0.5)), "0.50");
    }

    #[test]
    fn test_authorisation_defaults_to_declined() {
        let auth = Authorisation::default();
        assert!(!auth.status);
        assert!(auth.validate().is_ok());
    }

    #[test]
    fn test_successful_authorisation_needs_transaction_id() {
        let auth = Authorisation {
            status: true,
            ..Default::default()
        };
        assert!(auth.validate().is_err());

        let auth = Authorisation {
            status: true,
            transaction_id: Some("8MC585209K746392H".to_string()),
            payment_status: Some("Pending".to_string()),
            ..Default::default()
        };
        assert!(auth.validate().is_ok());
        assert!(auth.is_pending());
    }
}
