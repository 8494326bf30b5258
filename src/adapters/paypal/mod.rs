//! PayPal Express Checkout over the NVP API.
//!
//! The checkout runs as three NVP calls:
//! - `SetExpressCheckout` registers the payment and returns a token; the
//!   customer is sent to `PAYPAL_API_URL` + token to approve it.
//! - `GetExpressCheckoutDetails` reads back the payer once they return.
//! - `DoExpressCheckoutPayment` captures (or authorises) the payment.

pub mod nvp;

use crate::config::PaymentsConfig;
use crate::domain::model::{Authorisation, PayerDetails, Transaction, TransactionType};
use crate::domain::ports::PaymentGateway;
use crate::utils::error::{PaymentsError, Result};
use crate::utils::validation::validate_secret;
use async_trait::async_trait;
use nvp::{NvpClient, NvpCredentials, NvpResponse};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use url::form_urlencoded;

const SET_EXPRESS_CHECKOUT: &str = "SetExpressCheckout";
const GET_EXPRESS_CHECKOUT_DETAILS: &str = "GetExpressCheckoutDetails";
const DO_EXPRESS_CHECKOUT_PAYMENT: &str = "DoExpressCheckoutPayment";

/// Payment statuses that mean no money will move.
const FAILED_PAYMENT_STATUSES: [&str; 5] = ["Denied", "Failed", "Expired", "Voided", "None"];

pub struct PayPalGateway {
    client: NvpClient,
    express_url: String,
}

impl PayPalGateway {
    pub const NAME: &'static str = "PayPal";

    pub fn new(client: NvpClient, express_url: impl Into<String>) -> Self {
        Self {
            client,
            express_url: express_url.into(),
        }
    }

    pub fn from_config(config: &PaymentsConfig) -> Result<Self> {
        validate_secret("PAYPAL_API_USER", &config.paypal_api_user)?;
        validate_secret("PAYPAL_API_PWD", &config.paypal_api_pwd)?;
        validate_secret("PAYPAL_API_SIGNATURE", &config.paypal_api_signature)?;

        let credentials = NvpCredentials {
            user: config.paypal_api_user.clone(),
            pwd: config.paypal_api_pwd.clone(),
            signature: config.paypal_api_signature.clone(),
        };

        let client = NvpClient::new(
            config.api_endpoint(),
            config.api_version(),
            credentials,
            Duration::from_secs(config.timeout_seconds()),
        )?;

        tracing::debug!(
            endpoint = %client.endpoint(),
            version = %client.version(),
            testing = config.testing,
            "PayPal gateway configured"
        );

        Ok(Self::new(client, config.express_checkout_url()))
    }

    /// Where to send the customer to approve the payment identified by `token`.
    pub fn redirect_url_for(&self, token: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
        format!("{}{}", self.express_url, encoded)
    }

    fn require_express(trans: &Transaction, operation: &str) -> Result<()> {
        match trans.kind {
            TransactionType::Express => Ok(()),
            TransactionType::Direct => Err(PaymentsError::UnsupportedError {
                message: format!("{} is only available for express checkout", operation),
            }),
        }
    }

    fn express_token(trans: &Transaction) -> Result<&str> {
        trans
            .express_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                PaymentsError::transaction("express_token", "call setup_redirect first")
            })
    }

    fn payment_params(trans: &Transaction) -> Vec<(&'static str, String)> {
        vec![
            ("PAYMENTREQUEST_0_AMT", trans.formatted_amount()),
            ("PAYMENTREQUEST_0_CURRENCYCODE", trans.currency.clone()),
            (
                "PAYMENTREQUEST_0_PAYMENTACTION",
                trans.payment_action.as_nvp().to_string(),
            ),
        ]
    }

    fn authorisation_from(nvp: &NvpResponse) -> Result<Authorisation> {
        let transaction_id = nvp.require(DO_EXPRESS_CHECKOUT_PAYMENT, "PAYMENTINFO_0_TRANSACTIONID")?;
        let payment_status = nvp.get("PAYMENTINFO_0_PAYMENTSTATUS").map(str::to_string);

        // Already captured: a bad amount is logged, not fatal.
        let amount = nvp
            .get("PAYMENTINFO_0_AMT")
            .filter(|amt| !amt.is_empty())
            .and_then(|amt| match Decimal::from_str(amt) {
                Ok(amount) => Some(amount),
                Err(e) => {
                    tracing::warn!(
                        transaction_id,
                        "PAYMENTINFO_0_AMT {:?} is not a decimal: {}",
                        amt,
                        e
                    );
                    None
                }
            });

        let status = !payment_status
            .as_deref()
            .is_some_and(|s| FAILED_PAYMENT_STATUSES.contains(&s));

        Ok(Authorisation {
            status,
            transaction_id: Some(transaction_id.to_string()),
            payment_status,
            pending_reason: nvp
                .get("PAYMENTINFO_0_PENDINGREASON")
                .filter(|reason| *reason != "None" && !reason.is_empty())
                .map(str::to_string),
            amount,
            currency: nvp.get("PAYMENTINFO_0_CURRENCYCODE").map(str::to_string),
            correlation_id: nvp.correlation_id().map(str::to_string),
            timestamp: nvp.timestamp(),
        })
    }
}

fn optional(nvp: &NvpResponse, key: &str) -> Option<String> {
    nvp.get(key).filter(|v| !v.is_empty()).map(str::to_string)
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn setup_redirect(&self, mut trans: Transaction) -> Result<Transaction> {
        Self::require_express(&trans, "redirect setup")?;
        let (return_url, cancel_url) = trans.redirect_urls()?;

        let mut params = vec![
            ("RETURNURL", return_url.to_string()),
            ("CANCELURL", cancel_url.to_string()),
        ];
        params.extend(Self::payment_params(&trans));
        if let Some(description) = &trans.description {
            params.push(("PAYMENTREQUEST_0_DESC", description.clone()));
        }
        if let Some(invoice) = &trans.invoice {
            params.push(("PAYMENTREQUEST_0_INVNUM", invoice.clone()));
        }
        if let Some(custom) = &trans.custom {
            params.push(("PAYMENTREQUEST_0_CUSTOM", custom.clone()));
        }

        let nvp = self.client.call(SET_EXPRESS_CHECKOUT, &params).await?;
        let token = nvp.require(SET_EXPRESS_CHECKOUT, "TOKEN")?;

        tracing::info!(
            amount = %trans.formatted_amount(),
            currency = %trans.currency,
            "Express checkout token issued"
        );

        trans.redirect_url = Some(self.redirect_url_for(token));
        trans.express_token = Some(token.to_string());
        Ok(trans)
    }

    async fn express_details(&self, mut trans: Transaction) -> Result<Transaction> {
        Self::require_express(&trans, "checkout details")?;
        let token = Self::express_token(&trans)?.to_string();

        let nvp = self
            .client
            .call(GET_EXPRESS_CHECKOUT_DETAILS, &[("TOKEN", token)])
            .await?;

        let payer_id = optional(&nvp, "PAYERID");
        if payer_id.is_none() {
            tracing::info!(
                checkout_status = nvp.get("CHECKOUTSTATUS").unwrap_or_default(),
                "Customer has not approved the payment yet"
            );
        }

        trans.payer = Some(PayerDetails {
            email: optional(&nvp, "EMAIL"),
            first_name: optional(&nvp, "FIRSTNAME"),
            last_name: optional(&nvp, "LASTNAME"),
            country_code: optional(&nvp, "COUNTRYCODE"),
            status: optional(&nvp, "PAYERSTATUS"),
        });
        if payer_id.is_some() {
            trans.payer_id = payer_id;
        }
        Ok(trans)
    }

    async fn authorise(&self, trans: &Transaction) -> Result<Authorisation> {
        if trans.kind == TransactionType::Direct {
            return Err(PaymentsError::UnsupportedError {
                message: "direct card payments are not implemented for PayPal".to_string(),
            });
        }

        let token = Self::express_token(trans)?;
        let payer_id = trans
            .payer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                PaymentsError::transaction("payer_id", "customer has not approved the payment")
            })?;

        let mut params = vec![
            ("TOKEN", token.to_string()),
            ("PAYERID", payer_id.to_string()),
        ];
        params.extend(Self::payment_params(trans));

        let nvp = self.client.call(DO_EXPRESS_CHECKOUT_PAYMENT, &params).await?;
        let auth = Self::authorisation_from(&nvp)?;

        tracing::info!(
            transaction_id = auth.transaction_id.as_deref().unwrap_or_default(),
            payment_status = auth.payment_status.as_deref().unwrap_or_default(),
            status = auth.status,
            "Express checkout payment completed"
        );
        Ok(auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> PaymentsConfig {
        PaymentsConfig {
            testing: true,
            paypal_api_user: "merchant_api1.example.com".to_string(),
            paypal_api_pwd: "pwd".to_string(),
            paypal_api_signature: "sig".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let err = PayPalGateway::from_config(&PaymentsConfig {
            paypal_api_signature: String::new(),
            ..config()
        })
        .err()
        .unwrap();
        assert!(matches!(err, PaymentsError::MissingConfigError { ref field } if field == "PAYPAL_API_SIGNATURE"));

        assert!(PayPalGateway::from_config(&config()).is_ok());
    }

    #[test]
    fn test_redirect_url_appends_token() {
        let gateway = PayPalGateway::from_config(&config()).unwrap();
        assert_eq!(
            gateway.redirect_url_for("EC-8RT50127BF829291N"),
            format!("{}EC-8RT50127BF829291N", crate::config::SANDBOX_API_URL)
        );
    }

    #[test]
    fn test_authorisation_from_completed_payment() {
        let nvp = NvpResponse::parse(
            "TOKEN=EC-1&ACK=Success&CORRELATIONID=c0ffee\
             &TIMESTAMP=2011-11-15T20%3A27%3A02Z\
             &PAYMENTINFO_0_TRANSACTIONID=8MC585209K746392H\
             &PAYMENTINFO_0_PAYMENTSTATUS=Completed&PAYMENTINFO_0_PENDINGREASON=None\
             &PAYMENTINFO_0_AMT=9.95&PAYMENTINFO_0_CURRENCYCODE=USD",
        );

        let auth = PayPalGateway::authorisation_from(&nvp).unwrap();
        assert!(auth.status);
        assert_eq!(auth.transaction_id.as_deref(), Some("8MC585209K746392H"));
        assert_eq!(auth.amount, Some(dec!(9.95)));
        assert_eq!(auth.pending_reason, None);
        assert_eq!(auth.correlation_id.as_deref(), Some("c0ffee"));
        assert!(auth.timestamp.is_some());
    }

    #[test]
    fn test_authorisation_from_denied_payment() {
        let nvp = NvpResponse::parse(
            "ACK=Success&PAYMENTINFO_0_TRANSACTIONID=1AB&PAYMENTINFO_0_PAYMENTSTATUS=Denied",
        );
        let auth = PayPalGateway::authorisation_from(&nvp).unwrap();
        assert!(!auth.status);

        let nvp = NvpResponse::parse("ACK=Success&PAYMENTINFO_0_PAYMENTSTATUS=Completed");
        assert!(PayPalGateway::authorisation_from(&nvp).is_err());
    }

    #[test]
    fn test_malformed_amount_keeps_transaction_id() {
        let nvp = NvpResponse::parse(
            "ACK=Success&PAYMENTINFO_0_TRANSACTIONID=1AB\
             &PAYMENTINFO_0_PAYMENTSTATUS=Completed&PAYMENTINFO_0_AMT=lots",
        );

        let auth = PayPalGateway::authorisation_from(&nvp).unwrap();
        assert!(auth.status);
        assert_eq!(auth.transaction_id.as_deref(), Some("1AB"));
        assert_eq!(auth.amount, None);
    }

    #[tokio::test]
    async fn test_direct_payments_are_unsupported() {
        let gateway = PayPalGateway::from_config(&config()).unwrap();
        let trans = Transaction::direct(dec!(10), "USD");

        let err = gateway.authorise(&trans).await.unwrap_err();
        assert!(matches!(err, PaymentsError::UnsupportedError { .. }));

        let err = gateway.setup_redirect(trans).await.unwrap_err();
        assert!(matches!(err, PaymentsError::UnsupportedError { .. }));
    }

    #[tokio::test]
    async fn test_setup_redirect_requires_urls_even_with_token() {
        let gateway = PayPalGateway::from_config(&config()).unwrap();
        let trans = Transaction::express(dec!(10), "USD").with_express_token("EC-1");

        let err = gateway.setup_redirect(trans).await.unwrap_err();
        assert!(matches!(err, PaymentsError::TransactionValidationError { ref field, .. } if field == "return_url"));
    }

    #[tokio::test]
    async fn test_authorise_needs_token_and_payer() {
        let gateway = PayPalGateway::from_config(&config()).unwrap();
        let trans = Transaction::express(dec!(10), "USD");

        let err = gateway.authorise(&trans).await.unwrap_err();
        assert!(matches!(err, PaymentsError::TransactionValidationError { ref field, .. } if field == "express_token"));

        let trans = trans.with_express_token("EC-1");
        let err = gateway.authorise(&trans).await.unwrap_err();
        assert!(matches!(err, PaymentsError::TransactionValidationError { ref field, .. } if field == "payer_id"));
    }
}
