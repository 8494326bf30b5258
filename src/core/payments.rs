use crate::config::PaymentsConfig;
use crate::core::registry::GatewayRegistry;
use crate::domain::model::{Authorisation, Transaction, TransactionType};
use crate::domain::ports::GatewayBox;
use crate::utils::error::{PaymentsError, Result};
use crate::utils::validation::Validate;

/// Front door for payment processing: validates transactions and forwards
/// them to the gateway named by `PAYMENT_API`.
pub struct Payments {
    gateway: GatewayBox,
    testing: bool,
}

impl Payments {
    pub fn new(config: &PaymentsConfig) -> Result<Self> {
        Self::with_registry(config, &GatewayRegistry::default())
    }

    pub fn with_registry(config: &PaymentsConfig, registry: &GatewayRegistry) -> Result<Self> {
        config.validate()?;
        let gateway = registry.create(config)?;

        tracing::info!(
            gateway = gateway.name(),
            testing = config.testing,
            "Payments initialised"
        );

        Ok(Self {
            gateway,
            testing: config.testing,
        })
    }

    pub fn with_gateway(config: &PaymentsConfig, gateway: GatewayBox) -> Self {
        Self {
            gateway,
            testing: config.testing,
        }
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    pub fn is_testing(&self) -> bool {
        self.testing
    }

    /// Start an express checkout. The returned transaction carries the
    /// gateway token and the URL to send the customer to.
    pub async fn setup_redirect(&self, trans: Transaction) -> Result<Transaction> {
        trans.validate()?;
        if trans.kind == TransactionType::Express {
            trans.redirect_urls()?;
        }
        let trans = self.gateway.setup_redirect(trans).await?;

        if trans.redirect_url.is_none() {
            return Err(PaymentsError::PaymentsValidationError {
                message: format!("{} returned no redirect URL", self.gateway.name()),
            });
        }
        Ok(trans)
    }

    /// Look up who approved the checkout once the customer is back.
    pub async fn express_details(&self, trans: Transaction) -> Result<Transaction> {
        if trans.express_token.is_none() {
            return Err(PaymentsError::transaction(
                "express_token",
                "express checkout must be set up with setup_redirect first",
            ));
        }
        self.gateway.express_details(trans).await
    }

    pub async fn authorise(&self, trans: &Transaction) -> Result<Authorisation> {
        trans.validate()?;
        let auth = self.gateway.authorise(trans).await?;
        auth.validate()?;

        if !auth.status {
            tracing::warn!(
                gateway = self.gateway.name(),
                payment_status = auth.payment_status.as_deref().unwrap_or_default(),
                "Payment was not authorised"
            );
        }
        Ok(auth)
    }

    /// Settle a transaction in one step when everything it needs is present.
    ///
    /// Express transactions must already carry the token and payer id from
    /// the redirect leg; direct payments are rejected.
    pub async fn process(&self, trans: Transaction) -> Result<Authorisation> {
        match trans.kind {
            TransactionType::Express => {
                if trans.express_token.is_none() {
                    return Err(PaymentsError::transaction(
                        "express_token",
                        "express checkout must be set up with setup_redirect before processing",
                    ));
                }
                let trans = if trans.payer_id.is_none() {
                    self.express_details(trans).await?
                } else {
                    trans
                };
                if trans.payer_id.is_none() {
                    return Err(PaymentsError::transaction(
                        "payer_id",
                        "customer has not approved the payment yet",
                    ));
                }
                self.authorise(&trans).await
            }
            TransactionType::Direct => Err(PaymentsError::UnsupportedError {
                message: format!("{} does not support direct payments", self.gateway.name()),
            }),
        }
    }
}
