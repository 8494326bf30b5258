use crate::domain::model::{Authorisation, Transaction};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A payment provider the `Payments` facade can be bound to.
///
/// Express checkout runs in two legs: `setup_redirect` hands back a
/// transaction carrying the URL the customer must visit, and once they return
/// with a payer id, `authorise` completes the payment.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn setup_redirect(&self, trans: Transaction) -> Result<Transaction>;

    async fn express_details(&self, trans: Transaction) -> Result<Transaction>;

    async fn authorise(&self, trans: &Transaction) -> Result<Authorisation>;
}

pub type GatewayBox = Box<dyn PaymentGateway>;
